use x509_cert::Certificate;

/// Certificate revocation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevokeOptions {
    /// Serial number of the certificate to revoke.
    pub serial: String,

    /// Free text reason.
    pub reason: Option<String>,

    pub reason_code: RevocationReason,

    /// Passive revocation only records the serial; the certificate stays valid elsewhere.
    pub passive: bool,

    /// Whether the request was authenticated with the certificate itself over mTLS.
    pub mtls: bool,

    /// The certificate being revoked, when presented by the caller.
    pub certificate: Option<Certificate>,

    /// One-time token authorizing the request.
    pub ott: Option<String>,
}

/// Enumeration of reasons for revocation.
///
/// The reason codes are taken from [RFC 5280 §5.3.1].
///
/// [RFC 5280 §5.3.1]: https://tools.ietf.org/html/rfc5280#section-5.3.1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RevocationReason {
    #[default]
    Unspecified = 0,
    KeyCompromise = 1,
    CACompromise = 2,
    AffiliationChanged = 3,
    Superseded = 4,
    CessationOfOperation = 5,
    CertificateHold = 6,
    // value 7 is not used
    RemoveFromCRL = 8,
    PrivilegeWithdrawn = 9,
    AACompromise = 10,
}

impl RevocationReason {
    /// The CRL reason code for this reason.
    pub fn code(self) -> Option<u8> {
        match self {
            // > the reason code CRL entry extension SHOULD be absent instead of
            // > using the unspecified (0) reasonCode value
            // see <https://datatracker.ietf.org/doc/html/rfc5280#section-5.3.1>
            RevocationReason::Unspecified => None,

            reason => Some(reason as u8),
        }
    }

    /// Looks up the reason for a CRL reason code.
    pub fn from_code(code: u8) -> Option<Self> {
        let reason = match code {
            0 => RevocationReason::Unspecified,
            1 => RevocationReason::KeyCompromise,
            2 => RevocationReason::CACompromise,
            3 => RevocationReason::AffiliationChanged,
            4 => RevocationReason::Superseded,
            5 => RevocationReason::CessationOfOperation,
            6 => RevocationReason::CertificateHold,
            8 => RevocationReason::RemoveFromCRL,
            9 => RevocationReason::PrivilegeWithdrawn,
            10 => RevocationReason::AACompromise,
            _ => return None,
        };

        Some(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_has_no_code() {
        assert_eq!(RevocationReason::Unspecified.code(), None);
        assert_eq!(RevocationReason::KeyCompromise.code(), Some(1));
        assert_eq!(RevocationReason::AACompromise.code(), Some(10));
    }

    #[test]
    fn codes_map_back() {
        for code in (0..=10).filter(|code| *code != 7) {
            let reason = RevocationReason::from_code(code).unwrap();
            assert_eq!(reason as u8, code);
        }

        assert_eq!(RevocationReason::from_code(7), None);
        assert_eq!(RevocationReason::from_code(11), None);
    }
}
