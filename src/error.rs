use std::fmt;

/// Failures that originate in the authority itself.
///
/// A kind is attached to an [`eyre::Report`] as context, so the underlying cause stays reachable
/// through [`eyre::Report::downcast_ref`]. Errors returned by delegated engine operations never
/// carry a kind; they are the engine's own reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The base configuration file is missing, malformed or invalid.
    ConfigLoad,

    /// The engine could not be constructed.
    Construction,

    /// The intermediate certificate or key could not be read, parsed or decrypted.
    IdentityLoad,

    /// A request selected the OCF issuance flow but no OCF signer is installed.
    OcfUnavailable,
}

impl ErrorKind {
    /// Returns the kind attached to `err`, if any.
    pub fn of(err: &eyre::Report) -> Option<ErrorKind> {
        err.downcast_ref::<ErrorKind>().copied()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorKind::ConfigLoad => "failed to load authority configuration",
            ErrorKind::Construction => "failed to construct authority engine",
            ErrorKind::IdentityLoad => "failed to load intermediate identity",
            ErrorKind::OcfUnavailable => "OCF issuance requested but no OCF signer is installed",
        };

        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use eyre::WrapErr as _;

    use super::*;

    #[test]
    fn kind_survives_wrapping() {
        let res: eyre::Result<()> = Err(eyre::eyre!("disk on fire"));
        let err = res.wrap_err(ErrorKind::Construction).unwrap_err();

        assert_eq!(ErrorKind::of(&err), Some(ErrorKind::Construction));
        assert_eq!(err.root_cause().to_string(), "disk on fire");
    }

    #[test]
    fn plain_report_has_no_kind() {
        assert_eq!(ErrorKind::of(&eyre::eyre!("engine says no")), None);
    }
}
