//! OCF issuance flow selection.
//!
//! Signing requests whose sign options carry an OCF marker are issued by an [`OcfSigner`] using
//! the authority's intermediate identity instead of the engine's standard signing path.

use x509_cert::request::CertReq;

use crate::{
    api::{SignOptions, SignedCertificate},
    identity::Identity,
};

/// Implemented by sign options to flag requests for the OCF issuance flow.
pub trait OcfMarker {
    fn is_ocf(&self) -> bool;
}

/// Returns true if any of `sign_opts` is an OCF marker.
pub fn is_ocf<O: OcfMarker>(sign_opts: &[O]) -> bool {
    sign_opts.iter().any(OcfMarker::is_ocf)
}

/// Alternate signing entrypoint for OCF requests.
pub trait OcfSigner<O>: Send + Sync {
    /// Signs `csr` with `identity`, returning the leaf and its issuer.
    fn sign(
        &self,
        identity: &Identity,
        csr: &CertReq,
        opts: &SignOptions,
        sign_opts: &[O],
    ) -> eyre::Result<SignedCertificate>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::StubSignOption;

    #[test]
    fn marker_anywhere_selects_ocf() {
        assert!(is_ocf(&[StubSignOption::Ocf]));
        assert!(is_ocf(&[
            StubSignOption::Profile("leaf"),
            StubSignOption::Profile("short-lived"),
            StubSignOption::Ocf,
        ]));
    }

    #[test]
    fn no_marker_is_standard() {
        assert!(!is_ocf::<StubSignOption>(&[]));
        assert!(!is_ocf(&[StubSignOption::Profile("leaf")]));
    }
}
