use std::fmt;

use der::time::{OffsetDateTime, PrimitiveDateTime};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use x509_cert::Certificate;
use zeroize::Zeroizing;

use crate::{identity::Identity, util::pem_chain};

/// TLS settings of the authority's own server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsOptions {
    pub cipher_suites: Vec<String>,
    pub min_version: String,
    pub max_version: String,
    pub renegotiation: bool,
}

impl Default for TlsOptions {
    fn default() -> Self {
        TlsOptions {
            cipher_suites: vec![
                "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305".to_owned(),
                "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256".to_owned(),
            ],
            min_version: "1.2".to_owned(),
            max_version: "1.3".to_owned(),
            renegotiation: false,
        }
    }
}

/// Server certificate chain and private key.
#[derive(Clone, PartialEq, Eq)]
pub struct TlsCertificate {
    private_key_pem: Zeroizing<String>,
    certificate: String,
}

impl TlsCertificate {
    /// Validates and wraps a PEM certificate chain, leaf first, and the leaf's private key.
    ///
    /// The key may be PKCS#8 or SEC1 encoded, on the P-256 or P-384 curve.
    pub fn parse(private_key_pem: Zeroizing<String>, certificate: String) -> eyre::Result<Self> {
        // checks the chain decodes and the key belongs to the leaf
        Identity::from_pem(certificate.as_bytes(), &private_key_pem, None)?;

        Ok(TlsCertificate {
            private_key_pem,
            certificate,
        })
    }

    /// The private key in PEM format.
    pub fn private_key(&self) -> &str {
        &self.private_key_pem
    }

    /// The certificate chain in PEM format.
    pub fn certificate(&self) -> &str {
        &self.certificate
    }

    /// The decoded certificate chain, leaf first.
    pub fn certificate_chain(&self) -> eyre::Result<Vec<Certificate>> {
        pem_chain(self.certificate.as_bytes())
    }

    /// Inspect the leaf certificate to count the number of (whole) valid days left.
    ///
    /// It is possible to get negative days for an expired certificate.
    pub fn valid_days_left(&self) -> eyre::Result<i64> {
        let leaf = self
            .certificate_chain()?
            .into_iter()
            .next()
            .ok_or_else(|| eyre!("no certificates in chain"))?;

        // X.509 validity times are UTC
        let not_after = leaf.tbs_certificate.validity.not_after.to_date_time();
        let not_after = PrimitiveDateTime::try_from(not_after)?.assume_utc();

        let diff = not_after - OffsetDateTime::now_utc();

        Ok(diff.whole_days())
    }
}

impl fmt::Debug for TlsCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsCertificate")
            .field("certificate", &self.certificate)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rcgen::{CertificateParams, KeyPair};

    use super::*;
    use crate::test::Pki;

    #[test]
    fn parse_chain_and_key() {
        let pki = Pki::generate();
        let (leaf_pem, leaf_key_pem) = pki.issue_leaf_pem("tls.example.com");
        let chain = format!("{leaf_pem}{}", pki.intermediate.pem());

        let tls = TlsCertificate::parse(leaf_key_pem, chain).unwrap();

        let certs = tls.certificate_chain().unwrap();
        assert_eq!(certs.len(), 2);
        assert!(certs[1]
            .tbs_certificate
            .subject
            .to_string()
            .contains("Test Intermediate CA"));

        assert!(tls.valid_days_left().unwrap() > 0);
        assert!(!format!("{tls:?}").contains("PRIVATE KEY"));
    }

    #[test]
    fn parse_leaf_only() {
        let pki = Pki::generate();
        let (leaf_pem, leaf_key_pem) = pki.issue_leaf_pem("tls.example.com");

        let tls = TlsCertificate::parse(leaf_key_pem, leaf_pem).unwrap();
        assert_eq!(tls.certificate_chain().unwrap().len(), 1);
    }

    #[test]
    fn parse_rejects_garbage() {
        let pki = Pki::generate();
        let (leaf_pem, leaf_key_pem) = pki.issue_leaf_pem("tls.example.com");
        let (_, other_key_pem) = pki.issue_leaf_pem("other.example.com");

        TlsCertificate::parse(Zeroizing::new("nope".to_owned()), leaf_pem.clone()).unwrap_err();
        TlsCertificate::parse(leaf_key_pem, "CERT HERE".to_owned()).unwrap_err();

        let err = TlsCertificate::parse(other_key_pem, leaf_pem).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn expired_leaf_has_negative_days() {
        let pki = Pki::generate();

        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(vec!["old.example.com".to_owned()]).unwrap();
        params.not_before = rcgen::date_time_ymd(2000, 1, 1);
        params.not_after = rcgen::date_time_ymd(2001, 1, 1);
        let cert = params
            .signed_by(&key, &pki.intermediate, &pki.intermediate_key)
            .unwrap();

        let tls = TlsCertificate::parse(Zeroizing::new(key.serialize_pem()), cert.pem()).unwrap();
        assert!(tls.valid_days_left().unwrap() < -365);
    }

    #[test]
    fn default_options_require_tls12() {
        let opts = TlsOptions::default();
        assert_eq!(opts.min_version, "1.2");
        assert!(!opts.renegotiation);

        let json = serde_json::to_value(&opts).unwrap();
        assert!(json.get("cipherSuites").is_some());
    }
}
