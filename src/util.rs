use der::Decode as _;
use eyre::{eyre, WrapErr as _};
use x509_cert::Certificate;

/// Decodes every `CERTIFICATE` block of a PEM bundle, in order.
///
/// Other PEM sections and text between blocks are skipped. Fails if the bundle holds no
/// certificate at all.
pub(crate) fn pem_chain(pem: &[u8]) -> eyre::Result<Vec<Certificate>> {
    let mut rdr = pem;

    let chain = rustls_pemfile::certs(&mut rdr)
        .map(|res| {
            let der = res.wrap_err("read certificate PEM")?;
            Certificate::from_der(&der).wrap_err("parse certificate")
        })
        .collect::<eyre::Result<Vec<_>>>()?;

    if chain.is_empty() {
        return Err(eyre!("no certificate found in PEM bundle"));
    }

    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::Pki;

    #[test]
    fn chain_in_order() {
        let pki = Pki::generate();
        let bundle = format!(
            "# intermediate\n{}\n# root\n{}",
            pki.intermediate.pem(),
            pki.root.pem()
        );

        let chain = pem_chain(bundle.as_bytes()).unwrap();
        assert_eq!(chain.len(), 2);
        assert!(chain[0].tbs_certificate.subject.to_string().contains("Test Intermediate CA"));
        assert!(chain[1].tbs_certificate.subject.to_string().contains("Test Root CA"));
    }

    #[test]
    fn empty_bundles_are_rejected() {
        for bundle in ["", "\n", "  \n\t", "not a pem file"] {
            let err = pem_chain(bundle.as_bytes()).unwrap_err();
            assert!(err.to_string().contains("no certificate"), "{bundle:?}: {err}");
        }
    }

    #[test]
    fn corrupt_block_is_an_error() {
        let bundle = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        pem_chain(bundle.as_bytes()).unwrap_err();
    }
}
