use std::{fmt, fs, path::Path};

use der::Encode as _;
use eyre::{eyre, WrapErr as _};
use pkcs8::{
    DecodePrivateKey as _, EncodePrivateKey as _, EncryptedPrivateKeyInfo, ObjectIdentifier,
    PrivateKeyInfo, SecretDocument,
};
use sha2::{Digest as _, Sha256};
use x509_cert::Certificate;
use zeroize::Zeroizing;

use crate::util::pem_chain;

const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");

/// Certificate and private key the authority signs with.
///
/// The certificate's subject public key is checked against the private key when the identity is
/// created.
#[derive(Clone)]
pub struct Identity {
    certificate: Certificate,
    chain: Vec<Certificate>,
    signing_key: SigningKey,
}

/// Elliptic curve private key of an [`Identity`].
#[derive(Clone)]
pub enum SigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

impl SigningKey {
    /// Curve name, as used in log lines and errors.
    pub fn algorithm(&self) -> &'static str {
        match self {
            SigningKey::P256(_) => "P-256",
            SigningKey::P384(_) => "P-384",
        }
    }

    /// Uncompressed SEC1 encoding of the public key.
    pub fn public_key_sec1(&self) -> Vec<u8> {
        match self {
            SigningKey::P256(key) => key.verifying_key().to_encoded_point(false).to_bytes().into(),
            SigningKey::P384(key) => key.verifying_key().to_encoded_point(false).to_bytes().into(),
        }
    }

    /// The private key in PKCS#8 PEM format.
    pub fn to_pkcs8_pem(&self) -> eyre::Result<Zeroizing<String>> {
        let pem = match self {
            SigningKey::P256(key) => key.to_pkcs8_pem(pem::LineEnding::LF),
            SigningKey::P384(key) => key.to_pkcs8_pem(pem::LineEnding::LF),
        };

        pem.wrap_err("encode private key")
    }

    fn from_pkcs8_der(der: &[u8]) -> eyre::Result<Self> {
        let info = PrivateKeyInfo::try_from(der).wrap_err("parse PKCS#8 private key")?;

        if info.algorithm.oid != EC_PUBLIC_KEY {
            return Err(eyre!(
                "unsupported private key algorithm {}",
                info.algorithm.oid
            ));
        }

        let curve = info
            .algorithm
            .parameters_oid()
            .map_err(|err| eyre!("EC private key without named curve: {err}"))?;

        if curve == SECP256R1 {
            let key = p256::ecdsa::SigningKey::from_pkcs8_der(der)
                .wrap_err("parse P-256 private key")?;
            Ok(SigningKey::P256(key))
        } else if curve == SECP384R1 {
            let key = p384::ecdsa::SigningKey::from_pkcs8_der(der)
                .wrap_err("parse P-384 private key")?;
            Ok(SigningKey::P384(key))
        } else {
            Err(eyre!("unsupported elliptic curve {curve}"))
        }
    }

    fn from_sec1_der(der: &[u8]) -> eyre::Result<Self> {
        // the named curve in the key parameters is checked by the decoders
        if let Ok(key) = p256::SecretKey::from_sec1_der(der) {
            return Ok(SigningKey::P256(key.into()));
        }

        if let Ok(key) = p384::SecretKey::from_sec1_der(der) {
            return Ok(SigningKey::P384(key.into()));
        }

        Err(eyre!("unsupported SEC1 private key, expected a P-256 or P-384 key"))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningKey").field(&self.algorithm()).finish()
    }
}

impl Identity {
    /// Creates an identity, failing if `signing_key` does not belong to `certificate`.
    pub fn new(
        certificate: Certificate,
        chain: Vec<Certificate>,
        signing_key: SigningKey,
    ) -> eyre::Result<Self> {
        let spki = &certificate.tbs_certificate.subject_public_key_info;

        if spki.subject_public_key.raw_bytes() != signing_key.public_key_sec1().as_slice() {
            return Err(eyre!(
                "private key does not match certificate {}",
                certificate.tbs_certificate.subject
            ));
        }

        Ok(Identity {
            certificate,
            chain,
            signing_key,
        })
    }

    /// Parses an identity from a PEM certificate bundle and a PEM private key.
    ///
    /// The first certificate in `cert_pem` is the identity's certificate, the rest form its
    /// chain. Supported key formats are PKCS#8 (`PRIVATE KEY`), SEC1 (`EC PRIVATE KEY`) and
    /// password protected PKCS#8 (`ENCRYPTED PRIVATE KEY`), on the P-256 and P-384 curves.
    pub fn from_pem(cert_pem: &[u8], key_pem: &str, password: Option<&[u8]>) -> eyre::Result<Self> {
        let mut certs = pem_chain(cert_pem)?.into_iter();

        let certificate = certs
            .next()
            .ok_or_else(|| eyre!("no certificate found in PEM bundle"))?;

        let signing_key = parse_private_key(key_pem, password)?;

        Self::new(certificate, certs.collect(), signing_key)
    }

    /// Reads an identity from a certificate file and an unencrypted key file.
    pub fn load_from_disk(cert_file: &Path, key_file: &Path) -> eyre::Result<Self> {
        let (cert_pem, key_pem) = read_files(cert_file, key_file)?;
        Self::from_pem(&cert_pem, &key_pem, None)
    }

    /// Reads an identity from a certificate file and a key file, decrypting the key with
    /// `password` if it is encrypted.
    pub fn load_from_disk_with_password(
        cert_file: &Path,
        key_file: &Path,
        password: &[u8],
    ) -> eyre::Result<Self> {
        let (cert_pem, key_pem) = read_files(cert_file, key_file)?;
        Self::from_pem(&cert_pem, &key_pem, Some(password))
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Certificates following the identity's certificate, up towards the root.
    pub fn chain(&self) -> &[Certificate] {
        &self.chain
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// The private key in PKCS#8 PEM format.
    pub fn private_key_pem(&self) -> eyre::Result<Zeroizing<String>> {
        self.signing_key.to_pkcs8_pem()
    }

    /// Hex encoded SHA-256 digest of the DER encoded certificate.
    pub fn fingerprint(&self) -> eyre::Result<String> {
        let der = self.certificate.to_der()?;
        Ok(format!("{:x}", Sha256::digest(der)))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field(
                "subject",
                &self.certificate.tbs_certificate.subject.to_string(),
            )
            .field("chain_len", &self.chain.len())
            .field("key", &self.signing_key.algorithm())
            .finish_non_exhaustive()
    }
}

fn read_files(cert_file: &Path, key_file: &Path) -> eyre::Result<(Vec<u8>, Zeroizing<String>)> {
    let cert_pem =
        fs::read(cert_file).wrap_err_with(|| format!("read {}", cert_file.display()))?;

    let key_pem = fs::read_to_string(key_file)
        .map(Zeroizing::new)
        .wrap_err_with(|| format!("read {}", key_file.display()))?;

    Ok((cert_pem, key_pem))
}

fn parse_private_key(key_pem: &str, password: Option<&[u8]>) -> eyre::Result<SigningKey> {
    // RFC 1423 encryption, as written by `openssl ec -aes256` and older tooling
    if key_pem.contains("Proc-Type: 4,ENCRYPTED") {
        return Err(eyre!(
            "legacy encrypted PEM (RFC 1423) private keys are not supported, \
             convert the key to encrypted PKCS#8"
        ));
    }

    let (label, doc) = SecretDocument::from_pem(key_pem)
        .map_err(|err| eyre!("malformed private key PEM: {err}"))?;

    match (label, password) {
        ("ENCRYPTED PRIVATE KEY", Some(password)) => {
            let info = EncryptedPrivateKeyInfo::try_from(doc.as_bytes())
                .wrap_err("parse encrypted private key")?;
            let doc = info.decrypt(password).wrap_err("decrypt private key")?;

            SigningKey::from_pkcs8_der(doc.as_bytes())
        }

        ("ENCRYPTED PRIVATE KEY", None) => {
            Err(eyre!("private key is encrypted but no password was given"))
        }

        ("PRIVATE KEY", password) => {
            if password.is_some() {
                log::debug!("password given for unencrypted PKCS#8 private key");
            }

            SigningKey::from_pkcs8_der(doc.as_bytes())
        }

        ("EC PRIVATE KEY", password) => {
            if password.is_some() {
                log::debug!("password given for unencrypted SEC1 private key");
            }

            SigningKey::from_sec1_der(doc.as_bytes())
        }

        (label, _) => Err(eyre!("unsupported private key type: {label}")),
    }
}

/// Loads the intermediate identity of an authority.
///
/// The authority calls [`load_with_password`] when a password is configured and [`load`]
/// otherwise.
///
/// [`load`]: IdentityLoader::load
/// [`load_with_password`]: IdentityLoader::load_with_password
pub trait IdentityLoader: Send + Sync {
    fn load(&self, cert_file: &Path, key_file: &Path) -> eyre::Result<Identity>;

    fn load_with_password(
        &self,
        cert_file: &Path,
        key_file: &Path,
        password: &[u8],
    ) -> eyre::Result<Identity>;
}

/// Reads identities from PEM files.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskIdentityLoader;

impl IdentityLoader for DiskIdentityLoader {
    fn load(&self, cert_file: &Path, key_file: &Path) -> eyre::Result<Identity> {
        Identity::load_from_disk(cert_file, key_file)
    }

    fn load_with_password(
        &self,
        cert_file: &Path,
        key_file: &Path,
        password: &[u8],
    ) -> eyre::Result<Identity> {
        Identity::load_from_disk_with_password(cert_file, key_file, password)
    }
}
