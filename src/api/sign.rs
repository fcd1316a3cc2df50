use der::EncodePem as _;
use eyre::WrapErr as _;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use x509_cert::Certificate;

/// Base options for X.509 signing requests.
///
/// Unset bounds are left to the engine's provisioner defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOptions {
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub not_before: Option<OffsetDateTime>,

    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub not_after: Option<OffsetDateTime>,

    /// How far `not_before` is moved into the past to tolerate clock skew, in whole seconds.
    #[serde(
        default,
        with = "seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub backdate: Option<Duration>,
}

/// A freshly issued certificate and the certificate of its issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCertificate {
    pub leaf: Certificate,
    pub issuer: Certificate,
}

impl SignedCertificate {
    /// The leaf followed by its issuer, PEM encoded.
    pub fn chain_pem(&self) -> eyre::Result<String> {
        let leaf = self.leaf.to_pem(pem::LineEnding::LF).wrap_err("encode leaf")?;
        let issuer = self
            .issuer
            .to_pem(pem::LineEnding::LF)
            .wrap_err("encode issuer")?;

        Ok(leaf + &issuer)
    }
}

/// Serializes an optional [`Duration`] as a whole number of seconds.
mod seconds_option {
    use serde::{Deserialize as _, Deserializer, Serializer};
    use time::Duration;

    pub(super) fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        match duration {
            Some(duration) => ser.serialize_i64(duration.whole_seconds()),
            None => ser.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<i64>::deserialize(de)?.map(Duration::seconds))
    }
}
