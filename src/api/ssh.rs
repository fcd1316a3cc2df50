use serde::{Deserialize, Serialize};
use ssh_key::certificate::CertType;
use time::OffsetDateTime;

/// Kind of SSH certificate to issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SshCertType {
    #[default]
    User,
    Host,
}

impl From<SshCertType> for CertType {
    fn from(cert_type: SshCertType) -> Self {
        match cert_type {
            SshCertType::User => CertType::User,
            SshCertType::Host => CertType::Host,
        }
    }
}

/// Options for SSH certificate signing requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshOptions {
    #[serde(default)]
    pub cert_type: SshCertType,

    /// Users or hosts the certificate is valid for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub principals: Vec<String>,

    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub valid_after: Option<OffsetDateTime>,

    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub valid_before: Option<OffsetDateTime>,
}
