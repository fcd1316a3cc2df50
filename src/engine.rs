use std::path::Path;

use async_trait::async_trait;
use x509_cert::{request::CertReq, Certificate};

use crate::{
    api::{
        ProvisionerPage, RevokeOptions, SignOptions, SignedCertificate, SshOptions,
        TlsCertificate, TlsOptions,
    },
    config::IntermediateConfig,
    ocf::OcfMarker,
};

/// The certificate authority engine wrapped by [`Authority`].
///
/// The engine owns all PKI logic: provisioner validation, certificate templating, revocation
/// bookkeeping, SSH signing and persistence. The authority forwards calls to it without
/// inspecting arguments or results, so the contracts of these methods (including concurrency
/// guarantees) are the engine's to define.
///
/// [`Authority`]: crate::Authority
#[async_trait]
pub trait Engine: Send + Sync + Sized {
    /// Base configuration, parsed by [`Engine::load_config`].
    type Config: IntermediateConfig + Send + Sync;

    /// Engine-level construction option.
    type Option: Send;

    /// Persistence backend handle.
    type Database: Clone;

    /// Request-scoped directive produced by authorization and consumed by signing.
    type SignOption: OcfMarker + Send + Sync;

    /// Provisioner handle.
    type Provisioner;

    /// Creates an engine from its configuration and options, in the order given.
    fn new(config: &Self::Config, options: Vec<Self::Option>) -> eyre::Result<Self>;

    /// Parses the configuration file at `filename`.
    fn load_config(filename: &Path) -> eyre::Result<Self::Config>;

    /// Creates an option that installs an already initialized database.
    fn database_option(db: Self::Database) -> Self::Option;

    /// Returns the database in use.
    fn database(&self) -> Self::Database;

    /// Releases clients, databases and other resources held by the engine.
    fn shutdown(&self) -> eyre::Result<()>;

    /// Validates a one-time token and returns the sign options it grants.
    async fn authorize(&self, ott: &str) -> eyre::Result<Vec<Self::SignOption>>;

    fn authorize_sign(&self, ott: &str) -> eyre::Result<Vec<Self::SignOption>>;

    fn tls_options(&self) -> TlsOptions;

    /// Returns the root certificate with the given SHA-256 fingerprint.
    fn root(&self, sha256_hex: &str) -> eyre::Result<Certificate>;

    fn sign(
        &self,
        csr: &CertReq,
        opts: &SignOptions,
        sign_opts: &[Self::SignOption],
    ) -> eyre::Result<SignedCertificate>;

    fn renew(&self, peer: &Certificate) -> eyre::Result<SignedCertificate>;

    fn load_provisioner_by_certificate(
        &self,
        cert: &Certificate,
    ) -> eyre::Result<Self::Provisioner>;

    fn load_provisioner_by_id(&self, id: &str) -> eyre::Result<Self::Provisioner>;

    /// Lists up to `limit` provisioners starting at `cursor`.
    fn provisioners(
        &self,
        cursor: &str,
        limit: usize,
    ) -> eyre::Result<ProvisionerPage<Self::Provisioner>>;

    fn revoke(&self, opts: &RevokeOptions) -> eyre::Result<()>;

    /// Returns the encrypted private key of the provisioner with key ID `kid`.
    fn encrypted_key(&self, kid: &str) -> eyre::Result<String>;

    fn roots(&self) -> eyre::Result<Vec<Certificate>>;

    fn federation(&self) -> eyre::Result<Vec<Certificate>>;

    fn tls_certificate(&self) -> eyre::Result<TlsCertificate>;

    fn sign_ssh(
        &self,
        key: &ssh_key::PublicKey,
        opts: &SshOptions,
        sign_opts: &[Self::SignOption],
    ) -> eyre::Result<ssh_key::Certificate>;

    fn sign_ssh_add_user(
        &self,
        key: &ssh_key::PublicKey,
        subject: &ssh_key::Certificate,
    ) -> eyre::Result<ssh_key::Certificate>;

    fn root_certificates(&self) -> Vec<Certificate>;
}
