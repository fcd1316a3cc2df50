use std::{fmt, sync::Arc};

use eyre::WrapErr as _;
use x509_cert::{request::CertReq, Certificate};

use crate::{
    api::{
        ProvisionerPage, RevokeOptions, SignOptions, SignedCertificate, SshOptions,
        TlsCertificate, TlsOptions,
    },
    config::{Config, IntermediateConfig},
    engine::Engine,
    error::ErrorKind,
    identity::{Identity, IdentityLoader},
    ocf::{is_ocf, OcfSigner},
    option::{self, Opt, Settings},
    LEGACY_AUTHORITY,
};

/// Certificate authority.
///
/// Wraps an [`Engine`] together with the intermediate identity used for OCF issuance. Apart from
/// [`sign`](Self::sign), which picks between the standard and the OCF issuance flow, every
/// operation is forwarded to the engine and its result returned as is.
pub struct Authority<E: Engine> {
    config: Config<E::Config>,
    engine: E,
    intermediate_identity: Identity,
    ocf_signer: Option<Arc<dyn OcfSigner<E::SignOption>>>,
}

impl<E: Engine> Authority<E> {
    /// Creates and initializes a new authority.
    ///
    /// Engine options are passed to [`Engine::new`] in the order given. Once the engine is up,
    /// the intermediate identity is loaded, decrypting its key if the configuration has a
    /// password. If that fails the engine is shut down again.
    pub fn new(
        config: Config<E::Config>,
        opts: impl IntoIterator<Item = Opt<E>>,
    ) -> eyre::Result<Self> {
        let (wrapper_opts, engine_opts) = option::partition(opts);
        let settings = Settings::<E>::from_options(wrapper_opts);

        let engine = E::new(config.base(), engine_opts).wrap_err(ErrorKind::Construction)?;

        let guard = ShutdownGuard::new(&engine);
        let intermediate_identity =
            load_intermediate_identity(&config, settings.identity_loader.as_ref())
                .wrap_err(ErrorKind::IdentityLoad)?;
        guard.disarm();

        log::info!(
            "{LEGACY_AUTHORITY} ready; intermediate {}",
            intermediate_identity
                .fingerprint()
                .unwrap_or_else(|_| "<unknown>".to_owned())
        );

        Ok(Authority {
            config,
            engine,
            intermediate_identity,
            ocf_signer: settings.ocf_signer,
        })
    }

    pub fn config(&self) -> &Config<E::Config> {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn intermediate_identity(&self) -> &Identity {
        &self.intermediate_identity
    }

    /// Returns the authority database.
    pub fn database(&self) -> E::Database {
        self.engine.database()
    }

    /// Shuts down any clients, databases, etc. held by the engine.
    ///
    /// Calling this more than once is as safe as the engine's shutdown makes it.
    pub fn shutdown(&self) -> eyre::Result<()> {
        self.engine.shutdown()
    }

    pub async fn authorize(&self, ott: &str) -> eyre::Result<Vec<E::SignOption>> {
        self.engine.authorize(ott).await
    }

    pub fn authorize_sign(&self, ott: &str) -> eyre::Result<Vec<E::SignOption>> {
        self.engine.authorize_sign(ott)
    }

    pub fn tls_options(&self) -> TlsOptions {
        self.engine.tls_options()
    }

    pub fn root(&self, sha256_hex: &str) -> eyre::Result<Certificate> {
        self.engine.root(sha256_hex)
    }

    /// Signs a certificate request.
    ///
    /// Requests whose sign options contain an OCF marker go to [`ocf_sign`](Self::ocf_sign), all
    /// others to the engine.
    pub fn sign(
        &self,
        csr: &CertReq,
        opts: &SignOptions,
        sign_opts: &[E::SignOption],
    ) -> eyre::Result<SignedCertificate> {
        if is_ocf(sign_opts) {
            return self.ocf_sign(csr, opts, sign_opts);
        }

        self.engine.sign(csr, opts, sign_opts)
    }

    /// Signs a certificate request through the installed OCF signer, using the intermediate
    /// identity.
    pub fn ocf_sign(
        &self,
        csr: &CertReq,
        opts: &SignOptions,
        sign_opts: &[E::SignOption],
    ) -> eyre::Result<SignedCertificate> {
        let Some(signer) = &self.ocf_signer else {
            return Err(eyre::Report::msg(ErrorKind::OcfUnavailable));
        };

        log::debug!("signing certificate request with OCF signer");
        signer.sign(&self.intermediate_identity, csr, opts, sign_opts)
    }

    pub fn renew(&self, peer: &Certificate) -> eyre::Result<SignedCertificate> {
        self.engine.renew(peer)
    }

    pub fn load_provisioner_by_certificate(
        &self,
        cert: &Certificate,
    ) -> eyre::Result<E::Provisioner> {
        self.engine.load_provisioner_by_certificate(cert)
    }

    pub fn load_provisioner_by_id(&self, id: &str) -> eyre::Result<E::Provisioner> {
        self.engine.load_provisioner_by_id(id)
    }

    pub fn provisioners(
        &self,
        cursor: &str,
        limit: usize,
    ) -> eyre::Result<ProvisionerPage<E::Provisioner>> {
        self.engine.provisioners(cursor, limit)
    }

    pub fn revoke(&self, opts: &RevokeOptions) -> eyre::Result<()> {
        self.engine.revoke(opts)
    }

    pub fn encrypted_key(&self, kid: &str) -> eyre::Result<String> {
        self.engine.encrypted_key(kid)
    }

    pub fn roots(&self) -> eyre::Result<Vec<Certificate>> {
        self.engine.roots()
    }

    pub fn federation(&self) -> eyre::Result<Vec<Certificate>> {
        self.engine.federation()
    }

    pub fn tls_certificate(&self) -> eyre::Result<TlsCertificate> {
        self.engine.tls_certificate()
    }

    pub fn sign_ssh(
        &self,
        key: &ssh_key::PublicKey,
        opts: &SshOptions,
        sign_opts: &[E::SignOption],
    ) -> eyre::Result<ssh_key::Certificate> {
        self.engine.sign_ssh(key, opts, sign_opts)
    }

    pub fn sign_ssh_add_user(
        &self,
        key: &ssh_key::PublicKey,
        subject: &ssh_key::Certificate,
    ) -> eyre::Result<ssh_key::Certificate> {
        self.engine.sign_ssh_add_user(key, subject)
    }

    pub fn root_certificates(&self) -> Vec<Certificate> {
        self.engine.root_certificates()
    }
}

impl<E: Engine> fmt::Debug for Authority<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authority")
            .field("intermediate_identity", &self.intermediate_identity)
            .field("ocf_signer", &self.ocf_signer.is_some())
            .finish_non_exhaustive()
    }
}

fn load_intermediate_identity<C: IntermediateConfig>(
    config: &Config<C>,
    loader: &dyn IdentityLoader,
) -> eyre::Result<Identity> {
    let cert_file = config.intermediate_cert();
    let key_file = config.intermediate_key();

    match config.password() {
        Some(password) => loader.load_with_password(cert_file, key_file, password.as_bytes()),
        None => loader.load(cert_file, key_file),
    }
}

/// Shuts the engine down when dropped, unless disarmed.
struct ShutdownGuard<'a, E: Engine> {
    engine: &'a E,
    armed: bool,
}

impl<'a, E: Engine> ShutdownGuard<'a, E> {
    fn new(engine: &'a E) -> Self {
        ShutdownGuard {
            engine,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<E: Engine> Drop for ShutdownGuard<'_, E> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        log::debug!("shutting down engine of partially constructed authority");

        if let Err(err) = self.engine.shutdown() {
            log::warn!("engine shutdown failed: {err:#}");
        }
    }
}
