//! Request and response payloads exchanged with the engine.

mod provisioner;
mod revocation;
mod sign;
mod ssh;
mod tls;

pub use self::{
    provisioner::ProvisionerPage,
    revocation::{RevocationReason, RevokeOptions},
    sign::{SignOptions, SignedCertificate},
    ssh::{SshCertType, SshOptions},
    tls::{TlsCertificate, TlsOptions},
};
