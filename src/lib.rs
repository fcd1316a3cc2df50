//! Certificate authority façade over a pluggable signing engine.
//!
//! An [`Authority`] wraps an [`Engine`], which provides the actual PKI logic: provisioner
//! validation, X.509 and SSH signing, revocation and persistence. The authority adds three things
//! on top:
//!
//! - construction options from two families, [`WrapperOption`]s for the authority itself and
//!   engine options that are handed to [`Engine::new`] in order;
//! - the intermediate signing [`Identity`], read from disk and decrypted with the configured
//!   password when there is one;
//! - routing of [`Authority::sign`] requests to an [`OcfSigner`] when the request's sign options
//!   carry an OCF marker.
//!
//! Every other operation is forwarded to the engine, with its result and error returned as is.
//!
//! # Usage
//!
//! ```no_run
//! use authority::{load_configuration, with_database, Authority, Engine};
//!
//! fn start<E: Engine>(db: E::Database) -> eyre::Result<Authority<E>> {
//!     let config = load_configuration::<E>("/etc/step/config/ca.json")?;
//!
//!     // keep the database of the previous authority on reload
//!     Authority::new(config, [with_database::<E>(db)])
//! }
//! ```
//!
//! # Errors
//!
//! Failures that originate in the authority are tagged with an [`ErrorKind`], see
//! [`ErrorKind::of`]. Errors from delegated operations are the engine's own.

#![deny(rust_2018_idioms, nonstandard_style, future_incompatible)]

mod authority;
mod config;
mod engine;
mod error;
mod identity;
mod ocf;
mod option;
mod util;

pub mod api;


pub use crate::{
    authority::Authority,
    config::{load_configuration, read_json_config, Config, IntermediateConfig, IntermediatePaths},
    engine::Engine,
    error::ErrorKind,
    identity::{DiskIdentityLoader, Identity, IdentityLoader, SigningKey},
    ocf::{is_ocf, OcfMarker, OcfSigner},
    option::{with_database, Opt, WrapperOption},
};

/// Name the authority was known by before it became a façade.
pub const LEGACY_AUTHORITY: &str = "step-certificate-authority";
