use std::{
    fs,
    ops::Deref,
    path::{Path, PathBuf},
};

use eyre::WrapErr as _;
use serde::de::DeserializeOwned;

use crate::{engine::Engine, error::ErrorKind};

/// Access to the intermediate identity settings of an engine's base configuration.
pub trait IntermediateConfig {
    /// Path to the PEM encoded intermediate certificate (optionally followed by its chain).
    fn intermediate_cert(&self) -> &Path;

    /// Path to the PEM encoded intermediate private key.
    fn intermediate_key(&self) -> &Path;

    /// Password protecting the intermediate private key. Empty when the key is not encrypted.
    fn password(&self) -> &str;
}

/// Authority configuration.
///
/// Wraps the engine's base configuration, which is also reachable through [`Deref`].
#[derive(Debug, Clone)]
pub struct Config<C> {
    inner: C,
}

impl<C: IntermediateConfig> Config<C> {
    pub fn new(inner: C) -> Self {
        Config { inner }
    }

    pub fn intermediate_cert(&self) -> &Path {
        self.inner.intermediate_cert()
    }

    pub fn intermediate_key(&self) -> &Path {
        self.inner.intermediate_key()
    }

    /// The key password, or `None` if it is empty.
    pub fn password(&self) -> Option<&str> {
        Some(self.inner.password()).filter(|pw| !pw.is_empty())
    }

    /// The engine's base configuration.
    pub fn base(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C> Deref for Config<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

/// Loads the authority configuration from `filename`.
///
/// Parsing is left to [`Engine::load_config`].
pub fn load_configuration<E: Engine>(
    filename: impl AsRef<Path>,
) -> eyre::Result<Config<E::Config>> {
    let filename = filename.as_ref();

    let inner = E::load_config(filename).wrap_err(ErrorKind::ConfigLoad)?;
    log::debug!("loaded authority configuration from {}", filename.display());

    Ok(Config::new(inner))
}

/// Reads and deserializes a JSON configuration file.
///
/// Convenience for [`Engine::load_config`] implementations.
pub fn read_json_config<C: DeserializeOwned>(filename: &Path) -> eyre::Result<C> {
    let json = fs::read_to_string(filename)
        .wrap_err_with(|| format!("read {}", filename.display()))?;

    serde_json::from_str(&json).wrap_err_with(|| format!("parse {}", filename.display()))
}

/// Intermediate identity settings as commonly found in JSON configuration files.
///
/// Can be embedded in an engine configuration with `#[serde(flatten)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediatePaths {
    pub intermediate_cert: PathBuf,
    pub intermediate_key: PathBuf,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

impl IntermediateConfig for IntermediatePaths {
    fn intermediate_cert(&self) -> &Path {
        &self.intermediate_cert
    }

    fn intermediate_key(&self) -> &Path {
        &self.intermediate_key
    }

    fn password(&self) -> &str {
        &self.password
    }
}
