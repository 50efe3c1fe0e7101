use config::{Config, Environment, File};
use pbx_domain::config::{PbxConfig, PbxConfigInner};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default config file stem, resolved against the working directory (`pbx.toml`, `pbx.yaml`, ...).
pub const DEFAULT_CONFIG_FILE: &str = "pbx";

/// Prefix for environment overrides, e.g. `PBX__MODULES__HANDLER_TIMEOUT_MS=5000`.
pub const ENV_PREFIX: &str = "PBX";

#[pbx_derive::pbx_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered configuration loader: a file, then `PBX__`-prefixed environment overrides.
///
/// Nested keys are separated by a double underscore (`PBX__LOG__LEVEL` maps to `log.level`).
/// `PBX__MODULES__DISABLED` accepts a comma separated list.
///
/// An explicit `path` must exist. Without one, `pbx.*` in the working directory is used when
/// present and defaults apply otherwise.
///
/// # Example
/// ```rust
/// use pbx_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let required = path.is_some();
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("modules.disabled"),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Loads the process configuration.
pub fn load_pbx_config(path: Option<impl AsRef<Path>>) -> Result<PbxConfig, ConfigError> {
    load_config::<PbxConfigInner>(path).map(PbxConfig::from)
}
