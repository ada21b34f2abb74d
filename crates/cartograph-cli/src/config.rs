//! Configuration loading for the CLI
//!
//! A configuration file is looked up (explicit path, local directory, system
//! directory), the layout flags are laid over it and the merged result is
//! validated once.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use cartograph::{
    CartographError,
    config::{AppConfig, SettingError},
};

use crate::args::Args;

/// Problems with the configuration file or the flags laid over it
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Unusable layout setting: {0}")]
    Setting(#[from] SettingError),
}

impl From<ConfigError> for CartographError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Setting(setting) => CartographError::Setting(setting),
            other => CartographError::Config(other.to_string()),
        }
    }
}

/// Loads the configuration and applies the layout flags on top
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - A setting is out of range once the flags are applied
pub fn load_config(
    explicit_path: Option<impl AsRef<Path>>,
    overrides: &Args,
) -> Result<AppConfig, CartographError> {
    let mut config = find_config(explicit_path)?;
    apply_overrides(&mut config, overrides);
    config.validate().map_err(ConfigError::from)?;
    debug!(
        cache_capacity = config.layout.cache_capacity,
        collision_padding = config.layout.collision_padding,
        hybrid_enabled = config.hybrid.enabled;
        "Configuration ready"
    );
    Ok(config)
}

/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (cartograph/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
fn find_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return read_config_file(path);
    }

    let local_config = Path::new("cartograph/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return read_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "cartograph", "cartograph") {
        let system_config = proj_dirs.config_dir().join("config.toml");
        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return read_config_file(&system_config);
        }
        debug!(path = system_config.display().to_string(); "System configuration file not found");
    }

    debug!("No configuration file found, using default layout settings");
    Ok(AppConfig::default())
}

fn read_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Flags win over the file; canvas flags replace the default canvas
fn apply_overrides(config: &mut AppConfig, overrides: &Args) {
    if let Some(algorithm) = overrides.algorithm {
        config.layout.preferred_algorithm = Some(algorithm);
    }
    config.layout.no_connectors |= overrides.no_connectors;
    if let Some(width) = overrides.width {
        config.canvas.default_width = width;
    }
    if let Some(height) = overrides.height {
        config.canvas.default_height = height;
    }
    if let Some(padding) = overrides.padding {
        config.canvas.default_padding = padding;
    }
    if let Some(seed) = overrides.seed {
        config.force.seed = seed;
    }
    if let Some(policy) = overrides.odd_branch_policy() {
        config.radial.odd_branch_policy = policy;
    }
}
