//! speclink library - Link spec documents to tags in source comments
//!
//! This library exposes the configuration and rendering used by the
//! `speclink` binary for testing and embedding purposes.

pub mod config;
pub mod output;

use config::Config;
use eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};

/// Config location relative to the project root
pub const CONFIG_PATH: &str = ".config/speclink/config.yaml";

/// The nearest ancestor of `start` holding a speclink config or a `.git`
/// directory, or `start` itself if there is none.
pub fn find_project_root(start: &Path) -> PathBuf {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_PATH).exists() || current.join(".git").exists() {
            return current;
        }

        if !current.pop() {
            return start.to_path_buf();
        }
    }
}

/// [`find_project_root`] from the working directory
pub fn find_project_root_from_cwd() -> Result<PathBuf> {
    let cwd = std::env::current_dir().wrap_err("Failed to get current directory")?;
    Ok(find_project_root(&cwd))
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        eyre::bail!(
            "Config file not found at {}\n\n\
             Create a config file listing your spec documents:\n\n\
             specs:\n  \
               - docs/**/*.md\n\
             exclude:\n  \
               - target/**",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = facet_yaml::from_str(&content)
        .map_err(|e| eyre::eyre!("{e:?}"))
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Load config if it exists, otherwise return the default config.
///
/// A config file that exists but does not parse is still an error.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    load_config(path)
}
