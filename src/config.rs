//! Finder configuration.
//!
//! Settings come from a TOML file.  [`Config::discover`] looks, in order,
//! for `phpantom-finder.toml` in the search root and for
//! `<config dir>/phpantom_finder/config.toml` in the user's configuration
//! directory, falling back to [`Config::default`] when neither exists.
//!
//! ```toml
//! extensions = ["php", "inc"]
//! resolve_imports = true
//! parallel = false
//! prefilter = true
//! respect_gitignore = false
//! follow_links = false
//! skip_dirs = ["node_modules"]
//! ```

use std::path::{Path, PathBuf};

use etcetera::BaseStrategy;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::fs::LocalFileSystem;

/// File name looked up in the search root.
pub const PROJECT_CONFIG_FILE: &str = "phpantom-finder.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// File extensions (without the dot) treated as PHP source, compared
    /// case-insensitively.
    pub extensions: Vec<String>,
    /// Resolve names through `use` imports.  When off, names are only
    /// prefixed with the current namespace.
    pub resolve_imports: bool,
    /// Scan files on the rayon thread pool.  Result order is unchanged.
    pub parallel: bool,
    /// Skip files that do not mention the target's short name before
    /// tokenizing them.
    pub prefilter: bool,
    pub respect_gitignore: bool,
    pub follow_links: bool,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: vec!["php".to_string()],
            resolve_imports: true,
            parallel: false,
            prefilter: true,
            respect_gitignore: false,
            follow_links: false,
            skip_dirs: Vec::new(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load configuration from an explicit file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text, path)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Find and load the configuration that applies to a search under
    /// `root`.  A missing file is not an error; a malformed one is.
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let project = root.join(PROJECT_CONFIG_FILE);
        if project.is_file() {
            return Self::load(&project);
        }
        if let Some(user) = user_config_path()
            && user.is_file()
        {
            return Self::load(&user);
        }
        Ok(Self::default())
    }

    /// Whether `path` has one of the configured source extensions.
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// The local filesystem configured with this config's walk settings.
    pub fn file_system(&self) -> LocalFileSystem {
        LocalFileSystem {
            respect_gitignore: self.respect_gitignore,
            follow_links: self.follow_links,
            skip_dirs: self.skip_dirs.clone(),
        }
    }
}

/// `<user config dir>/phpantom_finder/config.toml`, if a home directory
/// can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    match etcetera::choose_base_strategy() {
        Ok(strategy) => Some(
            strategy
                .config_dir()
                .join("phpantom_finder")
                .join("config.toml"),
        ),
        Err(e) => {
            warn!(error = %e, "could not determine the user config directory");
            None
        }
    }
}
