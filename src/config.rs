//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML file: `--config FILE`, or `config.toml` in the platform config
//!    directory (e.g. `~/.config/dupesweep/config.toml`)
//! 3. `DUPESWEEP_*` environment variables (e.g. `DUPESWEEP_IO_THREADS=8`)
//! 4. CLI flags ([`Config::apply_scan_options`])
//!
//! ```toml
//! io_threads = 8
//! quarantine_dir_name = "duplicates"
//! log_file = "operation_log.txt"
//! skip_hidden = false
//! skip_empty = false
//! use_trash = false
//! strict = false
//! ```

use std::path::{Component, Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::ScanOptions;

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "DUPESWEEP_";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly named config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has the wrong type.
    #[error("invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// A value parsed but is not acceptable.
    #[error("invalid value for `{key}`: {message}")]
    Invalid { key: &'static str, message: String },

    /// The configuration could not be rendered as TOML.
    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of I/O threads for hashing.
    pub io_threads: usize,
    /// Name of the quarantine directory created under the scan root.
    pub quarantine_dir_name: String,
    /// Log file for silent mode.
    pub log_file: PathBuf,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Skip zero-byte files.
    pub skip_empty: bool,
    /// Delete to the system trash instead of removing files.
    pub use_trash: bool,
    /// Abort on the first unreadable file.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: 4,
            quarantine_dir_name: "duplicates".to_string(),
            log_file: PathBuf::from("operation_log.txt"),
            skip_hidden: false,
            skip_empty: false,
            use_trash: false,
            strict: false,
        }
    }
}

impl Config {
    /// The platform-specific default config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupesweep", "dupesweep")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the layered figment (defaults, optional TOML file, environment).
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load configuration, from `explicit` if given, otherwise from the
    /// default location when it exists.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `explicit` names a missing file
    /// - `Extract` if a layer is malformed
    /// - `Invalid` if a value fails validation
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match explicit {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };

        match &file {
            Some(path) => log::debug!("Loading configuration from {}", path.display()),
            None => log::debug!("No configuration file, using defaults and environment"),
        }

        Self::extract(Self::figment(file.as_deref()))
    }

    /// Load configuration from a specific TOML file plus the environment.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load(Some(path.as_ref()))
    }

    /// Extract and validate a configuration from any figment.
    ///
    /// # Errors
    ///
    /// `Extract` or `Invalid`, as for [`Config::load`].
    pub fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.io_threads == 0 {
            return Err(ConfigError::Invalid {
                key: "io_threads",
                message: "must be at least 1".to_string(),
            });
        }

        let mut components = Path::new(&self.quarantine_dir_name).components();
        let single_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_name {
            return Err(ConfigError::Invalid {
                key: "quarantine_dir_name",
                message: format!("`{}` is not a plain directory name", self.quarantine_dir_name),
            });
        }

        if self.log_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "log_file",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Apply CLI scan flags. Switches only ever turn a setting on.
    pub fn apply_scan_options(&mut self, options: &ScanOptions) {
        if let Some(threads) = options.io_threads {
            self.io_threads = threads as usize;
        }
        self.skip_hidden |= options.skip_hidden;
        self.skip_empty |= options.skip_empty;
        self.strict |= options.strict;
    }

    /// Quarantine directory for a scan root.
    #[must_use]
    pub fn quarantine_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.quarantine_dir_name)
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns `Render` if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
