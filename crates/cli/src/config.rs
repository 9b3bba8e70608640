//! Optional `lacuna.toml` configuration.
//!
//! Looked up at `--config <path>` or, failing that, `./lacuna.toml`.
//! Every value can be overridden on the command line.
//!
//! # Example
//!
//! ```toml
//! program = "conformance/kafka/program.json"
//! locale = "fr"
//! log = "lacuna_eval=debug"
//!
//! [explore]
//! max_rounds = 16
//! ```

use std::path::{Path, PathBuf};

use lacuna_eval::Locale;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "lacuna.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no program given: pass --program or set 'program' in {DEFAULT_CONFIG_FILE}")]
    NoProgram,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Program description used when `--program` is not given.
    pub program: Option<PathBuf>,
    /// Locale tag for diagnostic questions.
    pub locale: Option<String>,
    /// Log filter directive, overridden by `LACUNA_LOG`.
    pub log: Option<String>,
    pub explore: ExploreConfig,
    /// Directory relative paths in the file resolve against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// `[explore]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExploreConfig {
    pub max_rounds: usize,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        ExploreConfig { max_rounds: 32 }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, `./lacuna.toml` is used
    /// when present and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Config::default());
                }
                default
            }
        };
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut config = Config::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(content)
    }

    /// The program path: the flag if given, else the configured one.
    pub fn program(&self, flag: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(p) = flag {
            return Ok(p.to_path_buf());
        }
        let configured = self.program.as_ref().ok_or(ConfigError::NoProgram)?;
        Ok(match &self.base_dir {
            Some(base) if configured.is_relative() => base.join(configured),
            _ => configured.clone(),
        })
    }

    pub fn locale(&self, flag: Option<&str>) -> Locale {
        flag.or(self.locale.as_deref())
            .map(Locale::parse)
            .unwrap_or_default()
    }

    pub fn max_rounds(&self, flag: Option<usize>) -> usize {
        flag.unwrap_or(self.explore.max_rounds)
    }
}
