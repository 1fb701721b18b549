//! Configuration manager for Scriba.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_MEDIA_ROOT: &str = "uploads";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Origin allowed to send credentialed cross-site requests.
    pub allowed_origin: Option<String>,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to JsonWebToken configuration.
    #[serde(skip_serializing)]
    pub token: Option<Token>,
    /// Related to SQLite configuration.
    #[serde(skip_serializing)]
    pub sqlite: Option<Sqlite>,
    /// Related to Argon2 configuration.
    #[serde(skip_serializing)]
    pub argon2: Option<Argon2>,
    /// Related to uploaded media storage.
    #[serde(default)]
    pub media: Media,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: String::default(),
            allowed_origin: None,
            port: DEFAULT_PORT,
            version: String::default(),
            path: PathBuf::default(),
            token: None,
            sqlite: None,
            argon2: None,
            media: Media::default(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// SQLite configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Sqlite {
    /// Path of the database file. Created when absent.
    pub path: String,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Argon2 configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Argon2 {
    /// Memory used while hashing.
    pub memory_cost: u32,
    /// Iterations of hash.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
    /// Output hash length.
    pub hash_length: usize,
}

impl Default for Argon2 {
    fn default() -> Self {
        Self {
            memory_cost: 1024 * 64, // 64 MiB.
            iterations: 4,
            parallelism: 2,
            hash_length: 32,
        }
    }
}

/// Json Web Token configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Signing secret. The `TOKEN_SECRET` environment variable takes
    /// precedence. Rotating it invalidates every issued session.
    pub secret: Option<String>,
    /// Session lifetime in seconds.
    pub lifetime_secs: Option<u64>,
}

/// Uploaded media configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Media {
    /// Directory receiving uploaded covers, served under `/uploads`.
    pub root: PathBuf,
}

impl Default for Media {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_MEDIA_ROOT),
        }
    }
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Normalizes an origin string by ensuring it carries a valid scheme
    /// (`http` or `https`) and no trailing path.
    fn normalize_origin(&self, origin: &str) -> Result<String, url::ParseError> {
        let origin_with_scheme = if origin.starts_with("http://")
            || origin.starts_with("https://")
        {
            origin.to_string()
        } else {
            format!("https://{origin}")
        };

        let parsed = Url::parse(&origin_with_scheme)?;
        Ok(parsed.origin().ascii_serialization())
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Arc<Self>, url::ParseError> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(file_path) {
            Ok(file) => {
                let mut config: Configuration =
                    match serde_yaml::from_reader(file) {
                        Ok(config) => config,
                        Err(err) => {
                            return Ok(Arc::new(self.error(err)));
                        },
                    };

                // set app version.
                config.version = VERSION.to_owned();

                // normalize the CORS origin.
                config.allowed_origin = config
                    .allowed_origin
                    .map(|origin| self.normalize_origin(&origin))
                    .transpose()?;

                Ok(Arc::new(config))
            },
            Err(err) => Ok(Arc::new(self.error(err))),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not found");
        Self {
            version: VERSION.to_owned(),
            ..Default::default()
        }
    }
}
