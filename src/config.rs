//! Layered configuration document, loaded once at startup into a `lazy_static` global.
//!
//! Mirrors the teacher's `SERVICE_CONFIG` pattern: a `--config-file` CLI flag (via
//! `clap`) takes priority, then an environment variable, then a default path relative
//! to the working directory.

use clap::Parser;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;

const CONFIG_FILE_ENV_VAR: &str = "GAME_SERVICE_CONFIG_FILE";
const DEFAULT_CONFIG_FILE: &str = "./config.json";

#[derive(Parser, Debug)]
#[command(name = "turnforge-service")]
pub struct Arguments {
    #[arg(long = "config-file")]
    pub config_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub user: String,
    pub pass: String,
    #[serde(rename = "poolSize")]
    pub pool_size: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/turnforge".to_string(),
            user: "turnforge".to_string(),
            pass: String::new(),
            pool_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(rename = "tokenTtlSeconds", default = "default_token_ttl")]
    pub token_ttl_seconds: i64,
}

fn default_token_ttl() -> i64 {
    86_400
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "dev-only-secret-change-me".to_string(),
            token_ttl_seconds: default_token_ttl(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub jwt: JwtConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl ServiceConfig {
    pub fn from_file(path: &str) -> Result<Self, std::io::Error> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        serde_json::from_str(&contents).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("failed to parse {}: {}", path, e),
            )
        })
    }

    fn resolve_path() -> String {
        match Arguments::try_parse() {
            Ok(Arguments {
                config_file: Some(path),
            }) => path,
            _ => std::env::var(CONFIG_FILE_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string()),
        }
    }

    /// Loads from the resolved path if it exists, otherwise falls back to defaults.
    /// A missing config file is not fatal (useful for local/test runs); a config file
    /// that exists but fails to parse is.
    fn load() -> Self {
        let path = Self::resolve_path();
        match std::fs::metadata(&path) {
            Ok(_) => Self::from_file(&path)
                .unwrap_or_else(|e| panic!("failed to load service config from {}: {}", path, e)),
            Err(_) => {
                log::warn!(
                    "no config file found at {}; using built-in defaults",
                    path
                );
                Self::default()
            }
        }
    }
}

lazy_static! {
    pub static ref SERVICE_CONFIG: ServiceConfig = ServiceConfig::load();
}
