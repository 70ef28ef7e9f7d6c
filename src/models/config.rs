//! Service configuration
//!
//! Read once at startup from environment variables. Nothing outside this
//! module touches the environment.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use super::errors::{AppError, AppResult};
use super::types::Disease;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MODELS_DIR: &str = "./models";
/// Idle sessions are dropped after 30 minutes
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;
/// Extension of model artifacts inside the models directory
pub const ARTIFACT_EXTENSION: &str = "json";

/// How the registry reacts to a broken artifact at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPolicy {
    /// First failure aborts startup, no partial registry
    Strict,
    /// Each disease loads on its own; failures only disable that disease
    Isolated,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub models_dir: PathBuf,
    pub load_policy: LoadPolicy,
    pub session_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            load_policy: LoadPolicy::Strict,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

impl AppConfig {
    /// Load from the process environment
    ///
    /// Environment:
    ///   PREDICTOR_HOST             - bind host (default: 0.0.0.0)
    ///   PORT / PREDICTOR_PORT      - bind port (default: 8080)
    ///   PREDICTOR_MODELS_DIR       - artifact directory (default: ./models)
    ///   PREDICTOR_STRICT_STARTUP   - abort on any load failure (default: true)
    ///   PREDICTOR_SESSION_TTL_SECS - idle session lifetime (default: 1800)
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key/value source
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("PREDICTOR_HOST").filter(|h| !h.is_empty()) {
            config.host = host;
        }

        // Hosting platforms set PORT; PREDICTOR_PORT is for local runs
        if let Some(port) = lookup("PORT").or_else(|| lookup("PREDICTOR_PORT")) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| AppError::invalid_config("PORT", &port))?;
        }

        if let Some(dir) = lookup("PREDICTOR_MODELS_DIR").filter(|d| !d.is_empty()) {
            config.models_dir = PathBuf::from(dir);
        }

        if let Some(strict) = lookup("PREDICTOR_STRICT_STARTUP") {
            config.load_policy = match parse_bool(&strict) {
                Some(true) => LoadPolicy::Strict,
                Some(false) => LoadPolicy::Isolated,
                None => return Err(AppError::invalid_config("PREDICTOR_STRICT_STARTUP", &strict)),
            };
        }

        if let Some(ttl) = lookup("PREDICTOR_SESSION_TTL_SECS") {
            let secs: u64 = ttl
                .trim()
                .parse()
                .map_err(|_| AppError::invalid_config("PREDICTOR_SESSION_TTL_SECS", &ttl))?;
            config.session_ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| AppError::invalid_config("PREDICTOR_HOST", &self.host))
    }

    pub fn log_summary(&self) {
        info!(
            host = %self.host,
            port = self.port,
            models_dir = %self.models_dir.display(),
            policy = ?self.load_policy,
            session_ttl_secs = self.session_ttl.as_secs(),
            "Configuration loaded"
        );
    }
}

/// `{models_dir}/{artifact_stem}.json`
pub fn artifact_path(models_dir: &Path, disease: Disease) -> PathBuf {
    models_dir
        .join(disease.artifact_stem())
        .with_extension(ARTIFACT_EXTENSION)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
