use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub storage: StorageConfig,

    pub ai: AiConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/marlin.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Host header allow-list. Empty means any host is accepted.
    pub allowed_hosts: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Default: true for production safety. Set to false for local
    /// development without HTTPS.
    pub secure_cookies: bool,

    /// Advisory value sent back in X-RateLimit-Limit headers. Nothing is
    /// enforced server-side.
    pub rate_limit_hint: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            allowed_hosts: Vec::new(),
            secure_cookies: true,
            rate_limit_hint: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Admin identity provisioned lazily at first login.
    /// Overridable via MARLIN_ADMIN_EMAIL / MARLIN_ADMIN_PASSWORD.
    pub admin_email: String,

    #[serde(skip_serializing)]
    pub admin_password: String,

    /// Bearer token lifetime in hours
    pub token_ttl_hours: i64,

    /// Cookie session inactivity expiry in minutes
    pub session_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@localhost".to_string(),
            admin_password: String::new(),
            token_ttl_hours: 24,
            session_ttl_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// "local" or "s3"
    pub backend: String,

    /// Key prefix inside the bucket / local root
    pub key_prefix: String,

    /// Local backend: directory uploads are written to, served at /uploads
    pub local_path: String,

    /// Optional CDN domain used to build public URLs (e.g. cdn.example.com).
    /// Falls back to the backend's direct URL when empty.
    pub cdn_domain: String,

    pub s3: S3Config,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "local".to_string(),
            key_prefix: "uploads".to_string(),
            local_path: "data/uploads".to_string(),
            cdn_domain: String::new(),
            s3: S3Config::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub bucket: String,

    pub region: String,

    /// Custom endpoint for S3-compatible stores. Empty uses AWS.
    pub endpoint: String,

    /// Credentials come from MARLIN_S3_ACCESS_KEY / MARLIN_S3_SECRET_KEY or
    /// the ambient AWS credential chain; they are never stored in the file.
    #[serde(skip_serializing)]
    pub access_key: String,

    #[serde(skip_serializing)]
    pub secret_key: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "us-east-1".to_string(),
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Key inside the global-settings document that must hold the provider
    /// API key before generation endpoints respond.
    pub provider_key_field: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider_key_field: "ai_api_key".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
            ai: AiConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Secrets and deployment identity come from the environment so they
    /// never land in the config file.
    fn apply_env_overrides(&mut self) {
        if let Ok(email) = std::env::var("MARLIN_ADMIN_EMAIL") {
            self.auth.admin_email = email;
        }
        if let Ok(password) = std::env::var("MARLIN_ADMIN_PASSWORD") {
            self.auth.admin_password = password;
        }
        if let Ok(bucket) = std::env::var("MARLIN_S3_BUCKET") {
            self.storage.s3.bucket = bucket;
        }
        if let Ok(access_key) = std::env::var("MARLIN_S3_ACCESS_KEY") {
            self.storage.s3.access_key = access_key;
        }
        if let Ok(secret_key) = std::env::var("MARLIN_S3_SECRET_KEY") {
            self.storage.s3.secret_key = secret_key;
        }
        if let Ok(cdn) = std::env::var("MARLIN_CDN_DOMAIN") {
            self.storage.cdn_domain = cdn;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("marlin").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".marlin").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.backend != "local" && self.storage.backend != "s3" {
            anyhow::bail!(
                "Unknown storage backend '{}' (expected 'local' or 's3')",
                self.storage.backend
            );
        }

        if self.storage.backend == "s3" && self.storage.s3.bucket.is_empty() {
            anyhow::bail!("S3 bucket cannot be empty when the s3 backend is selected");
        }

        if self.auth.token_ttl_hours <= 0 {
            anyhow::bail!("Token TTL must be > 0 hours");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.backend, "local");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[storage]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [auth]
            token_ttl_hours = 8
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.auth.token_ttl_hours, 8);

        assert_eq!(config.storage.backend, "local");
    }

    #[test]
    fn test_validate_rejects_unknown_backend() {
        let mut config = Config::default();
        config.storage.backend = "ftp".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut config = Config::default();
        config.auth.admin_password = "hunter2".to_string();
        config.storage.s3.secret_key = "sekrit".to_string();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(!toml_str.contains("hunter2"));
        assert!(!toml_str.contains("sekrit"));
    }
}
