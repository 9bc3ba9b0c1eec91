// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_STATE_DB: &str = ".talentdesk/state.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub state_db_path: PathBuf,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u64,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_page_size() -> u32 {
    20
}

fn default_cache_ttl_minutes() -> u64 {
    30
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: ClientConfig,
    production: Option<ClientConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            state_db_path: PathBuf::from(DEFAULT_STATE_DB),
            timeout_seconds: default_timeout_seconds(),
            page_size: default_page_size(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
            download_dir: default_download_dir(),
        }
    }
}

impl ClientConfig {
    /// Load configuration for the current environment.
    ///
    /// `config.yaml` (or the file named by `TALENTDESK_CONFIG`) is optional;
    /// without it the built-in defaults apply. Environment variables override
    /// whatever the file says.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let config_path = std::env::var("TALENTDESK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.yaml"));

        let base = if config_path.exists() {
            Self::load_from_file(&config_path, &environment)?
        } else {
            info!(
                "No configuration file at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        let config = base.apply_overrides(|name| std::env::var(name).ok())?;
        config.resolve_paths()
    }

    fn get_environment() -> String {
        std::env::var("TALENTDESK_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn load_from_file(path: &Path, environment: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config_file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(match environment {
            "production" => config_file
                .production
                .context("config file has no production section")?,
            _ => config_file.local,
        })
    }

    /// Apply `TALENTDESK_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TALENTDESK_API_URL") {
            self.api_base_url = url;
        }
        if let Some(path) = lookup("TALENTDESK_STATE_DB") {
            self.state_db_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("TALENTDESK_TIMEOUT_SECS") {
            self.timeout_seconds = secs
                .parse()
                .context("TALENTDESK_TIMEOUT_SECS must be a number of seconds")?;
        }
        if let Some(size) = lookup("TALENTDESK_PAGE_SIZE") {
            self.page_size = size
                .parse()
                .context("TALENTDESK_PAGE_SIZE must be a positive integer")?;
        }
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    fn resolve_paths(mut self) -> Result<Self> {
        self.state_db_path = Self::resolve_path(&self.state_db_path)?;
        self.download_dir = Self::resolve_path(&self.download_dir)?;
        Ok(self)
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir =
                std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    /// Lifetime of the short-lived candidate cache
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cache_ttl_minutes as i64)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Ensure the state database and download directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(db_parent) = self.state_db_path.parent() {
            tokio::fs::create_dir_all(db_parent)
                .await
                .with_context(|| {
                    format!(
                        "Failed to create state directory: {}",
                        db_parent.display()
                    )
                })?;
        }

        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create download directory: {}",
                    self.download_dir.display()
                )
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_from_file_selects_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
local:
  api_base_url: "http://127.0.0.1:9000/api"
  state_db_path: "state/local.db"
production:
  api_base_url: "https://talent.example.com/api"
  state_db_path: "/var/lib/talentdesk/state.db"
  timeout_seconds: 60
"#
        )
        .unwrap();

        let local = ClientConfig::load_from_file(file.path(), "local").unwrap();
        assert_eq!(local.api_base_url, "http://127.0.0.1:9000/api");
        assert_eq!(local.timeout_seconds, 30);
        assert_eq!(local.page_size, 20);

        let prod = ClientConfig::load_from_file(file.path(), "production").unwrap();
        assert_eq!(prod.timeout_seconds, 60);
        assert_eq!(prod.state_db_path, PathBuf::from("/var/lib/talentdesk/state.db"));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let vars: HashMap<&str, &str> = [
            ("TALENTDESK_API_URL", "http://backend:8000/api/"),
            ("TALENTDESK_PAGE_SIZE", "50"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::default()
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api_base_url, "http://backend:8000/api");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.cache_ttl(), chrono::Duration::minutes(30));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let result = ClientConfig::default().apply_overrides(|name| {
            (name == "TALENTDESK_PAGE_SIZE").then(|| "0".to_string())
        });
        assert!(result.is_err());

        let result = ClientConfig::default().apply_overrides(|name| {
            (name == "TALENTDESK_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }
}
