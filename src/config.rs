use crate::surface::DEFAULT_SIDEBAR_SELECTOR;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime configuration for the certificate desk server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub page_path: Option<PathBuf>,
    pub sidebar_selector: String,
    pub catalog_path: PathBuf,
    pub enable_cors: bool,
    pub session_ttl: Duration,
    pub normalize_input: bool,
    pub backend: Option<BackendConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub auth_token: Option<String>,
}

/// Optional overrides read from a TOML file. Every key is optional; unset keys
/// keep the value derived from the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bind_addr: Option<SocketAddr>,
    pub page_path: Option<PathBuf>,
    pub sidebar_selector: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub enable_cors: Option<bool>,
    pub session_ttl_secs: Option<u64>,
    pub normalize_input: Option<bool>,
    #[serde(default)]
    pub backend: Option<FileBackendConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileBackendConfig {
    pub url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub auth_token: Option<String>,
}

const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            page_path: None,
            sidebar_selector: DEFAULT_SIDEBAR_SELECTOR.to_string(),
            catalog_path: PathBuf::from("data/certificate_data.json"),
            enable_cors: false,
            session_ttl: DEFAULT_SESSION_TTL,
            normalize_input: false,
            backend: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = match var("BIND_ADDR") {
            Some(addr) => addr.parse().context("failed to parse BIND_ADDR")?,
            None => defaults.bind_addr,
        };
        let page_path = var("CHAT_PAGE").map(PathBuf::from);
        let sidebar_selector = var("SIDEBAR_SELECTOR").unwrap_or(defaults.sidebar_selector);
        let catalog_path = var("CERTIFICATE_DATA")
            .map(PathBuf::from)
            .unwrap_or(defaults.catalog_path);
        let enable_cors = var("ENABLE_CORS").is_some_and(|v| flag(&v));
        let normalize_input = var("NORMALIZE_INPUT").is_some_and(|v| flag(&v));
        let session_ttl = var("SESSION_TTL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_ttl);

        let backend = var("CHAT_BACKEND_URL").map(|base_url| BackendConfig {
            base_url,
            timeout: var("CHAT_BACKEND_TIMEOUT_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_BACKEND_TIMEOUT),
            auth_token: var("CHAT_BACKEND_TOKEN"),
        });

        Ok(Self {
            bind_addr,
            page_path,
            sidebar_selector,
            catalog_path,
            enable_cors,
            session_ttl,
            normalize_input,
            backend,
        })
    }

    /// Environment config with the TOML file at `path` layered on top.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = Self::from_env()?;
        let Some(path) = path else {
            return Ok(config);
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let file: FileConfig =
            toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config.overlay(file))
    }

    pub fn overlay(mut self, file: FileConfig) -> Self {
        if let Some(addr) = file.bind_addr {
            self.bind_addr = addr;
        }
        if let Some(page) = file.page_path {
            self.page_path = Some(page);
        }
        if let Some(selector) = file.sidebar_selector {
            self.sidebar_selector = selector;
        }
        if let Some(catalog) = file.catalog_path {
            self.catalog_path = catalog;
        }
        if let Some(cors) = file.enable_cors {
            self.enable_cors = cors;
        }
        if let Some(secs) = file.session_ttl_secs {
            self.session_ttl = Duration::from_secs(secs);
        }
        if let Some(normalize) = file.normalize_input {
            self.normalize_input = normalize;
        }
        if let Some(backend) = file.backend {
            let current = self.backend.take();
            let base_url = backend
                .url
                .or_else(|| current.as_ref().map(|b| b.base_url.clone()));
            self.backend = base_url.map(|base_url| BackendConfig {
                base_url,
                timeout: backend
                    .timeout_ms
                    .map(Duration::from_millis)
                    .or_else(|| current.as_ref().map(|b| b.timeout))
                    .unwrap_or(DEFAULT_BACKEND_TIMEOUT),
                auth_token: backend
                    .auth_token
                    .or_else(|| current.and_then(|b| b.auth_token)),
            });
        }
        self
    }
}

fn flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.sidebar_selector, ".sidebar-item");
        assert!(cfg.backend.is_none());
        assert_eq!(cfg.session_ttl, Duration::from_secs(43_200));
        assert!(!cfg.enable_cors);
    }

    #[test]
    fn reads_backend_from_environment() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("CHAT_BACKEND_URL", "http://rasa:5005"),
            ("CHAT_BACKEND_TIMEOUT_MS", "250"),
            ("ENABLE_CORS", "TRUE"),
            ("SESSION_TTL_SECS", "60"),
        ]))
        .unwrap();
        let backend = cfg.backend.unwrap();
        assert_eq!(backend.base_url, "http://rasa:5005");
        assert_eq!(backend.timeout, Duration::from_millis(250));
        assert!(cfg.enable_cors);
        assert_eq!(cfg.session_ttl, Duration::from_secs(60));
    }

    #[test]
    fn rejects_bad_bind_addr() {
        assert!(AppConfig::from_lookup(lookup(&[("BIND_ADDR", "nope")])).is_err());
    }

    #[test]
    fn file_overrides_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
bind_addr = "127.0.0.1:9000"
sidebar_selector = "nav .cert"
normalize_input = true

[backend]
url = "http://localhost:5005"
timeout_ms = 1500
"#
        )
        .unwrap();
        let raw = std::fs::read_to_string(file.path()).unwrap();
        let parsed: FileConfig = toml::from_str(&raw).unwrap();
        let cfg = AppConfig::default().overlay(parsed);
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(cfg.sidebar_selector, "nav .cert");
        assert!(cfg.normalize_input);
        let backend = cfg.backend.unwrap();
        assert_eq!(backend.base_url, "http://localhost:5005");
        assert_eq!(backend.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("colour = \"blue\"").is_err());
    }
}
