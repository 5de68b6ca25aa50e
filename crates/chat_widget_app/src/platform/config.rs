//! Shell configuration: optional RON file, then environment overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chat_widget_engine::ClientSettings;
use serde::Deserialize;
use widget_logging::widget_info;

pub(crate) const CONFIG_FILENAME: &str = "chat_widget.ron";

const ENV_BASE_URL: &str = "CHAT_API_BASE_URL";
const ENV_STATE_DIR: &str = "CHAT_WIDGET_STATE_DIR";
const ENV_TIMEOUT_MS: &str = "CHAT_REQUEST_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub base_url: String,
    pub state_dir: PathBuf,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub log_to_terminal: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            base_url: client.base_url,
            state_dir: PathBuf::from(".chat_widget"),
            request_timeout_ms: duration_ms(client.request_timeout),
            connect_timeout_ms: duration_ms(client.connect_timeout),
            log_to_terminal: false,
        }
    }
}

impl AppConfig {
    /// Loads `path` if it exists, then applies environment overrides.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config: AppConfig = ron::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?;
            widget_info!("Loaded config from {:?}", path);
            config
        } else {
            AppConfig::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_STATE_DIR).filter(|v| !v.trim().is_empty()) {
            self.state_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            self.request_timeout_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_MS} must be milliseconds, got {raw:?}"))?;
        }
        Ok(())
    }

    pub(crate) fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_widget_contract() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_ms, 60_000);
        assert_eq!(
            config.client_settings().request_timeout,
            Duration::from_secs(60)
        );
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[
                (ENV_BASE_URL, " https://api.example.com "),
                (ENV_STATE_DIR, "/tmp/widget"),
                (ENV_TIMEOUT_MS, "1500"),
            ]))
            .unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.state_dir, PathBuf::from("/tmp/widget"));
        assert_eq!(config.request_timeout_ms, 1500);
    }

    #[test]
    fn bad_timeout_is_reported() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(env(&[(ENV_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_MS));
    }

    #[test]
    fn partial_ron_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(base_url: \"http://docs.internal:9000\")").unwrap();

        let mut config: AppConfig = ron::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        config.apply_overrides(env(&[])).unwrap();
        assert_eq!(config.base_url, "http://docs.internal:9000");
        assert_eq!(config.request_timeout_ms, 60_000);
    }
}
