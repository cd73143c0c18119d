use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context};
use form_controls::TypeaheadConfig;
use serde::Deserialize;
use url::Url;

const SETTINGS_FILE: &str = "schedules.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_url: String,
    pub search_debounce_ms: u64,
    pub search_timeout_ms: u64,
    pub suggestion_limit: usize,
    pub state_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".into(),
            search_debounce_ms: 250,
            search_timeout_ms: 6000,
            suggestion_limit: 15,
            state_path: None,
        }
    }
}

impl Settings {
    /// Backend base URL; `override_url` comes from `--api-url`.
    pub fn api_url(&self, override_url: Option<&str>) -> anyhow::Result<Url> {
        let raw = override_url.unwrap_or(&self.api_url).trim();
        let url = Url::parse(raw).with_context(|| format!("invalid api url '{raw}'"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("api url must use http or https, got '{}'", url.scheme());
        }
        Ok(url)
    }

    pub fn typeahead(&self, base: TypeaheadConfig) -> TypeaheadConfig {
        TypeaheadConfig {
            debounce: Duration::from_millis(self.search_debounce_ms),
            timeout: Duration::from_millis(self.search_timeout_ms),
            result_limit: self.suggestion_limit.max(1),
            ..base
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

/// Flat `key = "value"` pairs; a file that does not parse is skipped.
pub(crate) fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.get("api_url") {
        settings.api_url = v.clone();
    }
    if let Some(v) = file_cfg.get("search_debounce_ms").and_then(|v| v.parse().ok()) {
        settings.search_debounce_ms = v;
    }
    if let Some(v) = file_cfg.get("search_timeout_ms").and_then(|v| v.parse().ok()) {
        settings.search_timeout_ms = v;
    }
    if let Some(v) = file_cfg.get("suggestion_limit").and_then(|v| v.parse().ok()) {
        settings.suggestion_limit = v;
    }
    if let Some(v) = file_cfg.get("state_path") {
        settings.state_path = Some(PathBuf::from(v));
    }
}

pub(crate) fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SCHEDULES_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = var("APP__SEARCH_DEBOUNCE_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.search_debounce_ms = parsed;
        }
    }
    if let Some(v) = var("APP__SEARCH_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.search_timeout_ms = parsed;
        }
    }
    if let Some(v) = var("APP__SUGGESTION_LIMIT") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.suggestion_limit = parsed;
        }
    }

    if let Some(v) = var("APP__STATE_PATH") {
        settings.state_path = Some(PathBuf::from(v));
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
