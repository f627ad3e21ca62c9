use std::{collections::HashMap, fs, time::Duration};

use client_core::catalog::{DEFAULT_CATALOG_URL, DEFAULT_LANGUAGE};

pub const CONFIG_FILE: &str = "catastream.toml";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub catalog_base_url: String,
    pub catalog_api_key: String,
    pub catalog_language: String,
    pub backend_base_url: String,
    pub debounce_ms: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_base_url: DEFAULT_CATALOG_URL.into(),
            catalog_api_key: String::new(),
            catalog_language: DEFAULT_LANGUAGE.into(),
            backend_base_url: DEFAULT_BACKEND_URL.into(),
            debounce_ms: 500,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string(CONFIG_FILE).ok();
    resolve_settings(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Layers defaults, the flat config file, then `CATASTREAM_*` and `APP__*`
/// variables. Later layers win.
pub fn resolve_settings(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(file_cfg) = file.and_then(|raw| toml::from_str::<HashMap<String, toml::Value>>(raw).ok())
    {
        apply(&mut settings, |key| file_cfg.get(key).map(scalar_text));
    }
    apply(&mut settings, |key| env(&format!("CATASTREAM_{}", key.to_uppercase())));
    apply(&mut settings, |key| env(&format!("APP__{}", key.to_uppercase())));

    settings.catalog_base_url = normalize_base_url(&settings.catalog_base_url, DEFAULT_CATALOG_URL);
    settings.backend_base_url = normalize_base_url(&settings.backend_base_url, DEFAULT_BACKEND_URL);
    settings
}

fn apply(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("catalog_base_url") {
        settings.catalog_base_url = v;
    }
    if let Some(v) = lookup("catalog_api_key") {
        settings.catalog_api_key = v;
    }
    if let Some(v) = lookup("catalog_language") {
        settings.catalog_language = v;
    }
    if let Some(v) = lookup("backend_base_url") {
        settings.backend_base_url = v;
    }
    if let Some(v) = lookup("debounce_ms") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.debounce_ms = parsed;
        }
    }
    if let Some(v) = lookup("log_filter") {
        settings.log_filter = v;
    }
}

fn scalar_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn normalize_base_url(raw: &str, fallback: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return fallback.to_string();
    }
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
