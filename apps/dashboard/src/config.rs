use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::{ControllerOptions, QueryState, ResolverOptions};
use serde::Deserialize;
use shared::domain::{PageSize, SortDirection, SortField};
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

const DEFAULT_ENDPOINTS: [&str; 3] = [
    "https://localhost:7119/api/performance",
    "http://localhost:5162/api/performance",
    "https://studentperf-api-frcyfegwfyc7b0hk.indonesiacentral-01.azurewebsites.net/api/performance",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoints: Vec<String>,
    pub probe_timeout: Duration,
    pub request_timeout: Duration,
    pub search_debounce: Duration,
    pub page_size: PageSize,
    pub sample_size: u32,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|url| url.to_string()).collect(),
            probe_timeout: client_core::endpoint::DEFAULT_PROBE_TIMEOUT,
            request_timeout: client_core::endpoint::DEFAULT_REQUEST_TIMEOUT,
            search_debounce: client_core::debounce::DEFAULT_SEARCH_DEBOUNCE,
            page_size: PageSize::default(),
            sample_size: client_core::filters::DEFAULT_SAMPLE_SIZE,
            sort_field: SortField::default(),
            sort_direction: SortDirection::default(),
        }
    }
}

/// Keys accepted in `dashboard.toml`. Everything is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    endpoints: Option<Vec<String>>,
    probe_timeout_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    search_debounce_ms: Option<u64>,
    page_size: Option<PageSize>,
    sample_size: Option<u32>,
    sort_by: Option<String>,
    sort_direction: Option<SortDirection>,
}

impl Settings {
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            probe_timeout: self.probe_timeout,
            request_timeout: self.request_timeout,
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            search_debounce: self.search_debounce,
            sample_size: self.sample_size,
            initial_query: QueryState::new(self.page_size, self.sort_field, self.sort_direction),
        }
    }

    fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file: FileConfig = toml::from_str(raw)?;

        if let Some(endpoints) = file.endpoints {
            self.endpoints = endpoints;
        }
        if let Some(ms) = file.probe_timeout_ms {
            self.probe_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = file.request_timeout_ms {
            self.request_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = file.search_debounce_ms {
            self.search_debounce = Duration::from_millis(ms);
        }
        if let Some(page_size) = file.page_size {
            self.page_size = page_size;
        }
        if let Some(sample_size) = file.sample_size {
            self.sample_size = sample_size;
        }
        if let Some(sort_by) = file.sort_by {
            self.sort_field = sort_by.parse()?;
        }
        if let Some(direction) = file.sort_direction {
            self.sort_direction = direction;
        }
        Ok(())
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("DASHBOARD_ENDPOINTS") {
            let endpoints: Vec<String> = v
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect();
            if endpoints.is_empty() {
                warn!(key = "DASHBOARD_ENDPOINTS", "ignoring empty endpoint list");
            } else {
                self.endpoints = endpoints;
            }
        }

        if let Some(ms) = parsed_env::<u64>(&var, "APP__PROBE_TIMEOUT_MS") {
            self.probe_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parsed_env::<u64>(&var, "APP__REQUEST_TIMEOUT_MS") {
            self.request_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parsed_env::<u64>(&var, "APP__SEARCH_DEBOUNCE_MS") {
            self.search_debounce = Duration::from_millis(ms);
        }
        if let Some(page_size) = parsed_env::<PageSize>(&var, "APP__PAGE_SIZE") {
            self.page_size = page_size;
        }
    }
}

fn parsed_env<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = var(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring invalid environment override");
            None
        }
    }
}

/// Defaults, then the config file, then environment overrides. A missing
/// `dashboard.toml` is fine; a missing file that was asked for explicitly is
/// not.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(&path) {
        Ok(raw) => settings
            .apply_file(&raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound && config_path.is_none() => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
        }
    }

    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}
