// src/config/mod.rs
//! Application configuration (TOML), with env overrides.
//!
//! Lookup order:
//! 1) $HOT_SEARCH_CONFIG_PATH (must exist)
//! 2) config/app.toml
//! 3) built-in defaults
//!
//! `HOT_SEARCH_API_BASE_URL` replaces `backend.base_url`, but only when it is an
//! absolute http(s) URL; anything else is ignored.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ranking::DEFAULT_BALANCE_HEAD;
use crate::stream::{DEFAULT_BUS_CAPACITY, DEFAULT_CHUNK_DELAY_MS, DEFAULT_CHUNK_SIZE};

pub const ENV_CONFIG_PATH: &str = "HOT_SEARCH_CONFIG_PATH";
pub const ENV_API_BASE_URL: &str = "HOT_SEARCH_API_BASE_URL";
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";
pub const DEFAULT_API_BASE_URL: &str = "https://seele-backend-rxdelkqjxi.cn-hangzhou.fcapp.run";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Items interleaved across platforms at the top of the merged list.
    pub balance_head: usize,
    /// Log the top-10 aggregate scores of every pass.
    pub debug: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            balance_head: DEFAULT_BALANCE_HEAD,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub chunk_size: usize,
    pub chunk_delay_ms: u64,
    pub bus_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay_ms: DEFAULT_CHUNK_DELAY_MS,
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// Request timeout; AI endpoints can take tens of seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load from an explicit TOML file, then apply env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let mut cfg: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.apply_env();
        cfg.sanitize();
        Ok(cfg)
    }

    /// Load using env var + fallbacks (see module docs).
    pub fn load() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from(&default_path);
        }
        let mut cfg = Self::default();
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Some(url) = std::env::var(ENV_API_BASE_URL)
            .ok()
            .and_then(|v| absolute_http_url(&v))
        {
            self.backend.base_url = url;
        }
    }

    fn sanitize(&mut self) {
        if self.stream.chunk_size == 0 {
            self.stream.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        if self.stream.bus_capacity == 0 {
            self.stream.bus_capacity = DEFAULT_BUS_CAPACITY;
        }
        if absolute_http_url(&self.backend.base_url).is_none() {
            self.backend.base_url = DEFAULT_API_BASE_URL.to_string();
        }
    }
}

fn absolute_http_url(raw: &str) -> Option<String> {
    let t = raw.trim();
    (t.starts_with("http://") || t.starts_with("https://")).then(|| t.to_string())
}
