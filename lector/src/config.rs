//! Configuration for a proofreading session.
//!
//! Loads `config.toml` from an explicit path, from the nearest `.lector/`
//! directory found by [`discover`], or falls back to the defaults embedded in
//! the crate.
//!
//! # Architecture
//!
//! 1. **Host startup** calls [`discover`] with its working directory
//! 2. [`Config::load_with_overrides`] picks the config path: explicit > discovered > defaults
//! 3. The [`Config`] is passed to [`crate::Session::new()`], which derives the
//!    parser, resolver and viewport settings from it
//!
//! # Testing
//!
//! Tests use [`Config::load()`] with explicit paths to temporary directories.

use crate::{
    overlap::OverlapPolicy,
    suggestion::DEFAULT_WRAP_WIDTH,
    viewport::{DEFAULT_CLIP_THRESHOLD, DEFAULT_MAX_RENDERED_RESULTS},
};
use anyhow::{Context, Result};
use lector_service::{HttpService, ServiceError};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Name of the per-project configuration directory.
pub const CONFIG_DIR_NAME: &str = ".lector";

/// Session configuration, loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Endpoint receiving the `language`/`text` form POST.
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Language tag sent with each check. A bare `en` goes out as `en-US`.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Rule ids dropped while parsing, in addition to `SENTENCE_WHITESPACE`.
    pub ignored_rules: Vec<String>,

    /// Display width for wrapped messages. 0 disables wrapping.
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,

    /// Result sets at or below this size are drawn without viewport clipping.
    #[serde(default = "default_clip_threshold")]
    pub clip_threshold: usize,

    /// Cap on highlights drawn at once before collapsing to the focused result.
    #[serde(default = "default_max_rendered_results")]
    pub max_rendered_results: usize,

    pub overlap_policy: OverlapPolicy,

    /// When set, only the response to the most recent check is accepted.
    /// Otherwise whichever response arrives last wins.
    #[serde(default = "default_discard_stale_responses")]
    pub discard_stale_responses: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            language: default_language(),
            request_timeout_ms: default_request_timeout_ms(),
            user_agent: default_user_agent(),
            ignored_rules: Vec::new(),
            wrap_width: default_wrap_width(),
            clip_threshold: default_clip_threshold(),
            max_rendered_results: default_max_rendered_results(),
            overlap_policy: OverlapPolicy::default(),
            discard_stale_responses: default_discard_stale_responses(),
        }
    }
}

fn default_service_url() -> String {
    "http://tools.wmflabs.org/languageproofing/".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    "lector".to_string()
}

fn default_wrap_width() -> usize {
    DEFAULT_WRAP_WIDTH
}

fn default_clip_threshold() -> usize {
    DEFAULT_CLIP_THRESHOLD
}

fn default_max_rendered_results() -> usize {
    DEFAULT_MAX_RENDERED_RESULTS
}

fn default_discard_stale_responses() -> bool {
    true
}

impl Config {
    /// Read and deserialize a TOML config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration with priority: explicit path > discovered path > defaults.
    pub fn load_with_overrides(
        explicit: Option<&Path>,
        discovered_path: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = discovered_path {
            return Self::load(path);
        }
        Self::load_embedded()
    }

    fn load_embedded() -> Result<Self> {
        let source = include_str!("../config.toml");
        toml::from_str(source).context("Failed to parse embedded config.toml")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// HTTP transport for the configured endpoint, timeout and user agent.
    pub fn http_service(&self) -> Result<HttpService, ServiceError> {
        HttpService::new(&self.service_url, self.request_timeout(), &self.user_agent)
    }
}

/// Find the config file for `start_dir`.
///
/// Walks up from `start_dir` looking for `.lector/config.toml`, then tries
/// `lector/config.toml` under the user's config directory.
pub fn discover(start_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = walk_ancestors(start_dir) {
        tracing::info!("found project config: {}", path.display());
        return Some(path);
    }
    let path = dirs::config_dir()?.join("lector").join("config.toml");
    if path.is_file() {
        tracing::info!("using system config: {}", path.display());
        Some(path)
    } else {
        tracing::debug!("no config file found");
        None
    }
}

fn walk_ancestors(start_dir: &Path) -> Option<PathBuf> {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join(CONFIG_DIR_NAME).join("config.toml");
        if candidate.is_file() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
