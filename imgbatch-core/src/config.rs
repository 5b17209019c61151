use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://image.pollinations.ai/prompt/";
pub const DEFAULT_MODEL: &str = "flux";
/// Sent as `referrer` when the caller does not set one.
pub const DEFAULT_REFERRER: &str = "imgbatch-cli";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

impl FromStr for ImageSize {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidSize(value.to_string());
        let (w, h) = value.split_once('x').ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        Ok(Self { width, height })
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationFlags {
    pub nologo: bool,
    pub private: bool,
    pub safe: bool,
    pub enhance: bool,
}

impl Default for GenerationFlags {
    fn default() -> Self {
        Self {
            nologo: true,
            private: false,
            safe: false,
            enhance: true,
        }
    }
}

/// Per-run configuration. Built once from user input and shared read-only
/// (behind an `Arc`) by every task of the run.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub base_url: Url,
    pub model: String,
    pub size: ImageSize,
    /// Fixed seed reused by every task; a random seed is drawn per task when unset.
    pub seed: Option<u64>,
    pub flags: GenerationFlags,
    pub negative_prompt: Option<String>,
    pub referrer: Option<String>,
    pub save: bool,
    pub retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let base_url = Url::parse(DEFAULT_BASE_URL).unwrap_or_else(|e| {
            panic!("default base URL is invalid: {e}. This is a bug - please report it.");
        });
        Self {
            base_url,
            model: DEFAULT_MODEL.to_string(),
            size: ImageSize::default(),
            seed: None,
            flags: GenerationFlags::default(),
            negative_prompt: None,
            referrer: None,
            save: true,
            retries: 3,
            retry_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
            log_file: None,
        }
    }
}

impl GenerationConfig {
    /// Total attempts per task: the initial one plus every retry.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    pub fn effective_referrer(&self) -> &str {
        match self.referrer.as_deref() {
            Some(r) if !r.is_empty() => r,
            _ => DEFAULT_REFERRER,
        }
    }

    pub fn effective_negative_prompt(&self) -> Option<&str> {
        self.negative_prompt.as_deref().filter(|n| !n.is_empty())
    }
}

/// Parses the API base URL. The prompt is appended as the last path segment,
/// so the path always ends with `/`.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            message: "URL cannot be used as a base".to_string(),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
