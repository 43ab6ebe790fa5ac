use std::path::PathBuf;

use crate::{Error, Result};

pub const ENV_BACKEND_URL: &str = "CAMBLISS_BACKEND_URL";
pub const ENV_API_KEY: &str = "CAMBLISS_API_KEY";
pub const ENV_AUDIO_BASE_URL: &str = "CAMBLISS_AUDIO_BASE_URL";
pub const ENV_STATE_DIR: &str = "CAMBLISS_STATE_DIR";

pub const DEFAULT_AUDIO_BASE_URL: &str = "https://audio.cambliss.com/episodes";
pub const DEFAULT_STATE_DIR: &str = ".cambliss";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend_url: Option<String>,
    pub api_key: Option<String>,
    pub audio_base_url: String,
    pub state_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: None,
            api_key: None,
            audio_base_url: DEFAULT_AUDIO_BASE_URL.to_string(),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            backend_url: get(ENV_BACKEND_URL),
            api_key: get(ENV_API_KEY),
            audio_base_url: get(ENV_AUDIO_BASE_URL).unwrap_or(defaults.audio_base_url),
            state_dir: get(ENV_STATE_DIR).map(PathBuf::from).unwrap_or(defaults.state_dir),
        }
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = Some(url.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_audio_base_url(mut self, url: impl Into<String>) -> Self {
        self.audio_base_url = url.into();
        self
    }

    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    /// Backend url and API key, or a configuration error naming what is missing.
    pub fn backend_credentials(&self) -> Result<(&str, &str)> {
        let url = self
            .backend_url
            .as_deref()
            .ok_or_else(|| Error::Configuration(format!("{} is not set", ENV_BACKEND_URL)))?;
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Configuration(format!("{} is not set", ENV_API_KEY)))?;
        Ok((url, key))
    }
}
