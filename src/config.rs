use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{CourtsideError, Result};
use crate::pagination::PageSizePolicy;

pub const DEFAULT_BASE_URL: &str = "https://www.balldontlie.io/api/v1";
pub const DEFAULT_PAGE_SIZE: u32 = 5;

#[derive(Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub page_size: Option<u32>,
    pub reset_page_on_resize: Option<bool>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| CourtsideError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| CourtsideError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "courtside")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(CourtsideError::NoConfigDir)
    }

    /// API base URL with env var taking precedence over config file.
    pub fn base_url(&self) -> String {
        if let Ok(url) = std::env::var("COURTSIDE_API_URL") {
            return url;
        }

        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Page size, preferring an explicit argument over config over default.
    pub fn resolve_page_size(&self, explicit: Option<u32>) -> u32 {
        explicit
            .or(self.page_size)
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn page_size_policy(&self) -> PageSizePolicy {
        if self.reset_page_on_resize.unwrap_or(false) {
            PageSizePolicy::ResetToFirst
        } else {
            PageSizePolicy::PreservePosition
        }
    }
}
