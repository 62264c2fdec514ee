use crate::error::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarvestConfig {
    /// JSON endpoint listing technology categories
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Single-page-app URL loaded in the browser
    #[serde(default = "default_portal_url")]
    pub portal_url: String,

    /// Prefix the document credential id is appended to
    #[serde(default = "default_pdf_base_url")]
    pub pdf_base_url: String,

    /// Root of the `<category>/<title>` layout
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// How long the portal is observed for benchmark listings
    #[serde(default = "default_observation_window_secs")]
    pub observation_window_secs: u64,

    /// Write granularity for downloads, in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Skip TLS certificate validation on catalog and PDF requests
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_catalog_url() -> String {
    "https://downloads.cisecurity.org/technology".to_string()
}

fn default_portal_url() -> String {
    "https://downloads.cisecurity.org/#/".to_string()
}

fn default_pdf_base_url() -> String {
    "https://learn.cisecurity.org".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_observation_window_secs() -> u64 {
    5
}

fn default_chunk_size() -> usize {
    1024
}

fn default_headless() -> bool {
    true
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            portal_url: default_portal_url(),
            pdf_base_url: default_pdf_base_url(),
            output_dir: default_output_dir(),
            webdriver_url: default_webdriver_url(),
            observation_window_secs: default_observation_window_secs(),
            chunk_size: default_chunk_size(),
            headless: default_headless(),
            accept_invalid_certs: false,
        }
    }
}

impl HarvestConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| HarvestError::io(path, e))?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| HarvestError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Override the WebDriver URL with an environment variable if provided
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }

    pub fn observation_window(&self) -> Duration {
        Duration::from_secs(self.observation_window_secs)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("catalog_url", &self.catalog_url),
            ("portal_url", &self.portal_url),
            ("pdf_base_url", &self.pdf_base_url),
            ("webdriver_url", &self.webdriver_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| HarvestError::Config(format!("{name} {value:?}: {e}")))?;
        }
        if self.chunk_size == 0 {
            return Err(HarvestError::Config("chunk_size must be positive".into()));
        }
        Ok(())
    }
}
