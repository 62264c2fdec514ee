use crate::config::HarvestConfig;
use crate::discovery::{ObservedResponse, ResponseObserver};
use crate::error::{HarvestError, Result};
use crate::filter::LatestBenchmarksFilter;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use wiremock::MockServer;

/// In-memory browser that "sees" a fixed list of responses
#[derive(Debug, Default)]
pub struct StaticObserver {
    pub responses: Vec<ObservedResponse>,
    pub fail_open: bool,
    pub opened: Option<String>,
    pub closed: bool,
    /// File whose presence is recorded when the browser is closed
    pub watch: Option<PathBuf>,
    pub watched_existed_at_close: Option<bool>,
}

impl StaticObserver {
    pub fn with(responses: Vec<ObservedResponse>) -> Self {
        Self {
            responses,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ResponseObserver for StaticObserver {
    async fn open(&mut self, portal_url: &str) -> Result<()> {
        if self.fail_open {
            return Err(HarvestError::Browser("no browser available".into()));
        }
        self.opened = Some(portal_url.to_string());
        Ok(())
    }

    async fn drain(&mut self, filter: &LatestBenchmarksFilter) -> Result<Vec<ObservedResponse>> {
        Ok(self
            .responses
            .drain(..)
            .filter(|r| filter.is_listing(&r.url))
            .collect())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.watched_existed_at_close = self.watch.as_ref().map(|p| p.exists());
        Ok(())
    }
}

/// Config pointing the catalog and PDF endpoints at `server`
pub fn test_config(server: &MockServer, output_dir: &Path) -> HarvestConfig {
    HarvestConfig {
        catalog_url: format!("{}/technology", server.uri()),
        pdf_base_url: server.uri(),
        output_dir: output_dir.to_path_buf(),
        observation_window_secs: 0,
        ..HarvestConfig::default()
    }
}

pub fn listing_url(technology_id: &str) -> String {
    format!("https://downloads.cisecurity.org/technology/{technology_id}/benchmarks/latest")
}
