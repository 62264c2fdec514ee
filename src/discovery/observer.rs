use crate::error::Result;
use crate::filter::LatestBenchmarksFilter;
use async_trait::async_trait;

/// A network response seen by the browser, with its body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedResponse {
    pub url: String,
    pub body: String,
}

impl ObservedResponse {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

/// Base trait for browser engines the discovery session can watch
#[async_trait]
pub trait ResponseObserver: Send {
    /// Launch the browser and load `portal_url`, recording responses from then on
    async fn open(&mut self, portal_url: &str) -> Result<()>;

    /// Take the listing responses recorded so far, in arrival order
    async fn drain(&mut self, filter: &LatestBenchmarksFilter) -> Result<Vec<ObservedResponse>>;

    /// Shut the browser down
    async fn close(&mut self) -> Result<()>;
}
