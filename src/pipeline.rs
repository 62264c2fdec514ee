use crate::catalog::fetch_technology_catalog;
use crate::config::HarvestConfig;
use crate::discovery::{DiscoverySession, ResponseObserver, WebDriverObserver};
use crate::download::{DownloadOutcome, Downloader};
use crate::error::Result;
use crate::records::TechnologyStore;

/// Totals for one harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Technologies listed by the catalog
    pub technologies: usize,
    /// Resources found during discovery, duplicates included
    pub discovered: usize,
    pub downloaded: usize,
    pub skipped: usize,
    /// Bytes written by this run
    pub bytes: u64,
}

/// Catalog, discovery and download, in sequence
pub struct Harvest {
    config: HarvestConfig,
}

impl Harvest {
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Runs against a real browser driven through WebDriver
    pub async fn run(&self) -> Result<HarvestReport> {
        let mut observer =
            WebDriverObserver::new(self.config.webdriver_url.clone(), self.config.headless);
        self.run_with(&mut observer).await
    }

    /// Runs with the given browser observer.
    ///
    /// The first fatal error stops the run; files already written stay.
    /// Once the catalog is in, the browser is closed at the end of the run
    /// whether or not it succeeded.
    pub async fn run_with<O>(&self, observer: &mut O) -> Result<HarvestReport>
    where
        O: ResponseObserver + ?Sized,
    {
        self.config.validate()?;

        let mut store = fetch_technology_catalog(&self.config).await?;
        let result = self.discover_and_download(observer, &mut store).await;

        if let Err(e) = observer.close().await {
            ::log::warn!("Failed to close browser: {}", e);
        }
        result
    }

    async fn discover_and_download<O>(
        &self,
        observer: &mut O,
        store: &mut TechnologyStore,
    ) -> Result<HarvestReport>
    where
        O: ResponseObserver + ?Sized,
    {
        DiscoverySession::new(&self.config)
            .run(observer, store)
            .await?;

        let total = store.total_resources();
        let mut report = HarvestReport {
            technologies: store.len(),
            discovered: total,
            ..HarvestReport::default()
        };
        ::log::info!(
            "Found {} benchmarks across {} technologies",
            total,
            store.len()
        );

        let downloader = Downloader::new(&self.config)?;
        for (index, resource) in store.resources().enumerate() {
            let label = format!("{}/{}", index + 1, total);
            match downloader.download(resource, &label).await? {
                DownloadOutcome::Skipped => report.skipped += 1,
                DownloadOutcome::Downloaded { bytes } => {
                    report.downloaded += 1;
                    report.bytes += bytes;
                }
            }
        }

        if report.skipped > 0 {
            // Skip notices are printed without a trailing newline
            println!();
        }

        ::log::info!(
            "Downloads complete - {} downloaded ({} bytes), {} already present",
            report.downloaded,
            report.bytes,
            report.skipped
        );
        Ok(report)
    }
}
