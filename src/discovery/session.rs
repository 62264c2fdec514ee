use super::observer::{ObservedResponse, ResponseObserver};
use crate::config::HarvestConfig;
use crate::documents::extract_document_info;
use crate::error::{HarvestError, Result};
use crate::filter::LatestBenchmarksFilter;
use crate::records::{ResourceRecord, TechnologyStore};
use crate::utils::sanitize_component;
use serde_json::Value;
use std::time::Duration;

/// One pass over the portal: load it, watch it for a fixed window, and file
/// every listed document under its technology.
///
/// Capture is best effort. Listings that arrive after the window closes are
/// lost, and a technology with no listing keeps an empty resource list.
#[derive(Debug, Clone)]
pub struct DiscoverySession {
    portal_url: String,
    pdf_base_url: String,
    window: Duration,
    filter: LatestBenchmarksFilter,
}

impl DiscoverySession {
    pub fn new(config: &HarvestConfig) -> Self {
        Self {
            portal_url: config.portal_url.clone(),
            pdf_base_url: config.pdf_base_url.clone(),
            window: config.observation_window(),
            filter: LatestBenchmarksFilter::new(),
        }
    }

    /// Runs the session and returns the number of resources appended.
    ///
    /// The browser is left open; closing it is up to the caller.
    pub async fn run<O>(&self, observer: &mut O, store: &mut TechnologyStore) -> Result<usize>
    where
        O: ResponseObserver + ?Sized,
    {
        observer.open(&self.portal_url).await?;

        ::log::info!(
            "Observing {} for {} seconds",
            self.portal_url,
            self.window.as_secs_f64()
        );
        tokio::time::sleep(self.window).await;

        let responses = observer.drain(&self.filter).await?;

        let mut appended = 0;
        for response in &responses {
            appended += self.record(store, response)?;
        }

        ::log::info!(
            "Discovered {} documents from {} listing responses",
            appended,
            responses.len()
        );
        Ok(appended)
    }

    /// Files the documents of one response under its technology.
    ///
    /// Responses for unknown technologies or other endpoints are ignored.
    /// Repeated listings append again.
    pub fn record(&self, store: &mut TechnologyStore, response: &ObservedResponse) -> Result<usize> {
        let Some(technology_id) = self.filter.technology_id(&response.url) else {
            return Ok(0);
        };
        let Some(technology) = store.get_mut(technology_id) else {
            ::log::debug!("No catalog entry for listing {}", response.url);
            return Ok(0);
        };

        let payload: Value = serde_json::from_str(&response.body)
            .map_err(|e| HarvestError::Documents(format!("{}: {e}", response.url)))?;
        let documents = extract_document_info(&payload)?;

        for (document_id, info) in &documents {
            technology.resources.push(ResourceRecord {
                document_id: document_id.clone(),
                file_path: technology
                    .directory_path
                    .join(sanitize_component(&info.filename)),
                pdf_url: format!("{}{}", self.pdf_base_url, info.credential_id),
            });
        }

        ::log::debug!(
            "Technology {} lists {} documents",
            technology_id,
            documents.len()
        );
        Ok(documents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn store() -> TechnologyStore {
        let mut store = TechnologyStore::new();
        store.insert("7".into(), PathBuf::from("Operating Systems/Linux"));
        store.insert("17".into(), PathBuf::from("Cloud/AWS"));
        store
    }

    fn session() -> DiscoverySession {
        DiscoverySession::new(&HarvestConfig::default())
    }

    const LISTING: &str =
        r#"[{"documents":[{"id":"d1","pardot-id":"/x1","filename":"bench.pdf"}]}]"#;

    #[test]
    fn test_record_builds_resource() {
        let mut store = store();
        let response = ObservedResponse::new(
            "https://downloads.cisecurity.org/technology/7/benchmarks/latest",
            LISTING,
        );

        assert_eq!(session().record(&mut store, &response).unwrap(), 1);
        let linux = store.get("7").unwrap();
        assert_eq!(
            linux.resources,
            vec![ResourceRecord {
                document_id: "d1".into(),
                file_path: PathBuf::from("Operating Systems/Linux/bench.pdf"),
                pdf_url: "https://learn.cisecurity.org/x1".into(),
            }]
        );
        assert!(store.get("17").unwrap().resources.is_empty());
    }

    #[test]
    fn test_record_ignores_unrelated_responses() {
        let mut store = store();
        for url in [
            "https://downloads.cisecurity.org/technology",
            "https://downloads.cisecurity.org/technology/99/benchmarks/latest",
        ] {
            let response = ObservedResponse::new(url, "not even json");
            assert_eq!(session().record(&mut store, &response).unwrap(), 0);
        }
        assert_eq!(store.total_resources(), 0);
    }

    #[test]
    fn test_repeated_listing_appends_again() {
        let mut store = store();
        let response =
            ObservedResponse::new("https://x.org/technology/7/benchmarks/latest", LISTING);

        session().record(&mut store, &response).unwrap();
        session().record(&mut store, &response).unwrap();
        assert_eq!(store.get("7").unwrap().resources.len(), 2);
    }

    #[test]
    fn test_file_paths_stay_under_technology_directory() {
        let mut store = store();
        let body = r#"[{"documents":[
            {"id":"a","pardot-id":"/a","filename":"../../escape.pdf"},
            {"id":"b","pardot-id":"/b","filename":"/etc/passwd"},
            {"id":"c","pardot-id":"/c","filename":".."}
        ]}]"#;
        let response = ObservedResponse::new("https://x.org/17/benchmarks/latest", body);

        session().record(&mut store, &response).unwrap();
        let aws = store.get("17").unwrap();
        assert_eq!(aws.resources.len(), 3);
        for resource in &aws.resources {
            assert_eq!(resource.file_path.parent(), Some(aws.directory_path.as_path()));
        }
    }

    #[test]
    fn test_malformed_listing_is_an_error() {
        let mut store = store();
        let response = ObservedResponse::new("https://x.org/7/benchmarks/latest", "{oops");
        assert!(matches!(
            session().record(&mut store, &response),
            Err(HarvestError::Documents(_))
        ));
    }
}
