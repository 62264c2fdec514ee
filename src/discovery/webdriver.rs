//! Chrome over WebDriver, with network responses read back from the
//! performance log.
//!
//! Chrome buffers DevTools `Network.*` events in the `performance` log when
//! the session is created with `goog:loggingPrefs`. Draining that log after
//! the observation window gives the responses in arrival order; bodies are
//! then pulled through ChromeDriver's DevTools passthrough.

use super::observer::{ObservedResponse, ResponseObserver};
use crate::error::{HarvestError, Result};
use crate::filter::LatestBenchmarksFilter;
use async_trait::async_trait;
use fantoccini::wd::WebDriverCompatibleCommand;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(45);

/// Tried in order when the configured WebDriver URL refuses the session
const FALLBACK_WEBDRIVER_URLS: [&str; 2] = [
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// ChromeDriver extension endpoints not covered by fantoccini
#[derive(Debug, Clone)]
enum ChromeCommand {
    /// Read and clear the performance log
    PerformanceLog,
    /// Run a DevTools protocol method in the page target
    Cdp { method: String, params: Value },
}

impl WebDriverCompatibleCommand for ChromeCommand {
    fn endpoint(
        &self,
        base_url: &Url,
        session_id: Option<&str>,
    ) -> std::result::Result<Url, url::ParseError> {
        let session = session_id.unwrap_or_default();
        match self {
            ChromeCommand::PerformanceLog => base_url.join(&format!("session/{session}/se/log")),
            ChromeCommand::Cdp { .. } => {
                base_url.join(&format!("session/{session}/goog/cdp/execute"))
            }
        }
    }

    fn method_and_body(&self, _request_url: &Url) -> (http::Method, Option<String>) {
        let body = match self {
            ChromeCommand::PerformanceLog => json!({ "type": "performance" }),
            ChromeCommand::Cdp { method, params } => json!({ "cmd": method, "params": params }),
        };
        (http::Method::POST, Some(body.to_string()))
    }
}

/// Browser observer backed by a WebDriver session
pub struct WebDriverObserver {
    webdriver_url: String,
    fallback_urls: Vec<String>,
    headless: bool,
    client: Option<Client>,
}

impl WebDriverObserver {
    pub fn new(webdriver_url: impl Into<String>, headless: bool) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            fallback_urls: FALLBACK_WEBDRIVER_URLS.iter().map(|u| u.to_string()).collect(),
            headless,
            client: None,
        }
    }

    /// Replace the URLs tried after the configured one fails
    pub fn with_fallback_urls(mut self, urls: Vec<String>) -> Self {
        self.fallback_urls = urls;
        self
    }

    fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| HarvestError::Browser("browser is not open".into()))
    }

    async fn response_body(&self, request_id: &str) -> Result<String> {
        let reply = self
            .client()?
            .issue_cmd(ChromeCommand::Cdp {
                method: "Network.getResponseBody".into(),
                params: json!({ "requestId": request_id }),
            })
            .await
            .map_err(|e| HarvestError::Browser(e.to_string()))?;

        if reply.get("base64Encoded").and_then(Value::as_bool) == Some(true) {
            return Err(HarvestError::Browser(format!(
                "response {request_id} has a binary body"
            )));
        }
        reply
            .get("body")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| HarvestError::Browser(format!("response {request_id} has no body")))
    }
}

#[async_trait]
impl ResponseObserver for WebDriverObserver {
    async fn open(&mut self, portal_url: &str) -> Result<()> {
        let client =
            connect_to_webdriver(&self.webdriver_url, &self.fallback_urls, self.headless).await?;

        ::log::info!("Navigating to {}", portal_url);
        let navigation = timeout(NAVIGATION_TIMEOUT, client.goto(portal_url)).await;
        let failure = match navigation {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(navigation_error(e, portal_url)),
            Err(_) => Some(HarvestError::Browser(format!("timeout loading {portal_url}"))),
        };

        if let Some(e) = failure {
            if let Err(close_err) = client.close().await {
                ::log::warn!("Failed to close client: {}", close_err);
            }
            return Err(e);
        }

        self.client = Some(client);
        Ok(())
    }

    async fn drain(&mut self, filter: &LatestBenchmarksFilter) -> Result<Vec<ObservedResponse>> {
        let entries = self
            .client()?
            .issue_cmd(ChromeCommand::PerformanceLog)
            .await
            .map_err(|e| HarvestError::Browser(format!("reading performance log: {e}")))?;

        let received = listing_responses(&entries, filter);
        ::log::debug!("Performance log holds {} listing responses", received.len());

        let mut responses = Vec::with_capacity(received.len());
        for (request_id, url) in received {
            match self.response_body(&request_id).await {
                Ok(body) => responses.push(ObservedResponse { url, body }),
                Err(e) => ::log::warn!("Dropping response {}: {}", url, e),
            }
        }
        Ok(responses)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| HarvestError::Browser(format!("closing session: {e}")))?;
            ::log::debug!("Browser session closed");
        }
        Ok(())
    }
}

fn capabilities(headless: bool) -> serde_json::Map<String, Value> {
    let mut args = vec!["--disable-gpu", "--no-sandbox", "--disable-dev-shm-usage"];
    if headless {
        args.push("--headless=new");
    }

    let mut caps = serde_json::Map::new();
    caps.insert("browserName".into(), json!("chrome"));
    caps.insert("goog:chromeOptions".into(), json!({ "args": args }));
    caps.insert("goog:loggingPrefs".into(), json!({ "performance": "ALL" }));
    caps
}

/// Connects to the WebDriver instance, launching a browser session
async fn connect_to_webdriver(
    webdriver_url: &str,
    fallback_urls: &[String],
    headless: bool,
) -> Result<Client> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities(headless));

    let first_error = match builder.connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e.to_string()
        }
    };

    // If we couldn't connect, try with common alternative URLs
    for url in fallback_urls.iter().map(String::as_str) {
        if url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = builder.connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a ChromeDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(HarvestError::Browser(format!(
        "could not start a browser session at {webdriver_url}: {first_error}"
    )))
}

fn navigation_error(error: fantoccini::error::CmdError, url: &str) -> HarvestError {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost session while loading {}", url);
    }
    HarvestError::Browser(format!("failed to load {url}: {error}"))
}

/// Picks `(requestId, url)` of listing responses out of raw performance log entries
fn listing_responses(entries: &Value, filter: &LatestBenchmarksFilter) -> Vec<(String, String)> {
    let Some(entries) = entries.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| entry.get("message")?.as_str())
        .filter_map(|message| serde_json::from_str::<Value>(message).ok())
        .filter_map(|message| {
            let event = message.get("message")?;
            if event.get("method")?.as_str()? != "Network.responseReceived" {
                return None;
            }
            let params = event.get("params")?;
            let url = params.get("response")?.get("url")?.as_str()?;
            if !filter.is_listing(url) {
                return None;
            }
            let request_id = params.get("requestId")?.as_str()?;
            Some((request_id.to_string(), url.to_string()))
        })
        .collect()
}
