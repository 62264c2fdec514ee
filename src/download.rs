use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use crate::progress::DownloadProgress;
use crate::records::ResourceRecord;
use reqwest::header::{CONTENT_LENGTH, COOKIE, HeaderValue};
use std::io::Write;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// What happened to a single resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The destination already existed; no request was made
    Skipped,
    /// The body was written to the destination
    Downloaded { bytes: u64 },
}

/// Sequential PDF downloader authenticated by the `documentId` cookie
pub struct Downloader {
    client: reqwest::Client,
    chunk_size: usize,
}

impl Downloader {
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| HarvestError::download(&config.pdf_base_url, e))?;

        Ok(Self {
            client,
            chunk_size: config.chunk_size.max(1),
        })
    }

    /// Downloads `resource` unless its file already exists.
    ///
    /// `label` is the running `current/total` counter. A failed transfer
    /// leaves whatever was written so far in place.
    pub async fn download(&self, resource: &ResourceRecord, label: &str) -> Result<DownloadOutcome> {
        let path = &resource.file_path;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| HarvestError::io(path, e))?;
        if exists {
            print!("\r{label} File already exists: {file_name}");
            if let Err(e) = std::io::stdout().flush() {
                ::log::debug!("Could not flush skip notice: {}", e);
            }
            ::log::debug!("Skipping existing file {}", path.display());
            return Ok(DownloadOutcome::Skipped);
        }

        let url = resource.pdf_url.as_str();
        let cookie = HeaderValue::from_str(&format!("documentId={}", resource.document_id))
            .map_err(|e| HarvestError::download(url, e))?;

        ::log::debug!("GET {} -> {}", url, path.display());
        let mut response = self
            .client
            .get(url)
            .header(COOKIE, cookie)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| HarvestError::download(url, e))?;

        let total = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);

        let mut file = File::create(path)
            .await
            .map_err(|e| HarvestError::io(path, e))?;
        let progress = DownloadProgress::new(label, &file_name, total);

        let mut written: u64 = 0;
        let result: Result<()> = async {
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| HarvestError::download(url, e))?
            {
                for piece in chunk.chunks(self.chunk_size) {
                    file.write_all(piece)
                        .await
                        .map_err(|e| HarvestError::io(path, e))?;
                    written += piece.len() as u64;
                    progress.advance(piece.len());
                }
            }
            file.flush().await.map_err(|e| HarvestError::io(path, e))
        }
        .await;

        match result {
            Ok(()) => {
                progress.finish();
                ::log::info!("Downloaded {} ({} bytes)", path.display(), written);
                Ok(DownloadOutcome::Downloaded { bytes: written })
            }
            Err(e) => {
                progress.abandon();
                Err(e)
            }
        }
    }
}
