//! Per-file download progress bar

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display for a single download
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    /// Create a bar sized to `total_bytes` (0 when the server did not say)
    pub fn new(label: &str, file_name: &str, total_bytes: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(total_bytes);
        bar.set_style(style);
        bar.set_message(format!("{label} {file_name} Downloading..."));
        Self { bar }
    }

    /// Advance by the number of bytes just written
    pub fn advance(&self, bytes: usize) {
        self.bar.inc(bytes as u64);
    }

    #[cfg(test)]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}
