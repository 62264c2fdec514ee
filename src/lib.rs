//! Harvests the CIS benchmark PDFs.
//!
//! The catalog endpoint lists technologies, a browser session on the portal
//! reveals which documents each technology has, and every document not yet
//! on disk is downloaded into `<category>/<title>/<filename>`.

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod documents;
pub mod download;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod progress;
pub mod records;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types for convenience
pub use config::HarvestConfig;
pub use error::{HarvestError, Result};
pub use pipeline::{Harvest, HarvestReport};
pub use records::{ResourceRecord, TechnologyRecord, TechnologyStore};
