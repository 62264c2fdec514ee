use clap::Parser;
use cis_benchmarks::{HarvestConfig, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cis-benchmarks")]
#[command(about = "Downloads every CIS benchmark PDF not already on disk")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the `<category>/<title>` tree is created in
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// WebDriver server used to launch the browser
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Seconds to observe the portal for benchmark listings
    #[arg(long)]
    pub window: Option<u64>,

    /// Skip TLS certificate validation
    #[arg(long)]
    pub insecure: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}

impl Args {
    /// Config file (or defaults), then environment, then flags
    pub fn into_config(self) -> Result<HarvestConfig> {
        let mut config = match &self.config {
            Some(path) => HarvestConfig::from_file(path)?,
            None => HarvestConfig::default(),
        };
        config.apply_env();

        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(url) = self.webdriver_url {
            config.webdriver_url = url;
        }
        if let Some(secs) = self.window {
            config.observation_window_secs = secs;
        }
        if self.insecure {
            config.accept_invalid_certs = true;
        }
        if self.headed {
            config.headless = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_keeps_defaults() {
        let args = Args::parse_from(["cis-benchmarks"]);
        assert!(args.config.is_none());
        assert!(!args.insecure);
        assert!(!args.headed);
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "cis-benchmarks",
            "--output-dir",
            "/tmp/cis",
            "--window",
            "9",
            "--insecure",
            "--headed",
            "--webdriver-url",
            "http://localhost:9515",
        ]);

        let config = args.into_config().unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/cis"));
        assert_eq!(config.observation_window_secs, 9);
        assert!(config.accept_invalid_certs);
        assert!(!config.headless);
        assert_eq!(config.webdriver_url, "http://localhost:9515");
    }
}
