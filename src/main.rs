use cis_benchmarks::Harvest;
use clap::Parser;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("{}", e);
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    ::log::info!(
        "Discovery uses the ChromeDriver server at {} (override with WEBDRIVER_URL)",
        config.webdriver_url
    );

    let start_time = std::time::Instant::now();
    match Harvest::new(config).run().await {
        Ok(report) => {
            ::log::info!(
                "Finished in {:.2} seconds: {:?}",
                start_time.elapsed().as_secs_f64(),
                report
            );
        }
        Err(e) => {
            ::log::error!("Harvest failed: {}", e);
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
