mod cli;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{error, info};
use price_chart_lib::{render, ChartOptions, ExtendedSeries, BERLIN};
use tibber_loader::{
    config::{Config, TIBBER_API_URL},
    Session,
};

use crate::cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::init();
    let args = Args::parse();

    println!("{}", banner());

    let config = match Config::new(TIBBER_API_URL) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load tibber config: {e}");
            std::process::exit(1);
        }
    };

    let session = Session::new(config).context("Failed to create Tibber API session")?;
    let forecast = session
        .get_prices()
        .await
        .context("Failed to get prices from Tibber API")?;
    info!(
        "Received {} prices for today and {} for tomorrow",
        forecast.today.len(),
        forecast.tomorrow.len()
    );

    let series = ExtendedSeries::from_forecast(&forecast, BERLIN)?;
    let now = Utc::now().with_timezone(&BERLIN);
    let chart = render(&series, now, &ChartOptions::snapshot())
        .context("Failed to render price chart")?;
    chart
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Chart saved as {}", args.output.display());
    Ok(())
}

fn banner() -> String {
    format!(
        "Starting Price Chart Snapshot (emchart) v{}",
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_banner_names_version() {
        assert_eq!(
            banner(),
            format!("Starting Price Chart Snapshot (emchart) v{}", env!("CARGO_PKG_VERSION"))
        );
        assert!(banner().ends_with("v0.1.0"));
    }
}
