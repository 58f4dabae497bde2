mod cli;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use clap::Parser;
use log::{error, info};
use price_chart_lib::{finish, render, ChartOptions, ExtendedSeries, BERLIN};
use std::sync::Arc;
use tibber_loader::{
    config::{Config, TIBBER_API_URL},
    Session,
};
use tokio::net::TcpListener;

use crate::cli::Args;

struct AppState {
    session: Session,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::init();
    let args = Args::parse();

    println!(
        "Starting Price Chart Server (emchartd) v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Check if Tibber API key env variable is set
    // In case of failure, fail before accepting any request
    let config = match Config::new(TIBBER_API_URL) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load tibber config: {e}");
            std::process::exit(1);
        }
    };
    let session = Session::new(config).context("Failed to create Tibber API session")?;

    let listener = TcpListener::bind(&args.bind_address)
        .await
        .context("Failed to bind to the address")?;
    info!("Serving on {}", args.bind_address);

    axum::serve(listener, app(session))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(session: Session) -> Router {
    Router::new()
        .route("/image.png", get(get_image))
        .with_state(Arc::new(AppState { session }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutting down");
}

async fn get_image(State(state): State<Arc<AppState>>) -> Response {
    match get_image_internal(&state.session).await {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e) => {
            error!("Failed to produce the price chart: {e:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Runs the whole pipeline for one request, nothing is kept between requests
async fn get_image_internal(session: &Session) -> Result<Bytes> {
    let (forecast, current) = session
        .get_current_prices()
        .await
        .context("Failed to get prices from Tibber API")?;
    info!("Current price: {:?} Euro", current.total);

    let series = ExtendedSeries::from_forecast(&forecast, BERLIN)?;
    let now = Utc::now().with_timezone(&BERLIN);
    let chart = render(&series, now, &ChartOptions::display(current.total))
        .context("Failed to render price chart")?;
    let png = finish(&chart).context("Failed to convert chart for the display")?;

    info!("Rendered {} points into {} bytes", series.len(), png.len());
    Ok(png)
}
