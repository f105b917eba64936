//! Privacy Check-In: a desktop dashboard for FHE-encrypted location check-ins

use eframe::egui;
use eyre::WrapErr;

use privacy_checkin_adapters::{build_service, CheckInConfig};

mod app;
mod ui;
mod views;

fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!(
        git = env!("GIT_HASH"),
        built = env!("BUILD_TIME"),
        "Starting Privacy Check-In"
    );

    let config = CheckInConfig::from_env();
    let service = build_service(&config);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("checkin-worker")
        .build()
        .wrap_err("failed to start background runtime")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Privacy Check-In")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([760.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Privacy Check-In",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::App::new(cc, config, service, runtime)))),
    )
    .map_err(|e| eyre::eyre!("eframe exited with error: {e}"))
}
