mod app;
mod color;
mod state;
mod ui;

use anyhow::anyhow;
use app::CampaignLensApp;
use campaign_lens::config::DashboardConfig;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load()?;
    log::info!("Starting with data source {}", config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Marketing Campaign Analytics",
        options,
        Box::new(|_cc| Ok(Box::new(CampaignLensApp::new(config)))),
    )
    .map_err(|e| anyhow!("failed to start the dashboard: {e}"))
}
