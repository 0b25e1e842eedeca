use eframe::egui::{self, RichText, Ui};

use campaign_lens::config::DashboardConfig;
use campaign_lens::data::stats::Kpis;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CampaignLensApp {
    pub state: AppState,
}

impl CampaignLensApp {
    /// Build the app and load the configured dataset once.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        let source = state.source.clone();
        state.load(&source);
        Self { state }
    }
}

impl eframe::App for CampaignLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &mut self.state);
        });
    }
}

fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ui.heading(RichText::new("🚀 Marketing Campaign Analytics Dashboard").size(24.0));
    ui.label("Analysing customer behavior, spending patterns, and campaign effectiveness.");
    ui.separator();

    // Nothing renders from a failed or missing load.
    let Some(view) = state.view.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            let msg = state
                .status_message
                .as_deref()
                .unwrap_or("Awaiting data load. Please ensure the CSV file is present.");
            ui.heading(format!("{msg}\n\nOpen a file to continue  (File → Open…)"));
        });
        return;
    };

    panels::kpi_row(ui, &Kpis::compute(&view));
    ui.separator();

    panels::tab_strip(ui, state);
    ui.separator();

    plot::active_tab(ui, state, &view);
}
