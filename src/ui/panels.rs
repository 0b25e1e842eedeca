use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use campaign_lens::data::schema::{COUNTRY, FILTER_COLUMNS};
use campaign_lens::data::stats::Kpis;

use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

fn filter_title(column: &str) -> String {
    match column {
        "Marital_Status" => "Select Marital Status".to_string(),
        other => format!("Select {other}"),
    }
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filter Data");
    ui.separator();

    let Some(table) = state.table.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for col in FILTER_COLUMNS {
                // Country is only filterable when the dataset carries it.
                if !table.has_column(col) {
                    continue;
                }
                let all_values = table.unique_values(col);
                let n_selected = state.filters.get(col).map_or(0, |s| s.len());
                let header_text = format!("{}  ({n_selected}/{})", filter_title(col), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(col != COUNTRY)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(col);
                            }
                        });

                        for val in &all_values {
                            let mut checked = state
                                .filters
                                .get(col)
                                .is_some_and(|selected| selected.contains(val));
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                state.toggle_filter_value(col, val);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(state.source.display().to_string());

        if let (Some(table), Some(view)) = (&state.table, &state.view) {
            ui.separator();
            ui.label(format!(
                "{} customers loaded, {} visible",
                format_thousands(table.len() as f64),
                format_thousands(view.len() as f64)
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// KPI cards and tab strip
// ---------------------------------------------------------------------------

pub fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    let money = |v: Option<f64>| v.map_or("n/a".to_string(), |v| format!("${}", format_thousands(v)));
    let cards = [
        ("Total Customers", format_thousands(kpis.customers as f64)),
        ("Avg Income", money(kpis.avg_income)),
        ("Avg Total Spend", money(kpis.avg_total_spend)),
        (
            "Avg Campaigns Accepted",
            kpis.avg_accepted_campaigns
                .map_or("n/a".to_string(), |v| format!("{v:.2}")),
        ),
    ];

    ui.columns(cards.len(), |columns| {
        for (col, (label, value)) in columns.iter_mut().zip(cards) {
            egui::Frame::group(col.style()).show(col, |ui: &mut Ui| {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.label(RichText::new(label).strong());
                    ui.label(RichText::new(value).size(26.0));
                });
            });
        }
    });
}

pub fn tab_strip(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.title());
        }
    });
}

/// Whole-number rendering with thousands separators (`1,234,567`).
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open campaign data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("Delimited text", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}
