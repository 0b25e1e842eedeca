use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
    Polygon,
};

use campaign_lens::data::filter::TableView;
use campaign_lens::data::schema::{
    AGE, CAMPAIGN_COLUMNS, COUNTRY, EDUCATION, INCOME, MARITAL_STATUS, RESPONSE, SPEND_COLUMNS,
    TOTAL_SPEND,
};
use campaign_lens::data::stats::{
    acceptance_rates, column_means, grouped_mean, paired_numbers, value_counts,
    values_by_age_group, BoxSummary, Histogram, LinearTrend,
};
use campaign_lens::data::CellValue;

use crate::color::{generate_palette, sequential, ColorMap};
use crate::state::{AppState, Tab};

const CHART_HEIGHT: f32 = 300.0;
const HISTOGRAM_BINS: usize = 20;
/// Rows rendered by the data preview before it asks the user to filter.
const PREVIEW_ROWS: usize = 1_000;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the active tab for the current filtered view.
pub fn active_tab(ui: &mut Ui, state: &AppState, view: &TableView) {
    let content: fn(&mut Ui, &AppState, &TableView) = match state.tab {
        Tab::Campaigns => |ui, _, view| campaign_tab(ui, view),
        Tab::Spending => |ui, state, view| spending_tab(ui, view, state.education_colors.as_ref()),
        Tab::Segmentation => |ui, _, view| segmentation_tab(ui, view),
        // The data preview scrolls itself.
        Tab::Data => {
            data_tab(ui, view);
            return;
        }
    };
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| content(ui, state, view));
}

/// Label integer grid marks with category names, blank elsewhere.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let v = mark.value;
        if v < 0.0 || (v - v.round()).abs() > 1e-6 {
            return String::new();
        }
        labels.get(v.round() as usize).cloned().unwrap_or_default()
    }
}

fn category_bars(values: &[(String, f64)], color: impl Fn(usize, f64) -> Color32) -> Vec<Bar> {
    values
        .iter()
        .enumerate()
        .map(|(i, (label, v))| {
            Bar::new(i as f64, *v)
                .width(0.7)
                .name(label)
                .fill(color(i, *v))
        })
        .collect()
}

fn category_chart(ui: &mut Ui, id: &str, title: &str, y_label: &str, values: Vec<(String, f64)>) {
    ui.strong(title);
    let palette = generate_palette(values.len());
    let bars = category_bars(&values, |i, _| palette[i]);
    let labels = values.into_iter().map(|(l, _)| l).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .x_axis_formatter(category_axis(labels))
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars).name(y_label)));
}

// ---------------------------------------------------------------------------
// Campaign performance
// ---------------------------------------------------------------------------

fn campaign_tab(ui: &mut Ui, view: &TableView) {
    ui.heading("Which customer segments accept campaigns?");

    let rates = acceptance_rates(view);
    let max_rate = rates.iter().map(|(_, r)| *r).fold(0.0, f64::max);
    let bars = category_bars(&rates, |_, r| {
        sequential(if max_rate > 0.0 { r / max_rate } else { 0.0 })
    });
    let labels = CAMPAIGN_COLUMNS.iter().map(|c| c.to_string()).collect();

    ui.strong("Acceptance Rate by Campaign");
    Plot::new("acceptance_rates")
        .height(CHART_HEIGHT)
        .y_axis_label("Acceptance Rate (%)")
        .x_axis_formatter(category_axis(labels))
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name("Acceptance Rate (%)")
                    .element_formatter(Box::new(|bar: &Bar, _: &BarChart| {
                        format!("{}: {:.2}%", bar.name, bar.value)
                    })),
            )
        });

    ui.add_space(8.0);
    ui.columns(2, |cols| {
        let by_education = response_rates(view, EDUCATION);
        category_chart(
            &mut cols[0],
            "response_by_education",
            "Response Rate by Education Level",
            "Response Rate",
            by_education,
        );
        let by_marital = response_rates(view, MARITAL_STATUS);
        category_chart(
            &mut cols[1],
            "response_by_marital",
            "Response Rate by Marital Status",
            "Response Rate",
            by_marital,
        );
    });
}

fn response_rates(view: &TableView, group_col: &str) -> Vec<(String, f64)> {
    grouped_mean(view, group_col, RESPONSE)
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

// ---------------------------------------------------------------------------
// Spending analysis
// ---------------------------------------------------------------------------

fn spending_tab(ui: &mut Ui, view: &TableView, education_colors: Option<&ColorMap>) {
    ui.heading("Spending Patterns & Product Preferences");

    ui.strong("Average Spending Breakdown by Product Category");
    spend_donut(ui, &column_means(view, &SPEND_COLUMNS));

    ui.add_space(8.0);
    ui.strong("Relationship: Income vs. Total Spend");
    income_scatter(ui, view, education_colors);

    ui.add_space(8.0);
    ui.strong("Distribution of Total Spending by Age Group");
    age_group_boxes(ui, view);
}

/// Donut of average spend per product, drawn as filled polygons.
fn spend_donut(ui: &mut Ui, means: &[(String, f64)]) {
    const HOLE: f64 = 0.4;
    const SEGMENTS_PER_TURN: f64 = 180.0;

    let total: f64 = means.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        ui.label("No spending in the current selection.");
        return;
    }
    let palette = generate_palette(means.len());

    Plot::new("spend_donut")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for ((name, value), color) in means.iter().zip(&palette) {
                let sweep = value / total * TAU;
                let steps = ((sweep / TAU) * SEGMENTS_PER_TURN).ceil().max(1.0) as usize;
                let arc = |radius: f64, i: usize| {
                    let angle = start + sweep * i as f64 / steps as f64;
                    [radius * angle.cos(), radius * angle.sin()]
                };
                let mut points: Vec<[f64; 2]> = (0..=steps).map(|i| arc(1.0, i)).collect();
                points.extend((0..=steps).rev().map(|i| arc(HOLE, i)));

                let share = value / total * 100.0;
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(points))
                        .name(format!("{name} ({share:.1}%)"))
                        .fill_color(*color)
                        .stroke(egui::Stroke::new(1.0, Color32::WHITE)),
                );
                start += sweep;
            }
        });
}

fn income_scatter(ui: &mut Ui, view: &TableView, education_colors: Option<&ColorMap>) {
    let groups: Vec<(CellValue, Vec<[f64; 2]>)> = view
        .base()
        .unique_values(EDUCATION)
        .into_iter()
        .filter(|education| !education.is_null())
        .map(|education| {
            let points = view
                .rows()
                .filter(|row| row.get(EDUCATION) == Some(&education))
                .filter_map(|row| Some([row.get(INCOME)?.as_f64()?, row.get(TOTAL_SPEND)?.as_f64()?]))
                .collect();
            (education, points)
        })
        .collect();

    let pairs = paired_numbers(view, INCOME, TOTAL_SPEND);
    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.iter().map(|p| (p[0], p[1])).unzip();
    if let Some(trend) = LinearTrend::fit(&xs, &ys) {
        ui.label(format!(
            "Overall OLS trend: Total_Spend = {:.4} × Income {:+.1}  (R² = {:.3})",
            trend.slope, trend.intercept, trend.r_squared
        ));
    }

    Plot::new("income_vs_spend")
        .height(CHART_HEIGHT * 1.3)
        .x_axis_label("Income")
        .y_axis_label("Total_Spend")
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for (education, points) in &groups {
                let color = education_colors
                    .map(|cm| cm.color_for(education))
                    .unwrap_or(Color32::LIGHT_BLUE);
                let name = education.to_string();

                let xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
                let ys: Vec<f64> = points.iter().map(|p| p[1]).collect();
                if let Some(trend) = LinearTrend::fit(&xs, &ys) {
                    let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
                    let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    let line = vec![[lo, trend.predict(lo)], [hi, trend.predict(hi)]];
                    plot_ui.line(Line::new(PlotPoints::from(line)).name(&name).color(color).width(2.0));
                }

                plot_ui.points(
                    Points::new(PlotPoints::from(points.clone()))
                        .name(&name)
                        .color(color)
                        .radius(2.5),
                );
            }
        });
}

fn age_group_boxes(ui: &mut Ui, view: &TableView) {
    let groups = values_by_age_group(view, TOTAL_SPEND);
    let palette = generate_palette(groups.len());
    let labels = groups.keys().map(|g| g.to_string()).collect();

    let boxes: Vec<BoxElem> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, (group, values))| {
            let summary = BoxSummary::from_values(values)?;
            Some(
                BoxElem::new(
                    i as f64,
                    BoxSpread::new(
                        summary.lower_whisker,
                        summary.q1,
                        summary.median,
                        summary.q3,
                        summary.upper_whisker,
                    ),
                )
                .name(group.label())
                .box_width(0.6)
                .whisker_width(0.3)
                .fill(palette[i].gamma_multiply(0.4))
                .stroke(egui::Stroke::new(1.5, palette[i])),
            )
        })
        .collect();

    let outliers: Vec<[f64; 2]> = groups
        .values()
        .enumerate()
        .flat_map(|(i, values)| {
            BoxSummary::from_values(values)
                .map(|s| s.outliers)
                .unwrap_or_default()
                .into_iter()
                .map(move |v| [i as f64, v])
        })
        .collect();

    Plot::new("spend_by_age_group")
        .height(CHART_HEIGHT)
        .y_axis_label("Total_Spend")
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes).name("Total_Spend"));
            plot_ui.points(
                Points::new(PlotPoints::from(outliers))
                    .name("outliers")
                    .color(Color32::GRAY)
                    .radius(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Customer segmentation
// ---------------------------------------------------------------------------

fn segmentation_tab(ui: &mut Ui, view: &TableView) {
    ui.heading("Customer Demographics Analysis");

    ui.columns(2, |cols| {
        histogram(
            &mut cols[0],
            "age_histogram",
            "Customer Age Distribution",
            AGE,
            &view.numbers(AGE),
            Color32::from_rgb(0x63, 0x6E, 0xFA),
        );
        histogram(
            &mut cols[1],
            "income_histogram",
            "Customer Income Distribution",
            INCOME,
            &view.numbers(INCOME),
            Color32::from_rgb(0x00, 0xCC, 0x96),
        );
    });

    if view.base().has_column(COUNTRY) {
        ui.add_space(8.0);
        country_distribution(ui, view);
    }
}

fn histogram(ui: &mut Ui, id: &str, title: &str, x_label: &str, values: &[f64], color: Color32) {
    ui.strong(title);
    let Some(hist) = Histogram::compute(values, HISTOGRAM_BINS) else {
        ui.label("No data in the current selection.");
        return;
    };
    let width = hist.bin_width();
    let bars: Vec<Bar> = hist
        .centers()
        .map(|(center, count)| Bar::new(center, count as f64).width(width).fill(color))
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label("count")
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars).color(color).name("count")));
}

/// Customers per country, most frequent at the top.
fn country_distribution(ui: &mut Ui, view: &TableView) {
    ui.strong("Customer Distribution by Country");

    let counts = value_counts(view, COUNTRY);
    let max = counts.first().map_or(1, |(_, c)| *c).max(1) as f64;
    let n = counts.len();
    let labels: Vec<String> = counts.iter().rev().map(|(c, _)| c.to_string()).collect();
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (country, count))| {
            Bar::new((n - 1 - i) as f64, *count as f64)
                .width(0.7)
                .name(country.to_string())
                .fill(sequential(*count as f64 / max))
        })
        .collect();

    Plot::new("country_distribution")
        .height((n as f32 * 28.0).clamp(120.0, CHART_HEIGHT * 1.5))
        .x_axis_label("Count")
        .y_axis_formatter(category_axis(labels))
        .include_x(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Count"))
        });
}

// ---------------------------------------------------------------------------
// Data preview
// ---------------------------------------------------------------------------

fn data_tab(ui: &mut Ui, view: &TableView) {
    let columns = &view.base().columns;
    let shown = view.len().min(PREVIEW_ROWS);
    ui.label(format!("Showing {shown} of {} filtered rows", view.len()));
    if view.len() > PREVIEW_ROWS {
        ui.label(RichText::new("Narrow the filters to see the remaining rows.").weak());
    }

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0), columns.len())
            .header(20.0, |mut header| {
                for col in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, shown, |mut row| {
                    let idx = view.indices()[row.index()];
                    for col in columns {
                        row.col(|ui: &mut Ui| {
                            ui.label(view.base().value(idx, col).to_string());
                        });
                    }
                });
            });
    });
}
