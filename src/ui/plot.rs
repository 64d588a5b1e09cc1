use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points};

use crate::aggregate::{AggregateResult, MonthlySales, SalesPivot, SubCategoryPerformance};
use crate::color::{blues, contrasting_text, normalize, profit_color};
use crate::present::{format_compact, format_currency};

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Chart section (central panel, behind the "Show Visual Analysis" toggle)
// ---------------------------------------------------------------------------

pub fn charts(ui: &mut Ui, result: &AggregateResult) {
    ui.heading("📅 Monthly Sales Trend");
    monthly_trend(ui, &result.monthly_sales);
    ui.add_space(12.0);

    ui.heading("📦 Sub-Category Performance");
    sub_category_bars(ui, &result.sub_categories);
    ui.add_space(12.0);

    ui.heading("🌍 Heatmap: Region vs Category Sales");
    region_category_heatmap(ui, &result.pivot);
}

fn empty_placeholder(ui: &mut Ui) {
    ui.label(RichText::new("No rows match the current filters.").italics());
}

/// Index-based x axis labelled with the category names.
fn label_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
    move |mark, _range| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Line chart: sales per month
// ---------------------------------------------------------------------------

pub fn monthly_trend(ui: &mut Ui, series: &[MonthlySales]) {
    if series.is_empty() {
        empty_placeholder(ui);
        return;
    }

    let months: Vec<String> = series.iter().map(|m| m.month.clone()).collect();
    let points: Vec<[f64; 2]> = series
        .iter()
        .enumerate()
        .map(|(i, m)| [i as f64, m.sales])
        .collect();

    Plot::new("monthly_sales")
        .height(CHART_HEIGHT)
        .x_axis_label("Order Month")
        .y_axis_label("Sales")
        .x_axis_formatter(label_formatter(months))
        .y_axis_formatter(|mark, _range| format_compact(mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Sales")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .name("Sales")
                    .color(Color32::LIGHT_BLUE)
                    .radius(3.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Bar chart: sales per sub-category, coloured by profit
// ---------------------------------------------------------------------------

pub fn sub_category_bars(ui: &mut Ui, groups: &[SubCategoryPerformance]) {
    if groups.is_empty() {
        empty_placeholder(ui);
        return;
    }

    let max_abs_profit = groups
        .iter()
        .map(|g| g.profit.abs())
        .fold(0.0_f64, f64::max);

    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64, g.sales)
                .name(format!(
                    "{}: sales {}, profit {}",
                    g.sub_category,
                    format_currency(g.sales),
                    format_currency(g.profit)
                ))
                .fill(profit_color(g.profit, max_abs_profit))
                .width(0.7)
        })
        .collect();

    let names: Vec<String> = groups.iter().map(|g| g.sub_category.clone()).collect();

    Plot::new("sub_category_sales")
        .height(CHART_HEIGHT)
        .x_axis_label("Sub-Category")
        .y_axis_label("Sales")
        .x_axis_formatter(label_formatter(names))
        .y_axis_formatter(|mark, _range| format_compact(mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Profit:");
        ui.label(RichText::new("■ loss").color(profit_color(-1.0, 1.0)));
        ui.label(RichText::new("■ break-even").color(profit_color(0.0, 1.0)));
        ui.label(RichText::new("■ gain").color(profit_color(1.0, 1.0)));
    });
}

// ---------------------------------------------------------------------------
// Heatmap: sales per (region, category)
// ---------------------------------------------------------------------------

pub fn region_category_heatmap(ui: &mut Ui, pivot: &SalesPivot) {
    if pivot.is_empty() {
        empty_placeholder(ui);
        return;
    }

    let min = pivot.min_value().unwrap_or(0.0);
    let max = pivot.max_value().unwrap_or(0.0);

    egui::Grid::new("region_category_heatmap")
        .spacing([2.0, 2.0])
        .min_col_width(110.0)
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for category in &pivot.categories {
                ui.strong(category);
            }
            ui.end_row();

            for region in &pivot.regions {
                ui.strong(region);
                for category in &pivot.categories {
                    match pivot.get(region, category) {
                        Some(sales) => {
                            let fill = blues(normalize(sales, min, max));
                            egui::Frame::default()
                                .fill(fill)
                                .inner_margin(6.0)
                                .show(ui, |ui: &mut Ui| {
                                    ui.label(
                                        RichText::new(format_currency(sales))
                                            .color(contrasting_text(fill)),
                                    );
                                });
                        }
                        // No rows for this combination: leave the cell blank.
                        None => {
                            ui.label("");
                        }
                    }
                }
                ui.end_row();
            }
        });
}
