use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::aggregate::{AggregateResult, ProductSales};
use crate::present::{format_currency, format_percent};
use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel: KPIs, charts, top products
// ---------------------------------------------------------------------------

/// Render the dashboard body in the central panel.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let mut show_charts = state.show_charts;
    let top_n = state.config.top_n;
    let Some(result) = state.result.as_ref() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a sales file to begin  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("📊 Retail Sales Dashboard");
            ui.label("Use the sidebar to filter by Region, Category, and Segment.");
            ui.add_space(8.0);

            kpi_row(ui, result);
            ui.separator();

            ui.checkbox(&mut show_charts, "Show Visual Analysis");
            if show_charts {
                plot::charts(ui, result);
                ui.separator();
            }

            ui.heading(format!("🏆 Top {top_n} Products by Sales"));
            top_products_table(ui, &result.top_products);
        });
    state.show_charts = show_charts;
}

fn kpi(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.label(RichText::new(value).size(24.0).strong());
    });
}

fn kpi_row(ui: &mut Ui, result: &AggregateResult) {
    ui.columns(3, |cols| {
        kpi(&mut cols[0], "💰 Total Sales", format_currency(result.total_sales));
        kpi(&mut cols[1], "📈 Total Profit", format_currency(result.total_profit));
        kpi(
            &mut cols[2],
            "📊 Avg Profit Margin",
            format_percent(result.avg_profit_margin),
        );
    });
}

fn top_products_table(ui: &mut Ui, products: &[ProductSales]) {
    if products.is_empty() {
        ui.label(RichText::new("No products in view.").italics());
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::exact(32.0))
        .column(Column::auto().at_least(240.0))
        .column(Column::remainder().at_least(120.0))
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong("Product Name");
            });
            header.col(|ui| {
                ui.strong("Sales");
            });
        })
        .body(|mut body| {
            for (rank, product) in products.iter().enumerate() {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label((rank + 1).to_string());
                    });
                    row.col(|ui| {
                        ui.label(&product.product_name);
                    });
                    row.col(|ui| {
                        ui.label(format_currency(product.sales));
                    });
                });
            }
        });
}
