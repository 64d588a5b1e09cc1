use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::Dimension;
use crate::present::ExportArtifact;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filter Data");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let Some(all_values) = dataset.values(dim) else {
                    continue;
                };

                // Show count of selected / total in the header
                let n_selected = state.filters.selected_count(dim);
                let n_total = all_values.len();
                let header_text = format!("{dim}  ({n_selected}/{n_total})");

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.label())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dim);
                            }
                        });

                        for value in all_values {
                            let mut checked = state.filters.is_selected(dim, value);
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                state.set_filter_value(dim, value, checked);
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
            let loaded = state.dataset.is_some();
            if ui.add_enabled(loaded, egui::Button::new("Reload")).clicked() {
                if let Err(e) = state.reload() {
                    state.report_error(&e);
                }
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(loaded, egui::Button::new("📥 Download Filtered Data as CSV…"))
                .clicked()
            {
                save_artifact(state, AppState::csv_export, "CSV", "csv");
                ui.close_menu();
            }
            if ui
                .add_enabled(loaded, egui::Button::new("Export Summary as JSON…"))
                .clicked()
            {
                save_artifact(state, AppState::summary_export, "JSON", "json");
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(result)) = (&state.dataset, &state.result) {
            ui.label(format!("{} rows loaded, {} in view", ds.len(), result.row_count));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open(&path) {
            state.report_error(&e);
        }
    }
}

/// Build an export artifact and let the user pick where to save it.
fn save_artifact(
    state: &mut AppState,
    build: fn(&AppState) -> anyhow::Result<ExportArtifact>,
    filter_name: &str,
    extension: &str,
) {
    let artifact = match build(state) {
        Ok(artifact) => artifact,
        Err(e) => {
            state.report_error(&e);
            return;
        }
    };

    let target = rfd::FileDialog::new()
        .set_title("Save export")
        .set_file_name(&artifact.file_name)
        .add_filter(filter_name, &[extension])
        .save_file();

    if let Some(path) = target {
        match artifact.write_to(&path) {
            Ok(()) => state.status_message = Some(format!("Saved {}", path.display())),
            Err(e) => state.report_error(&anyhow::Error::new(e)),
        }
    }
}
