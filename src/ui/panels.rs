use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::config::SmoothingWindow;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Company multi-select ----
            let n_selected = state.filters.companies.len();
            let n_total = dataset.companies().len();
            egui::CollapsingHeader::new(
                RichText::new(format!("Company(s)  ({n_selected}/{n_total})")).strong(),
            )
            .id_salt("companies")
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        state.select_all();
                    }
                    if ui.small_button("None").clicked() {
                        state.select_none();
                    }
                });

                for company in dataset.companies() {
                    let mut checked = state.filters.companies.contains(company);
                    let color = state.company_colors.color_for(company);
                    let text = RichText::new(company).color(color);
                    if ui.checkbox(&mut checked, text).changed() {
                        state.toggle_company(company);
                    }
                }
            });
            ui.separator();

            // ---- Date range ----
            ui.strong("Date range");
            if dataset.date_span().is_some() {
                let mut start = state.filters.start;
                let mut end = state.filters.end;
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("From");
                    ui.add(DatePickerButton::new(&mut start).id_salt("start_date"));
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("To");
                    ui.add(DatePickerButton::new(&mut end).id_salt("end_date"));
                });
                if start != state.filters.start || end != state.filters.end {
                    state.filters.start = start;
                    state.filters.end = end;
                    state.refresh();
                }
                if ui.small_button("Full range").clicked() {
                    state.reset_dates();
                }
            } else {
                ui.label("The source file has no rows.");
            }
            if state.filters.has_inverted_range() {
                ui.label(RichText::new("Start date is after end date.").color(Color32::YELLOW));
            }
            ui.separator();

            // ---- Forecast toggle ----
            let mut show_forecast = state.options.show_forecast;
            let label = format!("Show {}-month forecast", state.config.forecast_horizon);
            if ui.checkbox(&mut show_forecast, label).changed() {
                state.set_show_forecast(show_forecast);
            }
            ui.separator();

            // ---- Smoothing window ----
            ui.strong("Growth smoothing (days)");
            let mut window = state.options.window.get();
            let slider = egui::Slider::new(&mut window, SmoothingWindow::RANGE);
            if ui.add(slider).changed() {
                state.set_window(window);
            }
            ui.separator();

            // ---- Export ----
            ui.strong("Export");
            if ui.button("Download cleaned data").clicked() {
                save_file_dialog(state);
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
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui.button("Export…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(snap)) = (&state.dataset, &state.snapshot) {
            ui.label(format!(
                "{} rows loaded, {} visible",
                ds.len(),
                snap.view.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name(state.config.export_file_name.as_str())
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_view(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
