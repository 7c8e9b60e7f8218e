use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::cache::shared_cache;
use crate::data::model::journal_label;
use crate::state::{AppState, Dimension};
use crate::ui::{fmt_count, source_label};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.table.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the loops.
    let options = state.options.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Years ----
            let header = format!("Years  ({}/{})", state.filters.years.len(), options.years.len());
            filter_section(ui, state, &header, Dimension::Year, |ui, state| {
                for &year in &options.years {
                    let mut checked = state.filters.years.contains(&year);
                    if ui.checkbox(&mut checked, year.to_string()).changed() {
                        state.toggle_year(year);
                    }
                }
            });

            // ---- Journals (top N by count) ----
            let header = format!(
                "Journals  ({}/{})",
                state.filters.journals.len(),
                options.journals.len()
            );
            filter_section(ui, state, &header, Dimension::Journal, |ui, state| {
                if state.filters.journals.is_empty() {
                    ui.weak("None selected: all journals included");
                }
                for journal in &options.journals {
                    let mut checked = state.filters.journals.contains(journal);
                    let label = journal_label(journal.as_deref());
                    if ui.checkbox(&mut checked, label).changed() {
                        state.toggle_journal(journal.clone());
                    }
                }
            });

            // ---- Sources ----
            let header = format!(
                "Sources  ({}/{})",
                state.filters.sources.len(),
                options.sources.len()
            );
            filter_section(ui, state, &header, Dimension::Source, |ui, state| {
                for source in &options.sources {
                    let mut checked = state.filters.sources.contains(source);
                    let text = RichText::new(source_label(source))
                        .color(state.source_colors.color_for(source));
                    if ui.checkbox(&mut checked, text).changed() {
                        state.toggle_source(source.clone());
                    }
                }
            });
        });
}

/// Collapsible section with All / None buttons above its checkboxes.
fn filter_section(
    ui: &mut Ui,
    state: &mut AppState,
    header: &str,
    dim: Dimension,
    body: impl FnOnce(&mut Ui, &mut AppState),
) {
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(format!("{dim:?}"))
        .default_open(dim == Dimension::Year)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(dim);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(dim);
                }
            });
            body(ui, state);
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
                reload(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} papers loaded, {} visible",
                fmt_count(table.len()),
                fmt_count(state.snapshot.visible_indices.len())
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

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open paper metadata")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path, shared_cache());
    }
}

/// Drop the cached table for the current file and read it again.
fn reload(state: &mut AppState) {
    let Some(path) = state
        .table
        .as_ref()
        .and_then(|t| t.source_path())
        .map(|p| p.to_path_buf())
    else {
        return;
    };
    shared_cache().invalidate(&path);
    state.load(&path, shared_cache());
}
