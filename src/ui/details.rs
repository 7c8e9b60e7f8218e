use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::config::DashboardConfig;
use crate::data::model::Paper;
use crate::data::stats::CategoryCount;
use crate::state::AppState;
use crate::ui::{fmt_count, source_label, truncate_chars};

// ---------------------------------------------------------------------------
// Search tab
// ---------------------------------------------------------------------------

pub fn search_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Search and Explore");

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search in titles and abstracts:");
        let edit = egui::TextEdit::singleline(&mut state.search_input)
            .hint_text("Enter keywords...")
            .desired_width(320.0);
        if ui.add(edit).changed() {
            state.apply_search_input();
        }
    });
    ui.add_space(6.0);

    let found = match (state.snapshot.search_hits, state.filters.search_term.as_deref()) {
        (Some(hits), Some(term)) => Some(format!(
            "Found {} papers matching '{term}'",
            fmt_count(hits)
        )),
        _ => None,
    };
    match found {
        Some(text) => {
            ui.label(text);
        }
        None => {
            ui.horizontal(|ui: &mut Ui| {
                ui.strong("Sample Papers");
                if ui.small_button("Shuffle").clicked() {
                    state.reshuffle();
                }
            });
        }
    }

    let config = state.config.clone();
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (n, paper) in state.listed_papers().into_iter().enumerate() {
                paper_panel(ui, n, paper, &config);
            }
        });
}

/// Expandable detail block for one paper.
pub fn paper_panel(ui: &mut Ui, n: usize, paper: &Paper, config: &DashboardConfig) {
    let title = if paper.title.is_empty() {
        "(untitled)".to_string()
    } else {
        truncate_chars(&paper.title, config.title_preview_chars)
    };

    egui::CollapsingHeader::new(RichText::new(title).strong())
        .id_salt(("paper", n))
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new(("paper_grid", n))
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui: &mut Ui| {
                    field(ui, "Authors", paper.authors.as_deref().unwrap_or("Unknown"));
                    field(ui, "Journal", paper.journal_label());
                    let published = paper
                        .publish_time
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "Unknown".to_string());
                    field(ui, "Published", &published);
                    field(ui, "Source", source_label(&paper.source));
                    field(
                        ui,
                        "Full Text Available",
                        if paper.has_full_text { "Yes" } else { "No" },
                    );
                    if let Some(doi) = &paper.doi {
                        field(ui, "DOI", doi);
                    }
                });
            ui.add_space(4.0);
            ui.strong("Abstract");
            ui.label(truncate_chars(paper.abstract_label(), config.abstract_preview_chars));
        });
}

fn field(ui: &mut Ui, name: &str, value: &str) {
    ui.label(RichText::new(name).strong());
    ui.label(value);
    ui.end_row();
}

// ---------------------------------------------------------------------------
// Top journals table
// ---------------------------------------------------------------------------

pub fn journal_table(ui: &mut Ui, journals: &[CategoryCount]) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(24.0))
        .column(Column::remainder())
        .column(Column::auto().at_least(80.0))
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong("Journal");
            });
            header.col(|ui| {
                ui.strong("Papers");
            });
        })
        .body(|mut body| {
            for (rank, c) in journals.iter().enumerate() {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label((rank + 1).to_string());
                    });
                    row.col(|ui| {
                        ui.label(c.label());
                    });
                    row.col(|ui| {
                        ui.label(fmt_count(c.count));
                    });
                });
            }
        });
}
