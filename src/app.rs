use eframe::egui::{self, ScrollArea, Ui};

use crate::state::{AppState, Tab};
use crate::ui::{details, overview, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyCordApp {
    pub state: AppState,
}

impl RustyCordApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl Default for RustyCordApp {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl eframe::App for RustyCordApp {
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

        // ---- Central panel: tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.table.is_none() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open a metadata file to begin  (File → Open…)");
                });
                return;
            }

            ui.horizontal(|ui: &mut Ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.state.tab, tab, tab.title());
                }
            });
            ui.separator();

            match self.state.tab {
                Tab::Search => details::search_tab(ui, &mut self.state),
                tab => {
                    ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui: &mut Ui| match tab {
                            Tab::Overview => overview::overview_tab(ui, &self.state),
                            Tab::Trends => plot::trends_tab(ui, &self.state),
                            _ => plot::publications_tab(ui, &self.state),
                        });
                }
            }
        });
    }
}
