use std::sync::Arc;

use eframe::egui;

use crate::config;
use crate::data::model::PnlDataset;
use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VariancePnlApp {
    pub state: AppState,
}

impl VariancePnlApp {
    pub fn new(dataset: Arc<PnlDataset>) -> Self {
        Self {
            state: AppState::new(dataset),
        }
    }
}

impl eframe::App for VariancePnlApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title and row counts ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: range filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(config::FILTER_PANEL_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: one tab per report ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::tab_bar(ui, &mut self.state);
            ui.separator();
            match self.state.tab {
                Tab::CohortVariance => plot::cohort_variance_chart(ui, &self.state),
                Tab::StoreCount => table::store_count_view(ui, &mut self.state),
            }
        });
    }
}
