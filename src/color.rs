use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Fixed bar colour per revenue cohort.
///
/// Built once from every cohort in the loaded dataset, so a cohort keeps its
/// colour while filters add and remove bars. Hues are spread evenly around
/// the wheel in label order.
#[derive(Debug, Clone, Default)]
pub struct CohortColors {
    mapping: BTreeMap<String, Color32>,
}

impl CohortColors {
    pub fn new<'a>(cohorts: impl IntoIterator<Item = &'a str>) -> Self {
        let labels: Vec<String> = cohorts
            .into_iter()
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let step = 360.0 / labels.len().max(1) as f32;
        let mapping = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| (label, hue_color(i as f32 * step)))
            .collect();
        CohortColors { mapping }
    }

    /// Unknown cohorts are drawn grey.
    pub fn color_for(&self, cohort: &str) -> Color32 {
        self.mapping.get(cohort).copied().unwrap_or(Color32::GRAY)
    }
}

fn hue_color(hue: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, 0.75, 0.55).into_color();
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}
