//! Compile-time settings. Nothing here is read from the environment.

/// The P&L extract, relative to the working directory.
pub const DATA_FILE: &str = "Kitchen_PNL_Data1.xlsx";

pub const WINDOW_TITLE: &str = "Variance Level P&L";

pub const WINDOW_SIZE: [f32; 2] = [1400.0, 850.0];
pub const MIN_WINDOW_SIZE: [f32; 2] = [800.0, 500.0];

pub const FILTER_PANEL_WIDTH: f32 = 260.0;
