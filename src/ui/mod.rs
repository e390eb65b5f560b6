/// Rendering only; every state change goes through `AppState` methods.
pub mod panels;
pub mod plot;
pub mod table;
