//! UI layer for the admin panel: app shell, form, and short URL table.

pub mod app;

pub use app::{AdminPanelApp, StartupConfig};
