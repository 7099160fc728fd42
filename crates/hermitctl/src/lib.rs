//! Hermitctl library - exposes host modules for testing

pub mod capture;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod headless;
pub mod host;
pub mod interaction;
pub mod logging;
pub mod tui;
