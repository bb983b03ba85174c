//! Utility functions shared by the command line front end
//!
//! - [`app_data`] - Application data directory and `config.json`
//! - [`progress`] - Progress bars (no-op without the `progress` feature)

pub mod app_data;
pub mod progress;

pub use app_data::*;
