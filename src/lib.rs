//! Parsing, validation and auto-integration success analysis for
//! spectrometer measurement files.
//!
//! Shared by the `flame-viewer` desktop app, the `flame-report` CLI and the
//! integration tests.

pub mod config;
pub mod data;
