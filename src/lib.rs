//! Test Insights library.
//!
//! Computes reliability metrics (pass, fail and flaky rates, duration
//! percentiles) over a history of CTRF test reports and writes them back onto
//! the current report and its tests.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
