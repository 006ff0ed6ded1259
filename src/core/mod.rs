//! Core engine: providers, models, aggregation, mapping, ranking, and
//! selection orchestration.

pub mod aggregate;
pub mod cli_runner;
pub mod logging;
pub mod mapping;
pub mod models;
pub mod provider;
pub mod rank;
pub mod switcher;
