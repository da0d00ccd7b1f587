//! Aggregation and merge core for the Pixana sales dashboard, with the
//! boundaries that feed it.

pub mod cache;
pub mod chat;
pub mod collector;
pub mod config;
pub mod dates;
pub mod error;
pub mod merge;
pub mod metrics;
pub mod models;
pub mod report;
pub mod scoring;
pub mod state;
pub mod trend;
