//! NovaMart marketing metrics engine.
//!
//! Typed dataset rows go in, plain serializable summaries come out.
//! Nothing here renders; the runner and any UI sit on top.

pub mod attribution;
pub mod classifier;
pub mod config;
pub mod correlation;
pub mod customer;
pub mod dashboard;
pub mod diagnostics;
pub mod error;
pub mod funnel;
pub mod geo;
pub mod kpi;
pub mod loader;
pub mod product;
pub mod records;
pub mod rng;
pub mod sample;
pub mod time_series;
pub mod types;
