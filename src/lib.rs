// src/lib.rs

pub mod badge;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod metrics;
pub mod resolve;
pub mod server;

pub use error::{MetricError, Result};
pub use metrics::Metric;
pub use resolve::MetricValue;
