//! Data-transform core for the dashboard views: CSV ingestion with
//! column-role inference, row cleaning, smoothing, boxplot statistics,
//! case-count aggregation, and trend summaries.
//!
//! Every function here is synchronous and pure: it runs to completion on
//! the calling thread, takes its inputs explicitly, and produces a fresh
//! output. Row-level problems are skipped and counted; only statistical
//! precondition violations (empty samples, zero windows) are hard errors.

pub mod clean;
pub mod epi;
pub mod error;
pub mod ingest;
pub mod output;
pub mod samples;
pub mod sensors;
pub mod smooth;
pub mod stats;
pub mod trend;

pub use error::{Result, TransformError};
