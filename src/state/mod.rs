//! State module for tracking crawl-wide conditions
//!
//! # Components
//!
//! - `BackoffState`: consecutive block signals seen by the run
//! - `BackoffController`: the global pause barrier driven by that counter

mod backoff;

pub use backoff::{BackoffController, BackoffState};
