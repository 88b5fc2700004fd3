//! # sitecheck-probe
//!
//! HTTP probing of collected links. Every link gets one independent GET with
//! the configured User-Agent and timeout; the status code and the time until
//! response headers arrived are then judged by the broken-link and
//! response-time checks.

pub mod checks;
pub mod client;

pub use checks::{broken_link_result, response_time_result};
pub use client::{LinkProbe, LinkProber, ProbeOutcome};
