//! # sitecheck-core
//!
//! Core types for sitecheck, an end-to-end checker for a single website.
//!
//! ## Contents
//!
//! - [`links`]: turn anchor hrefs into a deduplicated set of checkable URLs
//! - [`geometry`]: bounding boxes and the overlap predicate used by layout checks
//! - [`config`]: site, probe, device and layout configuration
//! - check results and reports shared by the browser, probe and CLI crates

pub mod config;
mod error;
pub mod geometry;
pub mod links;
mod types;

pub use config::{
    BrowserMatrixConfig, LayoutConfig, LinksConfig, OverlapScenario, ProbeConfig, SiteConfig,
};
pub use error::{Result, SiteCheckError};
pub use geometry::{boxes_intersect, BoundingBox};
pub use links::{collect_links, resolve_href, BlockList, HrefOutcome, LinkSet, SkipReason};
pub use types::*;
