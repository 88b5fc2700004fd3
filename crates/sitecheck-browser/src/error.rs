//! Browser error types - re-exports the unified SiteCheckError from sitecheck-core
//!
//! Browser failures use these variants:
//! - Browser(String) - launch, navigation, script evaluation
//! - ElementNotFound - an element vanished before it could be clicked
//! - UnsupportedEngine - engines without a CDP driver

pub use sitecheck_core::{Result, SiteCheckError};
