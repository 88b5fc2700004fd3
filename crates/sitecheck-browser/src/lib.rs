//! Browser automation and layout verification for sitecheck
//!
//! This crate drives a page through the [`PageDriver`] capability trait. The
//! real implementation is [`BrowserSession`], which controls Chromium over the
//! Chrome DevTools Protocol; [`MockPage`] serves canned DOM state for tests.
//!
//! # Example
//!
//! ```no_run
//! use sitecheck_browser::{harvest_links, BrowserSession};
//! use sitecheck_core::BlockList;
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = BrowserSession::launch().await?;
//!     let base = Url::parse("https://example.com/")?;
//!
//!     let links = harvest_links(&session, &base, &BlockList::default()).await?;
//!     for link in &links {
//!         println!("{}", link);
//!     }
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`page`]: capability trait, element handles and the mock page
//! - [`browser`]: Chromium lifecycle and the CDP-backed driver
//! - [`harvest`]: collecting checkable links from a loaded page
//! - [`verification`]: cookie refusal, indentation and overlap checks
//! - [`error`]: error types for browser operations

pub mod browser;
pub mod error;
pub mod harvest;
pub mod page;
pub mod verification;

// Re-export commonly used types
pub use browser::{BrowserConfig, BrowserSession};
pub use error::{Result, SiteCheckError};
pub use harvest::{harvest_links, ANCHOR_SELECTOR};
pub use page::{ElementRef, MockElement, MockPage, PageDriver};
pub use verification::{refuse_cookies, verify_indentation, verify_not_overlapped};
