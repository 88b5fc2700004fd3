//! Link collection: turning a page's anchor hrefs into checkable absolute URLs
//!
//! Anchors are consumed as their raw `href` attribute values (`None` when the
//! attribute is missing). Collection never fails: anything that cannot be
//! checked over HTTP is skipped and logged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;
use url::Url;

/// Raw href prefixes that never point at an HTTP-checkable resource.
/// Matched ASCII case-insensitively after leading whitespace.
pub const UNSUPPORTED_PREFIXES: [&str; 4] = ["mailto:", "tel:", "javascript:", "#"];

/// Schemes rejected after resolution, whatever the raw href looked like
const UNSUPPORTED_SCHEMES: [&str; 3] = ["mailto", "tel", "javascript"];

/// Deduplicated absolute URLs found on a page
pub type LinkSet = BTreeSet<String>;

/// Domains excluded from link checks.
///
/// Matching is plain substring containment over the whole resolved URL, so a
/// blocked domain inside a query parameter excludes the link too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockList {
    domains: Vec<String>,
}

impl BlockList {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains.into_iter().map(Into::into).collect(),
        }
    }

    /// An empty list that blocks nothing
    pub fn none() -> Self {
        Self {
            domains: Vec::new(),
        }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// First blocked entry found in `url`, if any
    pub fn matching(&self, url: &str) -> Option<&str> {
        self.domains
            .iter()
            .map(String::as_str)
            .find(|domain| url.contains(domain))
    }

    pub fn blocks(&self, url: &str) -> bool {
        self.matching(url).is_some()
    }
}

impl Default for BlockList {
    fn default() -> Self {
        Self::new(default_blocked_domains())
    }
}

/// Social networks that reject or throttle automated requests
pub fn default_blocked_domains() -> Vec<String> {
    vec![
        "facebook.com".to_string(),
        "youtube.com".to_string(),
        "instagram.com".to_string(),
        "linkedin.com".to_string(),
        "discord.gg".to_string(),
    ]
}

/// Why an href was left out of the link set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Missing or empty `href`
    Empty,
    /// `mailto:`, `tel:`, `javascript:` or fragment-only
    Unsupported,
    /// Could not be resolved against the base URL
    Malformed(String),
    /// Resolved `url` contains the blocked `domain`
    Blocked { url: String, domain: String },
}

/// Result of examining a single href
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HrefOutcome {
    Link(String),
    Skipped(SkipReason),
}

/// Decide what a single raw href contributes to the link set
pub fn resolve_href(href: Option<&str>, base_url: &Url, blocklist: &BlockList) -> HrefOutcome {
    let href = match href {
        Some(h) if !h.is_empty() => h,
        _ => return HrefOutcome::Skipped(SkipReason::Empty),
    };

    if has_unsupported_prefix(href) {
        return HrefOutcome::Skipped(SkipReason::Unsupported);
    }

    let absolute = match base_url.join(href) {
        Ok(url) if UNSUPPORTED_SCHEMES.contains(&url.scheme()) => {
            return HrefOutcome::Skipped(SkipReason::Unsupported);
        }
        Ok(url) => url.to_string(),
        Err(e) => return HrefOutcome::Skipped(SkipReason::Malformed(e.to_string())),
    };

    if let Some(domain) = blocklist.matching(&absolute) {
        return HrefOutcome::Skipped(SkipReason::Blocked {
            domain: domain.to_string(),
            url: absolute,
        });
    }

    HrefOutcome::Link(absolute)
}

fn has_unsupported_prefix(href: &str) -> bool {
    let href = href.trim_start();
    UNSUPPORTED_PREFIXES.iter().any(|prefix| {
        href.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Build the set of checkable absolute URLs from a page's anchor hrefs
pub fn collect_links<I, H>(hrefs: I, base_url: &Url, blocklist: &BlockList) -> LinkSet
where
    I: IntoIterator<Item = Option<H>>,
    H: AsRef<str>,
{
    let mut links = LinkSet::new();
    let mut count = 0usize;

    for (index, href) in hrefs.into_iter().enumerate() {
        count += 1;
        let raw: Option<&str> = href.as_ref().map(|h| h.as_ref());

        match resolve_href(raw, base_url, blocklist) {
            HrefOutcome::Link(url) => {
                links.insert(url);
            }
            HrefOutcome::Skipped(SkipReason::Empty) => {
                info!("Skipped: Empty -> index {}", index);
            }
            HrefOutcome::Skipped(SkipReason::Unsupported) => {
                info!("Skipped: Unsupported -> {}", raw.unwrap_or_default());
            }
            HrefOutcome::Skipped(SkipReason::Malformed(reason)) => {
                info!("Skipped: Malformed -> {} ({})", raw.unwrap_or_default(), reason);
            }
            HrefOutcome::Skipped(SkipReason::Blocked { url, domain }) => {
                info!("Skipped: Blocked -> {} ({})", url, domain);
            }
        }
    }

    info!("Total valid links: {} from {}", links.len(), count);
    links
}
