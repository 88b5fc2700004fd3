//! Link harvesting from a live page

use crate::page::PageDriver;
use sitecheck_core::{collect_links, BlockList, LinkSet, Locator, Result};
use tracing::{info, warn};
use url::Url;

/// Anchors considered for link checks
pub const ANCHOR_SELECTOR: &str = "a[href]";

/// Load `base_url` and collect the checkable links found on it.
///
/// Only navigation failures are errors; an unreadable set of hrefs degrades to
/// an empty link set.
pub async fn harvest_links<P>(page: &P, base_url: &Url, blocklist: &BlockList) -> Result<LinkSet>
where
    P: PageDriver + ?Sized,
{
    info!("Harvesting links from {}", base_url);
    page.navigate(base_url.as_str()).await?;

    let hrefs = match page.attributes(&Locator::css(ANCHOR_SELECTOR), "href").await {
        Ok(hrefs) => hrefs,
        Err(e) => {
            warn!("Failed to read anchors on {}: {}", base_url, e);
            Vec::new()
        }
    };

    Ok(collect_links(hrefs, base_url, blocklist))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MockPage;

    #[tokio::test]
    async fn test_harvest_links_from_page() {
        let page = MockPage::new().with_anchors(&[
            Some("/about"),
            Some("/about"),
            Some("mailto:info@example.com"),
            Some("https://www.facebook.com/example"),
            Some("//cdn.example.com/x.js"),
            None,
        ]);
        let base = Url::parse("https://example.com/").unwrap();

        let links = harvest_links(&page, &base, &BlockList::default()).await.unwrap();

        assert_eq!(page.navigations(), vec!["https://example.com/".to_string()]);
        let links: Vec<_> = links.into_iter().collect();
        assert_eq!(
            links,
            vec![
                "https://cdn.example.com/x.js".to_string(),
                "https://example.com/about".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_harvest_links_empty_page() {
        let page = MockPage::new();
        let base = Url::parse("https://example.com/").unwrap();

        let links = harvest_links(&page, &base, &BlockList::default()).await.unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_anchors_yield_empty_set() {
        let page = MockPage::new()
            .with_anchors(&[Some("/about"), Some("https://example.org/")])
            .with_failing_attribute("href");
        let base = Url::parse("https://example.com/").unwrap();

        let links = harvest_links(&page, &base, &BlockList::default()).await.unwrap();

        assert!(links.is_empty());
        assert_eq!(page.navigations(), vec!["https://example.com/".to_string()]);
    }
}
