//! Layout verification for mobile pages
//!
//! Each check loads the target page, dismisses the cookie banner and inspects
//! rendered geometry. A missing element or bounding box fails the check with a
//! message naming the selector; only browser failures surface as errors.

use crate::page::{ElementRef, PageDriver};
use sitecheck_core::{
    BoundingBox, CheckKind, CheckResult, LayoutConfig, Locator, OverlapScenario, Result,
};
use std::iter;
use tracing::{debug, error, info, warn};

/// Click the cookie refusal button when it is visible.
///
/// Returns whether the button was clicked. A missing banner is not a failure.
pub async fn refuse_cookies<P>(page: &P, selector: &str) -> Result<bool>
where
    P: PageDriver + ?Sized,
{
    match visible_element(page, &Locator::css(selector)).await? {
        Some(button) => {
            debug!("Refusing cookies by clicking {}", selector);
            page.click(&button).await?;
            Ok(true)
        }
        None => {
            warn!("No cookie refusal button visible.");
            Ok(false)
        }
    }
}

/// First match of `locator` if it is visible
async fn visible_element<P>(page: &P, locator: &Locator) -> Result<Option<ElementRef>>
where
    P: PageDriver + ?Sized,
{
    let Some(element) = page.first(locator).await? else {
        return Ok(None);
    };
    if page.is_visible(&element).await? {
        Ok(Some(element))
    } else {
        Ok(None)
    }
}

/// Click the first match of `locator` if it is visible
async fn click_if_visible<P>(page: &P, locator: &Locator) -> Result<bool>
where
    P: PageDriver + ?Sized,
{
    match visible_element(page, locator).await? {
        Some(element) => {
            info!("Clicking {}", locator);
            page.click(&element).await?;
            Ok(true)
        }
        None => {
            debug!("Not visible, not clicking: {}", locator);
            Ok(false)
        }
    }
}

/// Verify a header element is visible and indented at least `min_indent`
/// pixels from the left edge
pub async fn verify_indentation<P>(
    page: &P,
    url: &str,
    layout: &LayoutConfig,
    target: &Locator,
) -> Result<CheckResult>
where
    P: PageDriver + ?Sized,
{
    page.navigate(url).await?;
    refuse_cookies(page, &layout.cookie_reject_selector).await?;

    info!("Checking header: {}", target);
    let label = target.to_string();

    let Some(header) = visible_element(page, target).await? else {
        warn!("Header is not visible: {}", target);
        return Ok(CheckResult::fail(
            CheckKind::Indentation,
            label,
            format!("Header is not visible: {}", target),
        ));
    };

    let Some(header_box) = page.bounding_box(&header).await? else {
        warn!("Header bounding box not found: {}", target);
        return Ok(CheckResult::fail(
            CheckKind::Indentation,
            label,
            format!("Header bounding box not found: {}", target),
        ));
    };

    if header_box.x < layout.min_indent {
        error!("Header '{}' x position: {}", target, header_box.x);
        Ok(CheckResult::fail(
            CheckKind::Indentation,
            label,
            format!(
                "Header is not indented: x = {} (minimum {})",
                header_box.x, layout.min_indent
            ),
        ))
    } else {
        info!("Header '{}' x position: {}", target, header_box.x);
        Ok(CheckResult::pass(
            CheckKind::Indentation,
            label,
            format!("x = {}", header_box.x),
        ))
    }
}

/// Verify the last item of a mobile menu is visible and not covered by any
/// visible overlay after opening the menu
pub async fn verify_not_overlapped<P>(
    page: &P,
    url: &str,
    layout: &LayoutConfig,
    scenario: &OverlapScenario,
) -> Result<CheckResult>
where
    P: PageDriver + ?Sized,
{
    page.navigate(url).await?;
    refuse_cookies(page, &layout.cookie_reject_selector).await?;

    click_if_visible(page, &scenario.menu_toggle).await?;
    for expander in &scenario.expanders {
        click_if_visible(page, expander).await?;
    }

    let label = scenario.last_item.to_string();
    let fail = |message: String| -> Result<CheckResult> {
        Ok(CheckResult::fail(CheckKind::Overlap, label.clone(), message))
    };

    let last_item = match page.last(&scenario.last_item).await? {
        Some(item) => page.is_visible(&item).await?.then_some(item),
        None => None,
    };
    let Some(last_item) = last_item else {
        warn!("Last item is not visible: {}", scenario.last_item);
        return fail(format!("Last item is not visible: {}", scenario.last_item));
    };

    let Some(item_box) = page.bounding_box(&last_item).await? else {
        warn!("Last item bounding box not found: {}", scenario.last_item);
        return fail(format!(
            "Last item bounding box not found: {}",
            scenario.last_item
        ));
    };
    debug!("Last item bounding box: {}", item_box);

    let overlays = iter::once(&scenario.overlay).chain(layout.global_overlays.iter());
    for overlay in overlays {
        let Some(element) = visible_element(page, overlay).await? else {
            continue;
        };

        let Some(overlay_box) = page.bounding_box(&element).await? else {
            warn!("Overlay bounding box not found: {}", overlay);
            return fail(format!("Overlay bounding box not found: {}", overlay));
        };
        info!("Checking overlay {} bounding box: {}", overlay, overlay_box);

        if covers(&overlay_box, &item_box) {
            error!("Last item is covered by overlay {}: {}", overlay, overlay_box);
            return fail(format!(
                "Last item {} is covered by overlay {} at {}",
                item_box, overlay, overlay_box
            ));
        }
    }

    Ok(CheckResult::pass(
        CheckKind::Overlap,
        label,
        format!("Last item at {} is not covered", item_box),
    ))
}

fn covers(overlay: &BoundingBox, item: &BoundingBox) -> bool {
    overlay.intersects(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{MockElement, MockPage};

    const URL: &str = "https://example.com/";

    fn layout() -> LayoutConfig {
        LayoutConfig {
            global_overlays: vec![Locator::css("#badge")],
            ..LayoutConfig::default()
        }
    }

    fn scenario() -> OverlapScenario {
        OverlapScenario {
            menu_toggle: Locator::css("#toggle"),
            expanders: vec![Locator::css("#expand")],
            last_item: Locator::css("#menu > li"),
            overlay: Locator::css("#menu-buttons"),
        }
    }

    fn cookie_button() -> (Locator, MockElement) {
        (
            Locator::css("#cookiescript_reject"),
            MockElement::at(BoundingBox::new(0.0, 600.0, 100.0, 40.0)),
        )
    }

    #[tokio::test]
    async fn test_refuse_cookies_clicks_visible_button() {
        let (locator, button) = cookie_button();
        let page = MockPage::new().with_element(locator, button);

        assert!(refuse_cookies(&page, "#cookiescript_reject").await.unwrap());
        assert_eq!(page.clicks().len(), 1);
    }

    #[tokio::test]
    async fn test_refuse_cookies_without_banner() {
        let page = MockPage::new()
            .with_element(Locator::css("#cookiescript_reject"), MockElement::hidden());

        assert!(!refuse_cookies(&page, "#cookiescript_reject").await.unwrap());
        assert!(page.clicks().is_empty());
    }

    #[tokio::test]
    async fn test_indentation_passes() {
        let logo = Locator::css("#logo");
        let page = MockPage::new()
            .with_element(logo.clone(), MockElement::at(BoundingBox::new(16.0, 8.0, 120.0, 40.0)));

        let result = verify_indentation(&page, URL, &layout(), &logo).await.unwrap();
        assert!(result.passed, "{}", result.message);
        assert_eq!(page.navigations(), vec![URL.to_string()]);
    }

    #[tokio::test]
    async fn test_indentation_fails_when_flush_left() {
        let heading = Locator::css("main h1").with_text("Welcome");
        let page = MockPage::new()
            .with_element(heading.clone(), MockElement::at(BoundingBox::new(4.0, 100.0, 300.0, 60.0)));

        let result = verify_indentation(&page, URL, &layout(), &heading).await.unwrap();
        assert!(!result.passed);
        assert_eq!(result.check, CheckKind::Indentation);
        assert!(result.message.contains("not indented"));
        assert_eq!(result.target, "main h1:has-text('Welcome')");
    }

    #[tokio::test]
    async fn test_indentation_fails_when_hidden_or_missing() {
        let logo = Locator::css("#logo");

        let hidden = MockPage::new().with_element(logo.clone(), MockElement::hidden());
        let result = verify_indentation(&hidden, URL, &layout(), &logo).await.unwrap();
        assert!(!result.passed);
        assert!(result.message.contains("not visible"));

        let missing = MockPage::new();
        let result = verify_indentation(&missing, URL, &layout(), &logo).await.unwrap();
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn test_indentation_fails_without_bounding_box() {
        let logo = Locator::css("#logo");
        let element = MockElement {
            visible: true,
            ..MockElement::default()
        };
        let page = MockPage::new().with_element(logo.clone(), element);

        let result = verify_indentation(&page, URL, &layout(), &logo).await.unwrap();
        assert!(!result.passed);
        assert!(result.message.contains("bounding box not found: #logo"));
    }

    fn menu_page(last_item_box: BoundingBox) -> MockPage {
        let s = scenario();
        let (cookie_locator, cookie) = cookie_button();
        MockPage::new()
            .with_element(cookie_locator, cookie)
            .with_element(s.menu_toggle.clone(), MockElement::at(BoundingBox::new(300.0, 10.0, 40.0, 40.0)))
            .with_element(s.expanders[0].clone(), MockElement::hidden())
            .with_element(s.last_item.clone(), MockElement::hidden())
            .with_element(s.last_item.clone(), MockElement::hidden())
            .with_element(s.last_item.clone(), {
                let mut item = MockElement::at(last_item_box);
                item.visible = false;
                item
            })
            .with_reveal(s.menu_toggle.clone(), s.last_item.clone())
            .with_element(s.overlay.clone(), MockElement::at(BoundingBox::new(0.0, 560.0, 375.0, 107.0)))
            .with_element(Locator::css("#badge"), MockElement::hidden())
    }

    #[tokio::test]
    async fn test_overlap_passes_when_clear() {
        let page = menu_page(BoundingBox::new(16.0, 400.0, 300.0, 40.0));

        let result = verify_not_overlapped(&page, URL, &layout(), &scenario()).await.unwrap();
        assert!(result.passed, "{}", result.message);

        // cookie banner then menu toggle; hidden expander is skipped
        let clicked: Vec<_> = page.clicks().into_iter().map(|c| c.locator.css).collect();
        assert_eq!(clicked, vec!["#cookiescript_reject", "#toggle"]);
    }

    #[tokio::test]
    async fn test_overlap_fails_when_covered() {
        let page = menu_page(BoundingBox::new(16.0, 540.0, 300.0, 40.0));

        let result = verify_not_overlapped(&page, URL, &layout(), &scenario()).await.unwrap();
        assert!(!result.passed);
        assert!(result.message.contains("covered by overlay #menu-buttons"));
    }

    #[tokio::test]
    async fn test_overlap_touching_edge_counts_as_covered() {
        // item bottom edge sits exactly on the overlay's top edge
        let page = menu_page(BoundingBox::new(16.0, 520.0, 300.0, 40.0));

        let result = verify_not_overlapped(&page, URL, &layout(), &scenario()).await.unwrap();
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn test_overlap_fails_when_menu_never_opens() {
        let s = scenario();
        let page = MockPage::new()
            .with_element(s.last_item.clone(), MockElement::hidden());

        let result = verify_not_overlapped(&page, URL, &layout(), &s).await.unwrap();
        assert!(!result.passed);
        assert!(result.message.contains("Last item is not visible"));
    }

    #[tokio::test]
    async fn test_overlap_fails_when_overlay_has_no_box() {
        let s = scenario();
        let overlay = MockElement {
            visible: true,
            ..MockElement::default()
        };
        let page = MockPage::new()
            .with_element(s.last_item.clone(), MockElement::at(BoundingBox::new(16.0, 100.0, 300.0, 40.0)))
            .with_element(s.overlay.clone(), overlay);

        let result = verify_not_overlapped(&page, URL, &layout(), &s).await.unwrap();
        assert!(!result.passed);
        assert!(result.message.contains("Overlay bounding box not found: #menu-buttons"));
    }

    #[tokio::test]
    async fn test_global_overlay_checked() {
        let s = scenario();
        let page = MockPage::new()
            .with_element(s.last_item.clone(), MockElement::at(BoundingBox::new(16.0, 100.0, 300.0, 40.0)))
            .with_element(Locator::css("#badge"), MockElement::at(BoundingBox::new(280.0, 120.0, 60.0, 60.0)));

        let result = verify_not_overlapped(&page, URL, &layout(), &s).await.unwrap();
        assert!(!result.passed);
        assert!(result.message.contains("#badge"));
    }
}
