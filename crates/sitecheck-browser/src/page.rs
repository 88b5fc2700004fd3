//! Page capability abstraction (allows running checks against a fake page)

use async_trait::async_trait;
use sitecheck_core::{BoundingBox, Locator, Result, SiteCheckError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Handle to the nth element matched by a locator on the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub locator: Locator,
    pub index: usize,
}

impl ElementRef {
    pub fn new(locator: Locator, index: usize) -> Self {
        Self { locator, index }
    }
}

impl std::fmt::Display for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} >> nth={}", self.locator, self.index)
    }
}

/// Trait for querying and driving a loaded page
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Load a URL and wait for navigation to finish
    async fn navigate(&self, url: &str) -> Result<()>;

    /// All elements currently matching the locator, in document order
    async fn enumerate(&self, locator: &Locator) -> Result<Vec<ElementRef>>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>>;

    /// Rendered box, `None` when the element is not rendered
    async fn bounding_box(&self, element: &ElementRef) -> Result<Option<BoundingBox>>;

    async fn is_visible(&self, element: &ElementRef) -> Result<bool>;

    async fn click(&self, element: &ElementRef) -> Result<()>;

    /// Attribute of every element matching the locator
    async fn attributes(&self, locator: &Locator, name: &str) -> Result<Vec<Option<String>>> {
        let mut values = Vec::new();
        for element in self.enumerate(locator).await? {
            values.push(self.attribute(&element, name).await?);
        }
        Ok(values)
    }

    async fn first(&self, locator: &Locator) -> Result<Option<ElementRef>> {
        Ok(self.enumerate(locator).await?.into_iter().next())
    }

    async fn last(&self, locator: &Locator) -> Result<Option<ElementRef>> {
        Ok(self.enumerate(locator).await?.pop())
    }
}

/// Element state served by [`MockPage`]
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    pub attributes: HashMap<String, String>,
    pub bounding_box: Option<BoundingBox>,
    pub visible: bool,
}

impl MockElement {
    /// A visible element rendered at the given box
    pub fn at(bounding_box: BoundingBox) -> Self {
        Self {
            attributes: HashMap::new(),
            bounding_box: Some(bounding_box),
            visible: true,
        }
    }

    /// Present in the DOM but not rendered
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }
}

/// Mock page for testing
#[derive(Default)]
pub struct MockPage {
    elements: Mutex<HashMap<Locator, Vec<MockElement>>>,
    reveals: HashMap<Locator, Vec<Locator>>,
    failing_attributes: Vec<String>,
    navigations: Mutex<Vec<String>>,
    clicks: Mutex<Vec<ElementRef>>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, locator: Locator, element: MockElement) -> Self {
        self.lock_elements()
            .entry(locator)
            .or_default()
            .push(element);
        self
    }

    /// Add `a[href]` anchors; `None` adds an anchor without an href value
    pub fn with_anchors(mut self, hrefs: &[Option<&str>]) -> Self {
        let locator = Locator::css(crate::harvest::ANCHOR_SELECTOR);
        for href in hrefs {
            let element = match href {
                Some(h) => MockElement::hidden().with_attribute("href", h),
                None => MockElement::hidden(),
            };
            self = self.with_element(locator.clone(), element);
        }
        self
    }

    /// Clicking any `trigger` match makes every `target` match visible
    pub fn with_reveal(mut self, trigger: Locator, target: Locator) -> Self {
        self.reveals.entry(trigger).or_default().push(target);
        self
    }

    /// Reading attribute `name` from any element fails with a browser error
    pub fn with_failing_attribute(mut self, name: &str) -> Self {
        self.failing_attributes.push(name.to_string());
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn clicks(&self) -> Vec<ElementRef> {
        self.clicks.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn lock_elements(&self) -> std::sync::MutexGuard<'_, HashMap<Locator, Vec<MockElement>>> {
        match self.elements.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn element(&self, element: &ElementRef) -> Option<MockElement> {
        self.lock_elements()
            .get(&element.locator)
            .and_then(|matches| matches.get(element.index))
            .cloned()
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        if let Ok(mut navigations) = self.navigations.lock() {
            navigations.push(url.to_string());
        }
        Ok(())
    }

    async fn enumerate(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        let count = self.lock_elements().get(locator).map_or(0, Vec::len);
        Ok((0..count)
            .map(|index| ElementRef::new(locator.clone(), index))
            .collect())
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        if self.failing_attributes.iter().any(|failing| failing == name) {
            return Err(SiteCheckError::Browser(format!(
                "Failed to read {} of {}",
                name, element
            )));
        }
        Ok(self
            .element(element)
            .and_then(|e| e.attributes.get(name).cloned()))
    }

    async fn bounding_box(&self, element: &ElementRef) -> Result<Option<BoundingBox>> {
        Ok(self.element(element).and_then(|e| e.bounding_box))
    }

    async fn is_visible(&self, element: &ElementRef) -> Result<bool> {
        Ok(self.element(element).is_some_and(|e| e.visible))
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        if self.element(element).is_none() {
            return Err(SiteCheckError::ElementNotFound {
                selector: element.to_string(),
            });
        }

        if let Ok(mut clicks) = self.clicks.lock() {
            clicks.push(element.clone());
        }

        if let Some(targets) = self.reveals.get(&element.locator) {
            let mut elements = self.lock_elements();
            for target in targets {
                for revealed in elements.get_mut(target).into_iter().flatten() {
                    revealed.visible = true;
                }
            }
        }
        Ok(())
    }
}
