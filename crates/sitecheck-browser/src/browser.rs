//! Browser lifecycle management using Chrome DevTools Protocol

use crate::page::{ElementRef, PageDriver};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::de::DeserializeOwned;
use sitecheck_core::{
    BoundingBox, BrowserEngine, ContextOptions, Locator, Result, SiteCheckError, Viewport,
};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Finds the elements a locator matches: CSS selector plus optional text filter.
/// `text` arrives already normalized by [`normalize_text`]; element text gets the
/// same whitespace collapsing and lowercasing before the substring test.
const FIND_ELEMENTS_JS: &str = "((css, text) => { \
    const norm = s => (s || '').replace(/\\s+/g, ' ').trim().toLowerCase(); \
    return Array.from(document.querySelectorAll(css)) \
        .filter(e => text === null || norm(e.textContent).includes(text)); })";

/// Text filter normal form: whitespace runs collapsed to one space, trimmed, lowercased
fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Browser window size
    pub viewport: Viewport,
    /// User agent string
    pub user_agent: Option<String>,
    /// Device pixel ratio
    pub device_scale_factor: f64,
    /// Enable touch events
    pub has_touch: bool,
    /// Honour `<meta name="viewport">` like a mobile browser
    pub is_mobile: bool,
    /// Navigation timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::new(1920, 1080),
            user_agent: None,
            device_scale_factor: 1.0,
            has_touch: false,
            is_mobile: false,
            timeout_seconds: 30,
        }
    }
}

impl BrowserConfig {
    /// Browser configuration emulating the device described by `options`
    pub fn for_context(options: &ContextOptions, headless: bool, timeout: Duration) -> Self {
        Self {
            headless,
            viewport: options.viewport,
            user_agent: options.user_agent.clone(),
            device_scale_factor: options.device_scale_factor,
            has_touch: options.has_touch,
            is_mobile: options.is_mobile,
            timeout_seconds: timeout.as_secs(),
        }
    }

    /// Extra Chromium command-line switches for this configuration
    fn chrome_args(&self) -> Vec<String> {
        let mut args = vec![format!(
            "--force-device-scale-factor={}",
            self.device_scale_factor
        )];
        if let Some(ua) = &self.user_agent {
            args.push(format!("--user-agent={}", ua));
        }
        if self.has_touch {
            args.push("--touch-events=enabled".to_string());
        }
        if self.is_mobile {
            args.push("--enable-viewport".to_string());
        }
        args
    }
}

/// Active browser session with Chrome DevTools Protocol
pub struct BrowserSession {
    /// Underlying browser instance (kept alive for tab lifetime)
    #[allow(dead_code)]
    browser: Browser,
    /// Current active tab
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a new Chromium instance with default configuration
    pub async fn launch() -> Result<Self> {
        Self::launch_with_config(BrowserConfig::default()).await
    }

    /// Launch the requested engine; only Chromium is driven over CDP
    pub async fn launch_engine(engine: BrowserEngine, config: BrowserConfig) -> Result<Self> {
        match engine {
            BrowserEngine::Chromium => Self::launch_with_config(config).await,
            other => Err(SiteCheckError::UnsupportedEngine(other.to_string())),
        }
    }

    /// Launch browser with custom configuration
    pub async fn launch_with_config(config: BrowserConfig) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, size: {}, mobile: {})",
            config.headless, config.viewport, config.is_mobile
        );

        let mut launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| SiteCheckError::Browser(format!("Failed to launch browser: {}", e)))?;

        let chrome_args = config.chrome_args();
        for arg in &chrome_args {
            launch_options.args.push(OsStr::new(arg));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| SiteCheckError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| SiteCheckError::Browser(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(config.timeout_seconds));

        info!("Browser launched successfully");

        Ok(Self { browser, tab })
    }

    /// Execute JavaScript in the page context
    ///
    /// # Returns
    /// JSON result from JavaScript execution
    pub async fn evaluate_script(&self, script: &str) -> Result<serde_json::Value> {
        debug!("Evaluating JavaScript: {}", script);

        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| SiteCheckError::Browser(format!("JavaScript evaluation failed: {}", e)))?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Evaluate a script that returns `JSON.stringify(...)` and decode it
    async fn evaluate_json<T: DeserializeOwned>(&self, script: &str) -> Result<T> {
        match self.evaluate_script(script).await? {
            serde_json::Value::String(json) => Ok(serde_json::from_str(&json)?),
            other => Ok(serde_json::from_value(other)?),
        }
    }

    /// Close the browser session
    pub async fn close(self) -> Result<()> {
        info!("Closing browser session");
        // Browser will be dropped and cleaned up automatically
        Ok(())
    }
}

/// Script running `body` with `matches` bound to the locator's matches and `el`
/// to the `index`th one (possibly undefined)
fn locator_script(locator: &Locator, index: usize, body: &str) -> Result<String> {
    let css = serde_json::to_string(&locator.css)?;
    let text = serde_json::to_string(&locator.has_text.as_deref().map(normalize_text))?;
    Ok(format!(
        "(() => {{ const matches = {}({}, {}); const el = matches[{}]; {} }})()",
        FIND_ELEMENTS_JS, css, text, index, body
    ))
}

fn element_script(element: &ElementRef, body: &str) -> Result<String> {
    locator_script(&element.locator, element.index, body)
}

#[async_trait]
impl PageDriver for BrowserSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);

        self.tab
            .navigate_to(url)
            .map_err(|e| SiteCheckError::Browser(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| SiteCheckError::Browser(format!("Navigation timeout for {}: {}", url, e)))?;

        info!("Successfully navigated to {}", url);
        Ok(())
    }

    async fn enumerate(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        let script = locator_script(locator, 0, "return JSON.stringify(matches.length);")?;
        let count: usize = self.evaluate_json(&script).await?;
        debug!("{} matched {} elements", locator, count);

        Ok((0..count)
            .map(|index| ElementRef::new(locator.clone(), index))
            .collect())
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let name = serde_json::to_string(name)?;
        let script = element_script(
            element,
            &format!("return JSON.stringify(el ? el.getAttribute({}) : null);", name),
        )?;
        self.evaluate_json(&script).await
    }

    async fn attributes(&self, locator: &Locator, name: &str) -> Result<Vec<Option<String>>> {
        let name = serde_json::to_string(name)?;
        let script = locator_script(
            locator,
            0,
            &format!("return JSON.stringify(matches.map(m => m.getAttribute({})));", name),
        )?;
        self.evaluate_json(&script).await
    }

    async fn bounding_box(&self, element: &ElementRef) -> Result<Option<BoundingBox>> {
        let script = element_script(
            element,
            "if (!el) { return 'null'; } \
             const r = el.getBoundingClientRect(); \
             if (r.width === 0 && r.height === 0 && el.getClientRects().length === 0) { return 'null'; } \
             return JSON.stringify({ x: r.x, y: r.y, width: r.width, height: r.height });",
        )?;
        self.evaluate_json(&script).await
    }

    async fn is_visible(&self, element: &ElementRef) -> Result<bool> {
        let script = element_script(
            element,
            "if (!el) { return 'false'; } \
             const r = el.getBoundingClientRect(); \
             const style = window.getComputedStyle(el); \
             return JSON.stringify(r.width > 0 && r.height > 0 && style.visibility !== 'hidden');",
        )?;
        self.evaluate_json(&script).await
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        debug!("Clicking {}", element);
        let script = element_script(
            element,
            "if (!el) { return 'false'; } el.click(); return 'true';",
        )?;
        let clicked: bool = self.evaluate_json(&script).await?;
        if clicked {
            Ok(())
        } else {
            Err(SiteCheckError::ElementNotFound {
                selector: element.to_string(),
            })
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!("BrowserSession dropped, browser will be cleaned up");
    }
}
