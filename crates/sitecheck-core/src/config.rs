//! Configuration management for sitecheck
//!
//! Target site, blocked domains, HTTP probe settings, emulated devices and the
//! selectors used by layout checks all live here instead of being hardcoded.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::links::{default_blocked_domains, BlockList};
use crate::types::{BrowserEngine, Locator, Viewport};
use crate::{Result, SiteCheckError};

/// Environment variable toggling headless browser runs
pub const HEADLESS_ENV: &str = "HEADLESS";

/// Site-level sitecheck configuration
///
/// Loaded from `.sitecheck/config.toml` in the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Page every check starts from
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Run the browser without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Link collection settings
    #[serde(default)]
    pub links: LinksConfig,

    /// HTTP probe settings
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Emulated devices
    #[serde(default)]
    pub browser: BrowserMatrixConfig,

    /// Layout check selectors and thresholds
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Link collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Substrings that exclude a resolved URL from link checks
    #[serde(default = "default_blocked_domains")]
    pub blocked_domains: Vec<String>,
}

/// HTTP probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// User-Agent sent with every probe
    #[serde(default = "default_desktop_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Responses at or above this many seconds count as slow
    #[serde(default = "default_response_time_threshold_secs")]
    pub response_time_threshold_secs: f64,

    /// Maximum probes in flight for broken-link runs
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// Engines and devices layout checks are repeated on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserMatrixConfig {
    #[serde(default = "default_engines")]
    pub engines: Vec<BrowserEngine>,

    #[serde(default = "default_viewports")]
    pub viewports: Vec<Viewport>,

    /// User-Agent of the emulated phone
    #[serde(default = "default_mobile_user_agent")]
    pub mobile_user_agent: String,

    #[serde(default = "default_device_scale_factor")]
    pub device_scale_factor: f64,

    #[serde(default = "default_true")]
    pub has_touch: bool,

    /// Navigation and element wait timeout in seconds
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
}

/// Layout check selectors and thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Button that rejects the cookie banner
    #[serde(default = "default_cookie_reject_selector")]
    pub cookie_reject_selector: String,

    /// Minimum left offset of header elements in pixels
    #[serde(default = "default_min_indent")]
    pub min_indent: f64,

    /// Elements that must respect `min_indent`
    #[serde(default = "default_indentation_targets")]
    pub indentation_targets: Vec<Locator>,

    /// Menus whose last item must not be covered
    #[serde(default = "default_overlap_scenarios")]
    pub overlap_scenarios: Vec<OverlapScenario>,

    /// Overlays checked in every overlap scenario
    #[serde(default = "default_global_overlays")]
    pub global_overlays: Vec<Locator>,
}

/// One mobile menu to open and inspect for obstruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapScenario {
    /// Toggle that opens the menu (clicked when visible)
    pub menu_toggle: Locator,

    /// Submenu expanders clicked when visible, in order
    #[serde(default)]
    pub expanders: Vec<Locator>,

    /// Menu items; the last match is checked
    pub last_item: Locator,

    /// Overlay specific to this menu
    pub overlay: Locator,
}

// Default value providers
fn default_target_url() -> String {
    "https://engeto.cz/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_desktop_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/115.0.0.0 Safari/537.36"
        .to_string()
}

fn default_mobile_user_agent() -> String {
    "Mozilla/5.0 (iPhone; CPU iPhone OS 13_6 like Mac OS X) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/13.1.2 Mobile/15E148 Safari/604.1"
        .to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_response_time_threshold_secs() -> f64 {
    0.5
}

fn default_concurrency() -> usize {
    8
}

fn default_engines() -> Vec<BrowserEngine> {
    BrowserEngine::ALL.to_vec()
}

fn default_viewports() -> Vec<Viewport> {
    vec![
        Viewport::new(375, 667),   // small phone
        Viewport::new(390, 884),   // medium phone
        Viewport::new(430, 932),   // large phone
        Viewport::new(768, 1024),  // small tablet
        Viewport::new(820, 1180),  // medium tablet
        Viewport::new(1024, 1366), // large tablet
    ]
}

fn default_device_scale_factor() -> f64 {
    2.0
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_cookie_reject_selector() -> String {
    "#cookiescript_reject".to_string()
}

fn default_min_indent() -> f64 {
    16.0
}

fn default_indentation_targets() -> Vec<Locator> {
    vec![
        Locator::css("#logo"),
        Locator::css("main h1").with_text("Staň se novým IT talentem"),
        Locator::css("main a").with_text("Přehled IT kurzů"),
        Locator::css("main h2").with_text("Přečti si o IT, kariéře a trhu práce"),
    ]
}

fn default_overlap_scenarios() -> Vec<OverlapScenario> {
    let expanders = vec![
        Locator::css("#top-menu > li.area-pruvodce > label"),
        Locator::css("#top-menu > li.area-onas > label"),
    ];
    vec![
        OverlapScenario {
            menu_toggle: Locator::css("#main-header label.mobile-menu-toggle"),
            expanders: expanders.clone(),
            last_item: Locator::css("#top-menu > li"),
            overlay: Locator::css(
                "#main-header > div > div > nav > div.menu-buttons-mobile-default",
            ),
        },
        OverlapScenario {
            menu_toggle: Locator::css("#open-courses-menu"),
            expanders,
            last_item: Locator::css("#courses-dropdown > li:nth-child(3) > ul > li"),
            overlay: Locator::css(
                "#main-header > div > div > nav > div.menu-buttons-mobile-courses",
            ),
        },
    ]
}

fn default_global_overlays() -> Vec<Locator> {
    vec![
        Locator::css("#cookiescript_badge"),
        Locator::css("#cookiescript_reject"),
        Locator::css("div.intercom-lightweight-app > div"),
    ]
}

/// Interpret the `HEADLESS` variable: only `true` (any case) means headless,
/// unset defaults to headless.
pub fn parse_headless(value: Option<&str>) -> bool {
    value
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(true)
}

impl SiteConfig {
    /// Path of the config file under a project root
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(".sitecheck/config.toml")
    }

    /// Load configuration from `.sitecheck/config.toml` or use defaults
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let config_path = Self::path_in(root);

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            SiteCheckError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write default configuration to `.sitecheck/config.toml`
    pub fn write_default(root: &Path) -> Result<PathBuf> {
        let config_dir = root.join(".sitecheck");
        std::fs::create_dir_all(&config_dir)?;

        let config_path = Self::path_in(root);
        let content = toml::to_string_pretty(&Self::default()).map_err(|e| {
            SiteCheckError::Config(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    /// Apply the `HEADLESS` environment variable, if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(HEADLESS_ENV) {
            self.headless = parse_headless(Some(&value));
        }
        self
    }

    /// Reject values no run could succeed with
    pub fn validate(&self) -> Result<()> {
        self.target()?;
        if self.probe.concurrency == 0 {
            return Err(SiteCheckError::Config(
                "probe.concurrency must be at least 1".to_string(),
            ));
        }
        let threshold = self.probe.response_time_threshold_secs;
        if threshold <= 0.0 || Duration::try_from_secs_f64(threshold).is_err() {
            return Err(SiteCheckError::Config(
                "probe.response_time_threshold_secs must be a positive, finite number of seconds"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed target URL
    pub fn target(&self) -> Result<Url> {
        Url::parse(&self.target_url).map_err(|e| SiteCheckError::InvalidUrl {
            url: self.target_url.clone(),
            reason: e.to_string(),
        })
    }

    pub fn blocklist(&self) -> BlockList {
        BlockList::new(self.links.blocked_domains.iter().cloned())
    }
}

impl ProbeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Threshold as a duration; out-of-range values (rejected by `validate`) saturate
    pub fn response_time_threshold(&self) -> Duration {
        Duration::try_from_secs_f64(self.response_time_threshold_secs).unwrap_or(Duration::MAX)
    }
}

impl BrowserMatrixConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            headless: true,
            links: LinksConfig::default(),
            probe: ProbeConfig::default(),
            browser: BrowserMatrixConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            blocked_domains: default_blocked_domains(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            user_agent: default_desktop_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            response_time_threshold_secs: default_response_time_threshold_secs(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for BrowserMatrixConfig {
    fn default() -> Self {
        Self {
            engines: default_engines(),
            viewports: default_viewports(),
            mobile_user_agent: default_mobile_user_agent(),
            device_scale_factor: default_device_scale_factor(),
            has_touch: true,
            navigation_timeout_secs: default_navigation_timeout_secs(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cookie_reject_selector: default_cookie_reject_selector(),
            min_indent: default_min_indent(),
            indentation_targets: default_indentation_targets(),
            overlap_scenarios: default_overlap_scenarios(),
            global_overlays: default_global_overlays(),
        }
    }
}
