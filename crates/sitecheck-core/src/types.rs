//! Core type definitions for sitecheck runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Browser engine a check run is parametrized with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserEngine {
    /// All engines, in the order runs are reported
    pub const ALL: [BrowserEngine; 3] = [Self::Chromium, Self::Firefox, Self::Webkit];

    /// Whether the engine emulates a mobile device when a mobile context is requested.
    ///
    /// Firefox has no mobile emulation, so only viewport, user agent and touch apply.
    pub fn supports_mobile_emulation(&self) -> bool {
        !matches!(self, Self::Firefox)
    }
}

impl std::fmt::Display for BrowserEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chromium => write!(f, "chromium"),
            Self::Firefox => write!(f, "firefox"),
            Self::Webkit => write!(f, "webkit"),
        }
    }
}

impl std::str::FromStr for BrowserEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Self::Chromium),
            "firefox" => Ok(Self::Firefox),
            "webkit" | "safari" => Ok(Self::Webkit),
            _ => Err(format!("Invalid browser engine: {}", s)),
        }
    }
}

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Browser context options for one emulated device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextOptions {
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub device_scale_factor: f64,
    pub has_touch: bool,
    pub is_mobile: bool,
}

impl ContextOptions {
    /// Options for a mobile device run on the given engine
    pub fn for_device(
        viewport: Viewport,
        engine: BrowserEngine,
        user_agent: &str,
        device_scale_factor: f64,
        has_touch: bool,
    ) -> Self {
        Self {
            viewport,
            user_agent: Some(user_agent.to_string()),
            device_scale_factor,
            has_touch,
            is_mobile: engine.supports_mobile_emulation(),
        }
    }
}

/// CSS selector with an optional text-content filter
///
/// `Locator::css("main h1").with_text("Welcome")` matches `main h1` elements whose
/// text content contains `Welcome`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub css: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_text: Option<String>,
}

impl Locator {
    pub fn css(css: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            has_text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.has_text {
            Some(text) => write!(f, "{}:has-text('{}')", self.css, text),
            None => write!(f, "{}", self.css),
        }
    }
}

/// Kind of check a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    BrokenLink,
    ResponseTime,
    Indentation,
    Overlap,
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BrokenLink => write!(f, "broken_link"),
            Self::ResponseTime => write!(f, "response_time"),
            Self::Indentation => write!(f, "indentation"),
            Self::Overlap => write!(f, "overlap"),
        }
    }
}

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckKind,
    /// URL or locator the check ran against
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<BrowserEngine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    pub fn pass(check: CheckKind, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check,
            target: target.into(),
            engine: None,
            viewport: None,
            passed: true,
            message: message.into(),
        }
    }

    pub fn fail(check: CheckKind, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            ..Self::pass(check, target, message)
        }
    }

    /// Tag the result with the device it ran on
    pub fn on_device(mut self, engine: BrowserEngine, viewport: Viewport) -> Self {
        self.engine = Some(engine);
        self.viewport = Some(viewport);
        self
    }
}

/// Collected results of one sitecheck invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub target_url: String,
    pub started_at: DateTime<Utc>,
    pub results: Vec<CheckResult>,
}

impl CheckReport {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            started_at: Utc::now(),
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}
