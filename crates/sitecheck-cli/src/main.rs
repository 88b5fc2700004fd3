//! sitecheck CLI - end-to-end checks for a single website
//!
//! Usage:
//!   sitecheck init                Write default .sitecheck/config.toml
//!   sitecheck links               List checkable links on the target page
//!   sitecheck broken-links        Fail on links answering 4xx/5xx or not at all
//!   sitecheck response-time       Fail on links slower than the threshold
//!   sitecheck indentation         Check header indentation on every device
//!   sitecheck overlap             Check mobile menus are not covered by overlays

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sitecheck_browser::{
    harvest_links, verify_indentation, verify_not_overlapped, BrowserConfig, BrowserSession,
};
use sitecheck_core::{
    BrowserEngine, CheckKind, CheckReport, CheckResult, ContextOptions, LinkSet, SiteCheckError,
    SiteConfig, Viewport,
};
use sitecheck_probe::{broken_link_result, response_time_result, LinkProber};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "sitecheck")]
#[command(author, version, about = "End-to-end link and layout checks for a website")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to .sitecheck/config.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the target URL from the config
    #[arg(long)]
    url: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Project path (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List the checkable links found on the target page
    Links,

    /// Check every link answers with a non-error status
    BrokenLinks {
        /// Maximum requests in flight (defaults to probe.concurrency)
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },

    /// Check every link responds within the threshold
    ResponseTime {
        /// Threshold in seconds (defaults to probe.response_time_threshold_secs)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Check header elements are indented on every device
    Indentation,

    /// Check the last mobile menu item is not covered by overlays
    Overlap,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Commands::Init { path } = &cli.command {
        return cmd_init(path);
    }

    let config = load_config(&cli)?;

    let report = match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),
        Commands::Links => return cmd_links(&config, cli.json).await,
        Commands::BrokenLinks { concurrency } => cmd_broken_links(&config, concurrency).await?,
        Commands::ResponseTime { threshold } => cmd_response_time(config, threshold).await?,
        Commands::Indentation => run_device_matrix(&config, LayoutCheck::Indentation).await,
        Commands::Overlap => run_device_matrix(&config, LayoutCheck::Overlap).await,
    };

    print_report(&report, cli.json)?;

    let failed = report.failed().count();
    if failed > 0 {
        anyhow::bail!("{} of {} checks failed", failed, report.results.len());
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let mut config = match &cli.config {
        Some(path) => SiteConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SiteConfig::load_or_default(&std::env::current_dir()?)
            .context("Failed to load .sitecheck/config.toml")?,
    }
    .with_env_overrides();

    if let Some(url) = &cli.url {
        config.target_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

fn cmd_init(path: &Path) -> Result<()> {
    info!("Initializing sitecheck in {:?}", path);

    let config_path = SiteConfig::write_default(path)?;
    println!("Created {}", config_path.display());
    Ok(())
}

/// Launch the link-harvesting browser and collect links from the target page
async fn harvest(config: &SiteConfig) -> Result<LinkSet> {
    let base = config.target()?;
    let browser_config = BrowserConfig {
        headless: config.headless,
        timeout_seconds: config.browser.navigation_timeout_secs,
        ..BrowserConfig::default()
    };

    let session = BrowserSession::launch_with_config(browser_config).await?;
    let links = harvest_links(&session, &base, &config.blocklist()).await?;
    session.close().await?;
    Ok(links)
}

async fn cmd_links(config: &SiteConfig, json: bool) -> Result<()> {
    let links = harvest(config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
    } else {
        for link in &links {
            println!("{}", link);
        }
    }
    Ok(())
}

async fn cmd_broken_links(config: &SiteConfig, concurrency: Option<usize>) -> Result<CheckReport> {
    let links = harvest(config).await?;
    let prober = LinkProber::new(config.probe.clone())?;

    let concurrency = concurrency.unwrap_or(config.probe.concurrency);
    let probes = prober.probe_all(&links, concurrency).await;

    let mut report = CheckReport::new(&config.target_url);
    for probe in &probes {
        report.push(broken_link_result(probe));
    }
    Ok(report)
}

async fn cmd_response_time(mut config: SiteConfig, threshold: Option<f64>) -> Result<CheckReport> {
    if let Some(secs) = threshold {
        config.probe.response_time_threshold_secs = secs;
        config.validate()?;
    }

    let links = harvest(&config).await?;
    let prober = LinkProber::new(config.probe.clone())?;
    let threshold = config.probe.response_time_threshold();

    // one at a time so measurements do not skew each other
    let mut report = CheckReport::new(&config.target_url);
    for link in &links {
        let probe = prober.probe(link).await;
        report.push(response_time_result(&probe, threshold));
    }
    Ok(report)
}

/// Layout checks repeated on every emulated device
#[derive(Debug, Clone, Copy)]
enum LayoutCheck {
    Indentation,
    Overlap,
}

impl LayoutCheck {
    fn kind(self) -> CheckKind {
        match self {
            Self::Indentation => CheckKind::Indentation,
            Self::Overlap => CheckKind::Overlap,
        }
    }

    async fn run(self, session: &BrowserSession, config: &SiteConfig) -> Vec<CheckResult> {
        let url = config.target_url.as_str();
        let layout = &config.layout;
        let mut results = Vec::new();

        match self {
            Self::Indentation => {
                for target in &layout.indentation_targets {
                    let result = verify_indentation(session, url, layout, target).await;
                    results.push(self.settle(result, target.to_string()));
                }
            }
            Self::Overlap => {
                for scenario in &layout.overlap_scenarios {
                    let result = verify_not_overlapped(session, url, layout, scenario).await;
                    results.push(self.settle(result, scenario.last_item.to_string()));
                }
            }
        }
        results
    }

    /// Browser errors fail the check they interrupted
    fn settle(self, result: sitecheck_core::Result<CheckResult>, target: String) -> CheckResult {
        result.unwrap_or_else(|e| {
            error!("{} check on {} errored: {}", self.kind(), target, e);
            CheckResult::fail(self.kind(), target, e.to_string())
        })
    }
}

/// Run a layout check once per configured engine and viewport, each in a fresh browser
async fn run_device_matrix(config: &SiteConfig, check: LayoutCheck) -> CheckReport {
    let mut report = CheckReport::new(&config.target_url);

    for &engine in &config.browser.engines {
        for &viewport in &config.browser.viewports {
            let session = match launch_device(config, engine, viewport).await {
                Ok(session) => session,
                Err(SiteCheckError::UnsupportedEngine(name)) => {
                    warn!("Skipping {}: no driver available", name);
                    break;
                }
                Err(e) => {
                    error!("Failed to launch {} {}: {}", engine, viewport, e);
                    report.push(
                        CheckResult::fail(check.kind(), &config.target_url, e.to_string())
                            .on_device(engine, viewport),
                    );
                    continue;
                }
            };

            info!("Running {} checks on {} {}", check.kind(), engine, viewport);
            for result in check.run(&session, config).await {
                report.push(result.on_device(engine, viewport));
            }

            if let Err(e) = session.close().await {
                warn!("Failed to close browser: {}", e);
            }
        }
    }

    report
}

async fn launch_device(
    config: &SiteConfig,
    engine: BrowserEngine,
    viewport: Viewport,
) -> sitecheck_core::Result<BrowserSession> {
    let options = ContextOptions::for_device(
        viewport,
        engine,
        &config.browser.mobile_user_agent,
        config.browser.device_scale_factor,
        config.browser.has_touch,
    );
    let browser_config =
        BrowserConfig::for_context(&options, config.headless, config.browser.navigation_timeout());
    BrowserSession::launch_engine(engine, browser_config).await
}

fn print_report(report: &CheckReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for result in &report.results {
        let status = if result.passed { "PASS" } else { "FAIL" };
        let device = match (result.engine, result.viewport) {
            (Some(engine), Some(viewport)) => format!(" [{} {}]", engine, viewport),
            _ => String::new(),
        };
        println!(
            "{} {}{} {}: {}",
            status, result.check, device, result.target, result.message
        );
    }

    println!(
        "\n{} passed, {} failed",
        report.passed_count(),
        report.results.len() - report.passed_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_and_subcommand() {
        let cli = Cli::try_parse_from([
            "sitecheck",
            "--url",
            "https://example.com/",
            "--json",
            "broken-links",
            "-j",
            "2",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.url.as_deref(), Some("https://example.com/"));
        assert!(matches!(
            cli.command,
            Commands::BrokenLinks {
                concurrency: Some(2)
            }
        ));
    }

    #[test]
    fn test_url_override_is_validated() {
        let cli = Cli::try_parse_from(["sitecheck", "--url", "nope", "links"]).unwrap();
        assert!(load_config(&cli).is_err());
    }
}
