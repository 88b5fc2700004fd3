//! Judging probe results

use crate::client::{LinkProbe, ProbeOutcome};
use sitecheck_core::{CheckKind, CheckResult};
use std::time::Duration;
use tracing::{error, warn};

/// Statuses at or above this are broken links
const BROKEN_STATUS: u16 = 400;

/// A link passes when it answered with a status below 400
pub fn broken_link_result(probe: &LinkProbe) -> CheckResult {
    match &probe.outcome {
        ProbeOutcome::Response { status, .. } if *status >= BROKEN_STATUS => {
            error!("Broken link: {}, Status: {}", probe.url, status);
            CheckResult::fail(
                CheckKind::BrokenLink,
                &probe.url,
                format!("Broken link: {}, Status: {}", probe.url, status),
            )
        }
        ProbeOutcome::Response { status, .. } => {
            CheckResult::pass(CheckKind::BrokenLink, &probe.url, format!("Status: {}", status))
        }
        ProbeOutcome::Failed { error } => request_failed(CheckKind::BrokenLink, probe, error),
    }
}

/// A link passes when its headers arrived in less than `threshold`
pub fn response_time_result(probe: &LinkProbe, threshold: Duration) -> CheckResult {
    match &probe.outcome {
        ProbeOutcome::Response { elapsed, .. } => {
            let millis = elapsed.as_secs_f64() * 1000.0;
            if *elapsed >= threshold {
                warn!("Slow link: {}, Response Time: {:.2} ms", probe.url, millis);
                CheckResult::fail(
                    CheckKind::ResponseTime,
                    &probe.url,
                    format!("Slow link: {}, Response Time: {:.2} ms", probe.url, millis),
                )
            } else {
                CheckResult::pass(
                    CheckKind::ResponseTime,
                    &probe.url,
                    format!("Response Time: {:.2} ms", millis),
                )
            }
        }
        ProbeOutcome::Failed { error } => request_failed(CheckKind::ResponseTime, probe, error),
    }
}

fn request_failed(check: CheckKind, probe: &LinkProbe, error: &str) -> CheckResult {
    CheckResult::fail(
        check,
        &probe.url,
        format!("Request: {}, Error: {}", probe.url, error),
    )
}
