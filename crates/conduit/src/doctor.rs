// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `conduit doctor` command implementation.
//!
//! Runs diagnostic checks against the loaded configuration: channel
//! definitions, handler coverage, attachment storage and the outbound
//! HTTP client.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use colored::Colorize;
use conduit_config::ConduitConfig;
use conduit_core::{ConduitError, Storage};

use crate::runtime::Runtime;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `conduit doctor` command. With `plain`, disables colored output.
pub async fn run_doctor(config: &ConduitConfig, plain: bool) -> Result<(), ConduitError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = run_checks(config).await;

    println!();
    println!("  conduit doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;
    for result in &results {
        match result.status {
            CheckStatus::Warn => warn_count += 1,
            CheckStatus::Fail => fail_count += 1,
            CheckStatus::Pass => {}
        }
        println!("{}", render_line(result, use_color));
    }

    println!();
    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    if fail_count > 0 {
        return Err(ConduitError::Internal(format!("{fail_count} check(s) failed")));
    }
    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal().to_string()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow().to_string()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red().to_string()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!("    {tag} {:<20} {} ({duration_ms}ms)", result.name, result.message)
    }
}

/// Run every check. A failure to build the runtime fails the dependent
/// checks instead of aborting.
pub async fn run_checks(config: &ConduitConfig) -> Vec<CheckResult> {
    let start = Instant::now();
    let runtime = match Runtime::from_config(config) {
        Ok(runtime) => runtime,
        Err(e) => {
            return vec![CheckResult::new(
                "Configuration",
                CheckStatus::Fail,
                e.to_string(),
                start,
            )];
        }
    };

    let mut results = vec![check_channels(&runtime, start)];
    results.push(check_handlers(&runtime));
    results.push(check_storage(&runtime).await);
    results
}

fn check_channels(runtime: &Runtime, start: Instant) -> CheckResult {
    if runtime.channels.is_empty() {
        return CheckResult::new(
            "Channels",
            CheckStatus::Warn,
            "no channels configured",
            start,
        );
    }
    CheckResult::new(
        "Channels",
        CheckStatus::Pass,
        format!("{} configured", runtime.channels.len()),
        start,
    )
}

fn check_handlers(runtime: &Runtime) -> CheckResult {
    let start = Instant::now();
    let unhandled = runtime.unhandled_channels();
    if unhandled.is_empty() {
        return CheckResult::new(
            "Handlers",
            CheckStatus::Pass,
            format!("{} registered", runtime.registry.len()),
            start,
        );
    }

    let mut types: Vec<String> = unhandled
        .iter()
        .map(|ch| ch.channel_type.to_string())
        .collect();
    types.sort();
    types.dedup();
    CheckResult::new(
        "Handlers",
        CheckStatus::Fail,
        format!("no handler for channel type(s): {}", types.join(", ")),
        start,
    )
}

async fn check_storage(runtime: &Runtime) -> CheckResult {
    let start = Instant::now();
    match runtime.storage.test().await {
        Ok(()) => CheckResult::new(
            "Storage",
            CheckStatus::Pass,
            format!("writable: {}", runtime.storage.root().display()),
            start,
        ),
        Err(e) => CheckResult::new("Storage", CheckStatus::Fail, e.to_string(), start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toml: &str) -> ConduitConfig {
        conduit_config::load_and_validate_str(toml).unwrap()
    }

    #[tokio::test]
    async fn healthy_config_passes() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            r#"
[storage]
root = "{}"

[[channels]]
uuid = "8eb23e93-5ecb-45ba-b726-3b064e0c56ab"
channel_type = "BL"
address = "2020"
"#,
            dir.path().display()
        );

        let results = run_checks(&config(&toml)).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.status == CheckStatus::Pass), "{results:?}");
    }

    #[tokio::test]
    async fn unknown_channel_type_fails_handlers() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            r#"
[storage]
root = "{}"

[[channels]]
uuid = "8eb23e93-5ecb-45ba-b726-3b064e0c56ab"
channel_type = "ZZ"
address = "2020"
"#,
            dir.path().display()
        );

        let results = run_checks(&config(&toml)).await;
        let handlers = results.iter().find(|r| r.name == "Handlers").unwrap();
        assert_eq!(handlers.status, CheckStatus::Fail);
        assert!(handlers.message.contains("ZZ"));
    }

    #[test]
    fn plain_output_uses_tags() {
        let result = CheckResult {
            name: "Storage".to_string(),
            status: CheckStatus::Warn,
            message: "slow".to_string(),
            duration: Duration::from_millis(3),
        };
        let line = render_line(&result, false);
        assert!(line.contains("[WARN]"));
        assert!(line.contains("slow (3ms)"));
    }
}
