//! Scenario runner
//!
//! Executes the steps in order against one browser session, prints a
//! verbose pass/fail line per step and collects a report.

use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use serde::Serialize;
use tokio::time::Instant;

use crate::common::config::FailurePolicy;
use crate::common::{Error, Result};
use crate::webdriver::Browser;

use super::session::ShopSession;
use super::steps::StepKind;

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Failed,
    /// Not run because an earlier step failed under the stop policy
    Skipped,
}

/// Record of one executed (or skipped) step
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub number: usize,
    pub id: String,
    pub status: StepStatus,
    pub duration_ms: u64,
    /// Error classification, e.g. `ASSERTION_FAILED`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

/// Result of a scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub steps: Vec<StepOutcome>,
    pub duration_ms: u64,
}

impl ScenarioReport {
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// True when no step failed or was skipped
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Passed)
    }

    pub fn outcome(&self, step: StepKind) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.number == step.number())
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Runs the ordered steps against a session
pub struct ScenarioRunner<B: Browser> {
    session: ShopSession<B>,
    steps: Vec<StepKind>,
    policy: FailurePolicy,
}

impl<B: Browser> ScenarioRunner<B> {
    /// Runner for the full scenario
    pub fn new(session: ShopSession<B>) -> Self {
        Self {
            session,
            steps: StepKind::ALL.to_vec(),
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run only the first `last` steps
    pub fn until(mut self, last: usize) -> Result<Self> {
        if last == 0 || last > StepKind::ALL.len() {
            return Err(Error::Config(format!(
                "Step number must be between 1 and {}, got {}",
                StepKind::ALL.len(),
                last
            )));
        }
        self.steps = StepKind::ALL[..last].to_vec();
        Ok(self)
    }

    /// Open the shop, run every step, close the browser
    ///
    /// Step failures are recorded in the report. Only a failure to open the
    /// shop is returned as an error.
    pub async fn run(&self) -> Result<ScenarioReport> {
        let name = "QA workshop shop".to_string();
        let started = Instant::now();

        println!("\n{} {}", "Running Scenario:".blue().bold(), name.white().bold());
        println!("  {}", self.session.config().base_url.dimmed());
        let artifacts = self.session.artifacts();
        if artifacts.is_enabled() {
            println!("  {} {}", "Screenshots:".dimmed(), artifacts.dir().display());
        }

        if let Err(e) = self.session.open().await {
            self.close_session().await;
            return Err(e);
        }

        println!("\n{}", "Steps:".cyan());

        let mut outcomes = Vec::with_capacity(self.steps.len());
        let mut halted = false;

        for step in &self.steps {
            if halted {
                println!(
                    "  {} Step {}: {} ... skipped",
                    "-".dimmed(),
                    step.number(),
                    step.id().dimmed()
                );
                outcomes.push(StepOutcome {
                    number: step.number(),
                    id: step.id().to_string(),
                    status: StepStatus::Skipped,
                    duration_ms: 0,
                    error_kind: None,
                    error: None,
                    artifact: None,
                });
                continue;
            }

            let outcome = self.run_step(*step).await;
            if outcome.status == StepStatus::Failed && self.policy == FailurePolicy::Stop {
                halted = true;
            }
            outcomes.push(outcome);
        }

        self.close_session().await;

        let report = ScenarioReport {
            name,
            steps: outcomes,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        print_summary(&report);

        Ok(report)
    }

    async fn run_step(&self, step: StepKind) -> StepOutcome {
        let number = step.number();
        tracing::info!(step = number, id = step.id(), "Starting step");

        let started = Instant::now();
        let result = step.execute(&self.session).await;
        let duration = started.elapsed();

        match &result {
            Ok(()) => println!(
                "  {} Step {}: {} ... {} {}",
                "✓".green(),
                number,
                step.id(),
                "ok".green(),
                format_duration(duration).dimmed()
            ),
            Err(e) => {
                tracing::warn!(step = number, error = %e, "Step failed");
                println!(
                    "  {} Step {}: {} ... {}: {}",
                    "✗".red(),
                    number,
                    step.id(),
                    "FAIL".red(),
                    e
                );
            }
        }

        // Screenshot after every executed step, pass or fail
        let artifact = self.session.capture(number).await;

        let (status, error_kind, error) = match result {
            Ok(()) => (StepStatus::Passed, None, None),
            Err(e) => (
                StepStatus::Failed,
                Some(e.kind().to_string()),
                Some(e.to_string()),
            ),
        };

        StepOutcome {
            number,
            id: step.id().to_string(),
            status,
            duration_ms: duration.as_millis() as u64,
            error_kind,
            error,
            artifact,
        }
    }

    async fn close_session(&self) {
        if let Err(e) = self.session.close().await {
            tracing::warn!(error = %e, "Failed to close browser session");
        }
    }
}

fn format_duration(d: Duration) -> String {
    format!("({:.3}s)", d.as_secs_f64())
}

fn print_summary(report: &ScenarioReport) {
    let ran = report.steps.len() - report.count(StepStatus::Skipped);
    println!(
        "\nRan {} steps in {:.3}s",
        ran,
        report.duration_ms as f64 / 1000.0
    );

    if report.passed() {
        println!("\n{} {}\n", "✓".green().bold(), "OK".green().bold());
    } else {
        println!(
            "\n{} {} (failures={}, skipped={})\n",
            "✗".red().bold(),
            "FAILED".red().bold(),
            report.count(StepStatus::Failed),
            report.count(StepStatus::Skipped)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(number: usize, status: StepStatus) -> StepOutcome {
        StepOutcome {
            number,
            id: format!("test_{}", number),
            status,
            duration_ms: 1,
            error_kind: None,
            error: None,
            artifact: None,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = ScenarioReport {
            name: "shop".to_string(),
            steps: vec![
                outcome(1, StepStatus::Passed),
                outcome(2, StepStatus::Failed),
                outcome(3, StepStatus::Skipped),
            ],
            duration_ms: 3,
        };
        assert_eq!(report.count(StepStatus::Passed), 1);
        assert_eq!(report.count(StepStatus::Failed), 1);
        assert!(!report.passed());
        assert_eq!(report.outcome(StepKind::Login).unwrap().status, StepStatus::Failed);
    }

    #[test]
    fn test_report_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.json");
        let report = ScenarioReport {
            name: "shop".to_string(),
            steps: vec![outcome(1, StepStatus::Passed)],
            duration_ms: 10,
        };
        report.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["steps"][0]["status"], "passed");
        assert!(value["steps"][0].get("error").is_none());
    }
}
