//! CLI command definitions
//!
//! Defines the clap commands for the scenario runner.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::common::config::{Config, FailurePolicy};

#[derive(Subcommand)]
pub enum Commands {
    /// Run the shop scenario against a browser
    Run(RunArgs),

    /// List the scenario steps in execution order
    Steps,

    /// Show the effective configuration
    Config {
        /// Print the configuration file path instead of its contents
        #[arg(long)]
        path: bool,

        /// Write the effective configuration to the config file if none exists
        #[arg(long, conflicts_with = "path")]
        init: bool,
    },
}

/// Overrides for a single run; anything left unset comes from the config file
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// WebDriver endpoint (default: http://localhost:9515)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Shop landing page
    #[arg(long)]
    pub base_url: Option<String>,

    /// Account to register, log in with and delete
    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Directory for step screenshots (default: Desktop)
    #[arg(long)]
    pub artifact_dir: Option<PathBuf>,

    /// Do not save screenshots
    #[arg(long)]
    pub no_artifacts: bool,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Upper bound in seconds for each element wait
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Delay in milliseconds between wait probes
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Skip the remaining steps after the first failure
    #[arg(long)]
    pub stop_on_failure: bool,

    /// Run steps 1 through N only
    #[arg(long, value_name = "N")]
    pub until: Option<usize>,

    /// Write a JSON report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Fail instead of starting chromedriver when the endpoint is down
    #[arg(long)]
    pub no_spawn: bool,
}

impl RunArgs {
    /// Layer the flags over the file configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.webdriver_url {
            config.webdriver.url = url.clone();
        }
        if let Some(url) = &self.base_url {
            config.shop.base_url = url.clone();
        }
        if let Some(username) = &self.username {
            config.credentials.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.credentials.password = password.clone();
        }
        if let Some(dir) = &self.artifact_dir {
            config.artifacts.dir = Some(dir.clone());
        }
        if self.no_artifacts {
            config.artifacts.enabled = false;
        }
        if self.headless {
            config.webdriver.headless = true;
        }
        if let Some(secs) = self.timeout {
            config.timeouts.wait_secs = secs;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.timeouts.poll_interval_ms = ms;
        }
        if self.stop_on_failure {
            config.run.on_failure = FailurePolicy::Stop;
        }
        if self.no_spawn {
            config.webdriver.spawn = false;
        }
    }
}
