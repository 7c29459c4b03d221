//! CLI command handling
//!
//! Dispatches CLI commands and formats their output.

mod spawn;

pub use spawn::{ensure_driver_running, DriverProcess};

use std::time::Duration;

use colored::Colorize;

use crate::commands::{Commands, RunArgs};
use crate::common::config::Config;
use crate::common::{paths, Error, Result};
use crate::scenario::{
    ArtifactStore, ScenarioConfig, ScenarioRunner, ShopSession, StepKind, StepStatus, Waiter,
};
use crate::webdriver::WebDriverClient;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Run(args) => run(args, config).await,

        Commands::Steps => {
            for step in StepKind::ALL {
                println!(
                    "{:>2}. {}\n    {}",
                    step.number(),
                    step.id().bold(),
                    step.description().dimmed()
                );
            }
            Ok(())
        }

        Commands::Config { path, init } => {
            if init {
                init_config(&config)
            } else if path {
                match paths::config_path() {
                    Some(p) => println!("{}", p.display()),
                    None => println!("No configuration directory on this platform"),
                }
                Ok(())
            } else {
                print!("{}", config.to_toml()?);
                Ok(())
            }
        }
    }
}

fn init_config(config: &Config) -> Result<()> {
    let dir = paths::ensure_config_dir()?
        .ok_or_else(|| Error::Config("No configuration directory on this platform".into()))?;
    let path = dir.join(paths::CONFIG_FILE_NAME);

    if path.exists() {
        println!("Configuration already exists at {}", path.display());
        return Ok(());
    }

    std::fs::write(&path, config.to_toml()?)?;
    tracing::info!(path = %path.display(), "Wrote configuration file");
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}

async fn run(args: RunArgs, mut config: Config) -> Result<()> {
    args.apply(&mut config);

    if let Some(last) = args.until {
        if StepKind::from_number(last).is_none() {
            return Err(Error::Config(format!(
                "--until must be between 1 and {}, got {}",
                StepKind::ALL.len(),
                last
            )));
        }
    }

    let driver = ensure_driver_running(&config.webdriver).await?;

    let request_timeout = Duration::from_secs(config.timeouts.request_secs);
    let browser = WebDriverClient::connect(&config.webdriver, request_timeout).await?;

    let session = ShopSession::new(
        browser,
        ScenarioConfig::from_config(&config),
        Waiter::from_timeouts(&config.timeouts),
        ArtifactStore::from_config(&config.artifacts),
    );

    let mut runner = ScenarioRunner::new(session).with_policy(config.run.on_failure);
    if let Some(last) = args.until {
        runner = runner.until(last)?;
    }

    let report = runner.run().await;

    if let Some(driver) = driver {
        driver.shutdown().await;
    }

    let report = report?;

    if let Some(path) = &args.report {
        report.write_json(path)?;
        println!("Report written to {}", path.display());
    }

    if report.passed() {
        Ok(())
    } else {
        Err(Error::ScenarioFailed(
            report.count(StepStatus::Failed) + report.count(StepStatus::Skipped),
        ))
    }
}
