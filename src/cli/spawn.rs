//! WebDriver process spawning
//!
//! Reuses a driver that is already listening on the configured URL, and
//! otherwise starts chromedriver on that URL's port.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::Instant;

use crate::common::config::WebDriverConfig;
use crate::common::{Error, Result};
use crate::webdriver::client;

/// Delay between readiness probes of a freshly spawned driver
const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A driver process we started; killed when dropped
pub struct DriverProcess {
    child: Child,
}

impl DriverProcess {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Stop the driver and wait for it to exit
    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!(error = %e, "Failed to stop WebDriver process");
        } else {
            tracing::debug!("WebDriver process stopped");
        }
    }
}

/// Ensure a WebDriver endpoint is ready, spawning one if necessary
///
/// Returns the process handle when this call started the driver.
pub async fn ensure_driver_running(config: &WebDriverConfig) -> Result<Option<DriverProcess>> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    if is_ready(&http, &config.url).await {
        tracing::debug!(url = %config.url, "WebDriver already running");
        return Ok(None);
    }

    if !config.spawn {
        return Err(Error::DriverNotRunning(config.url.clone()));
    }

    let process = spawn_driver(config, &http).await?;
    Ok(Some(process))
}

async fn is_ready(http: &reqwest::Client, url: &str) -> bool {
    matches!(client::status(http, url).await, Ok(status) if status.ready)
}

/// Port the driver should listen on, taken from the endpoint URL
pub fn port_from_url(url: &str) -> Result<u16> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| Error::Config(format!("Invalid WebDriver URL '{}': {}", url, e)))?;
    parsed
        .port_or_known_default()
        .ok_or_else(|| Error::Config(format!("WebDriver URL '{}' has no port", url)))
}

fn locate_driver(config: &WebDriverConfig) -> Result<PathBuf> {
    if let Some(path) = &config.driver_path {
        if path.exists() {
            return Ok(path.clone());
        }
        return Err(Error::driver_not_found(
            &config.driver,
            &[path.display().to_string()],
        ));
    }

    which::which(&config.driver).map_err(|_| Error::driver_not_found(&config.driver, &["PATH"]))
}

/// When to give up on a starting driver; `None` if the timeout is beyond the clock
fn startup_deadline(timeout_secs: u64) -> Option<Instant> {
    Instant::now().checked_add(Duration::from_secs(timeout_secs))
}

async fn spawn_driver(config: &WebDriverConfig, http: &reqwest::Client) -> Result<DriverProcess> {
    let port = port_from_url(&config.url)?;
    let path = locate_driver(config)?;

    tracing::info!(driver = %path.display(), port, "Spawning WebDriver");

    let child = Command::new(&path)
        .arg(format!("--port={}", port))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            Error::DriverStartFailed(format!("Failed to start {}: {}", path.display(), e))
        })?;

    let mut process = DriverProcess { child };

    // Wait for the driver to accept sessions
    let deadline = startup_deadline(config.startup_timeout_secs);

    loop {
        if let Some(status) = process.child.try_wait()? {
            return Err(Error::DriverStartFailed(format!(
                "{} exited during startup with {}",
                path.display(),
                status
            )));
        }

        if is_ready(http, &config.url).await {
            tracing::debug!(pid = ?process.id(), "WebDriver started successfully");
            return Ok(process);
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Error::DriverSpawnTimeout(config.startup_timeout_secs));
        }

        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}
