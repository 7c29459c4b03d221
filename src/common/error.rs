//! Error types for the shop scenario runner
//!
//! Step failures are one of NotFound, TimedOut or AssertionFailed.
//! ArtifactWriteFailed is only ever logged. The remaining variants cover the
//! WebDriver transport, the driver process and configuration.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scenario runner
#[derive(Error, Debug)]
pub enum Error {
    // === Scenario Errors ===
    #[error("Element not found: {locator}")]
    NotFound { locator: String },

    #[error("Timed out after {waited_ms} ms waiting for {what}")]
    TimedOut { what: String, waited_ms: u64 },

    #[error("Assertion failed for {what}: expected '{expected}', got '{actual}'")]
    AssertionFailed {
        what: String,
        expected: String,
        actual: String,
    },

    #[error("Failed to write artifact '{path}': {reason}")]
    ArtifactWriteFailed { path: String, reason: String },

    #[error("Scenario failed: {0} step(s) did not pass")]
    ScenarioFailed(usize),

    // === WebDriver Errors ===
    #[error("Element reference is stale")]
    StaleElement,

    #[error("WebDriver command '{command}' failed ({error}): {message}")]
    WebDriverRequestFailed {
        command: String,
        error: String,
        message: String,
    },

    #[error("WebDriver protocol error: {0}")]
    WebDriverProtocol(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No browser session active")]
    SessionNotActive,

    // === Driver Process Errors ===
    #[error("WebDriver endpoint {0} is not reachable and spawning is disabled. Start chromedriver or pass --webdriver-url")]
    DriverNotRunning(String),

    #[error("WebDriver binary '{name}' not found. Searched: {searched}")]
    DriverNotFound { name: String, searched: String },

    #[error("Failed to start WebDriver: timed out waiting for readiness after {0} seconds")]
    DriverSpawnTimeout(u64),

    #[error("WebDriver failed to start: {0}")]
    DriverStartFailed(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a not found error for a locator
    pub fn not_found(locator: impl std::fmt::Display) -> Self {
        Self::NotFound {
            locator: locator.to_string(),
        }
    }

    /// Create a timed out error
    pub fn timed_out(what: impl Into<String>, waited: std::time::Duration) -> Self {
        Self::TimedOut {
            what: what.into(),
            waited_ms: waited.as_millis() as u64,
        }
    }

    /// Create an assertion failure comparing an expected literal to an observation
    pub fn assertion(what: &str, expected: &str, actual: &str) -> Self {
        Self::AssertionFailed {
            what: what.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a WebDriver request failed error
    pub fn webdriver_request_failed(command: &str, error: &str, message: &str) -> Self {
        Self::WebDriverRequestFailed {
            command: command.to_string(),
            error: error.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a driver not found error with search paths
    pub fn driver_not_found<S: AsRef<str>>(name: &str, paths: &[S]) -> Self {
        Self::DriverNotFound {
            name: name.to_string(),
            searched: paths.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", "),
        }
    }

    /// Whether a wait should keep polling after this error
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::StaleElement)
    }

    /// Short classification used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "NOT_FOUND",
            Error::TimedOut { .. } => "TIMED_OUT",
            Error::AssertionFailed { .. } => "ASSERTION_FAILED",
            Error::ArtifactWriteFailed { .. } => "ARTIFACT_WRITE_FAILED",
            Error::ScenarioFailed(_) => "SCENARIO_FAILED",
            Error::StaleElement
            | Error::WebDriverRequestFailed { .. }
            | Error::WebDriverProtocol(_)
            | Error::Http(_)
            | Error::SessionNotActive => "WEBDRIVER",
            Error::DriverNotRunning(_)
            | Error::DriverNotFound { .. }
            | Error::DriverSpawnTimeout(_)
            | Error::DriverStartFailed(_) => "DRIVER",
            Error::Config(_) | Error::ConfigParse(_) => "CONFIG",
            _ => "INTERNAL",
        }
    }
}
