//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// WebDriver endpoint and driver process settings
    #[serde(default)]
    pub webdriver: WebDriverConfig,

    /// Shop application under test
    #[serde(default)]
    pub shop: ShopConfig,

    /// Account used throughout the scenario
    #[serde(default)]
    pub credentials: Credentials,

    /// Inventory item created and edited by the scenario
    #[serde(default)]
    pub item: ItemConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Screenshot settings
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Run policy
    #[serde(default)]
    pub run: RunConfig,
}

/// WebDriver endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebDriverConfig {
    /// Base URL of the W3C WebDriver endpoint
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    /// Driver binary name searched on PATH when spawning
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Explicit driver binary path (skips the PATH search)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_path: Option<PathBuf>,

    /// Spawn the driver when the endpoint is not reachable
    #[serde(default = "default_true")]
    pub spawn: bool,

    /// Run the browser without a visible window
    #[serde(default)]
    pub headless: bool,

    /// Extra browser command-line arguments
    #[serde(default)]
    pub browser_args: Vec<String>,

    /// How long to wait for a spawned driver to report ready
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_secs: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            driver: default_driver(),
            driver_path: None,
            spawn: true,
            headless: false,
            browser_args: Vec::new(),
            startup_timeout_secs: default_startup_timeout(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}
fn default_driver() -> String {
    "chromedriver".to_string()
}
fn default_true() -> bool {
    true
}
fn default_startup_timeout() -> u64 {
    10
}

/// Shop application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopConfig {
    /// Landing page of the shop, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://qaworkshop.netlify.app".to_string()
}

/// Scenario account
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
        }
    }
}

fn default_username() -> String {
    "teodorpetrovski".to_string()
}
fn default_password() -> String {
    "12345678".to_string()
}

/// Inventory item data
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemConfig {
    /// Name of the item created after clearing the inventory
    #[serde(default = "default_item_name")]
    pub name: String,

    /// Price typed into the new item form
    #[serde(default = "default_item_price")]
    pub price: String,

    /// Description typed into the new item form
    #[serde(default = "default_item_description")]
    pub description: String,

    /// Non-numeric text appended to the price to force a NaN render
    #[serde(default = "default_invalid_price")]
    pub invalid_price: String,

    /// Card title of the sample item added to the cart
    #[serde(default = "default_sample_label")]
    pub sample_label: String,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            name: default_item_name(),
            price: default_item_price(),
            description: default_item_description(),
            invalid_price: default_invalid_price(),
            sample_label: default_sample_label(),
        }
    }
}

fn default_item_name() -> String {
    "Infinum".to_string()
}
fn default_item_price() -> String {
    "666".to_string()
}
fn default_item_description() -> String {
    "Python is so hard compared to JAVA !!! Cheers to brate Neven :)".to_string()
}
fn default_invalid_price() -> String {
    "price".to_string()
}
fn default_sample_label() -> String {
    "Beetle\n$32.00".to_string()
}

/// Timeout settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Timeouts {
    /// Upper bound for every element wait
    #[serde(default = "default_wait")]
    pub wait_secs: u64,

    /// Delay between wait probes
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Upper bound for a single WebDriver HTTP request
    #[serde(default = "default_request")]
    pub request_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            wait_secs: default_wait(),
            poll_interval_ms: default_poll_interval(),
            request_secs: default_request(),
        }
    }
}

fn default_wait() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    500
}
fn default_request() -> u64 {
    30
}

/// Screenshot settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactsConfig {
    /// Save a screenshot after each step
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Output directory (defaults to the Desktop)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

/// What the runner does after a failed step
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep running the remaining steps
    #[default]
    Continue,
    /// Skip every step after the first failure
    Stop,
}

/// Run policy
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RunConfig {
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Internal(e.to_string()))
    }
}
