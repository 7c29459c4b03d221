//! Shop Scenario - end-to-end browser checks for the QA workshop shop
//!
//! This library drives a browser through the W3C WebDriver protocol and
//! runs one ordered, stateful scenario against the sample shop.

pub mod cli;
pub mod commands;
pub mod common;
pub mod scenario;
pub mod webdriver;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use webdriver::{Browser, ElementRef, Locator};
