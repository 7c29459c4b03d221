//! W3C WebDriver client
//!
//! This module implements the small subset of the WebDriver protocol the
//! shop scenario needs, behind the [`Browser`] trait the runner drives.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::common::Result;

pub use client::WebDriverClient;
pub use types::{ElementRef, Locator};

/// A live browser session
///
/// Lookups that find nothing fail with `Error::NotFound`; they never wait.
/// Waiting is layered on top by `scenario::wait`.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Load a URL in the current tab
    async fn navigate(&self, url: &str) -> Result<()>;

    /// URL of the current page
    async fn current_url(&self) -> Result<String>;

    /// Go back one entry in history
    async fn back(&self) -> Result<()>;

    /// Reload the current page
    async fn refresh(&self) -> Result<()>;

    async fn maximize_window(&self) -> Result<()>;

    /// First element matching the locator
    async fn find_element(&self, locator: &Locator) -> Result<ElementRef>;

    /// All elements matching the locator, possibly none
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementRef>>;

    /// First descendant of `parent` matching the locator
    async fn find_child(&self, parent: &ElementRef, locator: &Locator) -> Result<ElementRef>;

    /// All descendants of `parent` matching the locator
    async fn find_children(&self, parent: &ElementRef, locator: &Locator)
        -> Result<Vec<ElementRef>>;

    /// Rendered text of an element
    async fn text(&self, element: &ElementRef) -> Result<String>;

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool>;

    async fn click(&self, element: &ElementRef) -> Result<()>;

    async fn clear(&self, element: &ElementRef) -> Result<()>;

    /// Type text into an element
    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<()>;

    /// PNG screenshot of the current viewport
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// End the session; later calls are no-ops
    async fn close(&self) -> Result<()>;
}
