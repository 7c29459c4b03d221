//! The browser session shared by every step
//!
//! Thin helpers over [`Browser`] so that step bodies read as a list of
//! interactions and assertions.

use std::path::PathBuf;

use crate::common::{Error, Result};
use crate::webdriver::{Browser, ElementRef, Locator};

use super::artifacts::ArtifactStore;
use super::config::ScenarioConfig;
use super::wait::{TextMatch, Waiter};

/// One long-lived browser session positioned by the previous steps
pub struct ShopSession<B: Browser> {
    browser: B,
    waiter: Waiter,
    config: ScenarioConfig,
    artifacts: ArtifactStore,
}

impl<B: Browser> ShopSession<B> {
    pub fn new(browser: B, config: ScenarioConfig, waiter: Waiter, artifacts: ArtifactStore) -> Self {
        Self {
            browser,
            waiter,
            config,
            artifacts,
        }
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Load the shop landing page
    pub async fn open(&self) -> Result<()> {
        tracing::info!(url = %self.config.base_url, "Opening shop");
        self.browser.navigate(&self.config.base_url).await?;
        // Headless browsers may refuse to maximize
        if let Err(e) = self.browser.maximize_window().await {
            tracing::warn!(error = %e, "Could not maximize window");
        }
        Ok(())
    }

    /// Find an element without waiting
    pub async fn find(&self, locator: &Locator) -> Result<ElementRef> {
        self.browser.find_element(locator).await
    }

    pub async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        self.browser.find_elements(locator).await
    }

    pub async fn wait_for_element(&self, locator: &Locator) -> Result<ElementRef> {
        self.waiter.until_present(&self.browser, locator).await
    }

    pub async fn wait_for_visible(&self, locator: &Locator) -> Result<ElementRef> {
        self.waiter.until_visible(&self.browser, locator).await
    }

    /// Wait for the element's text to satisfy `expected`
    ///
    /// Expiry is `TimedOut` naming the last text seen, or `NotFound` when
    /// the element never appeared.
    pub async fn wait_for_text(&self, locator: &Locator, expected: TextMatch<'_>) -> Result<ElementRef> {
        self.waiter.until_text(&self.browser, locator, expected).await
    }

    pub async fn text(&self, element: &ElementRef) -> Result<String> {
        self.browser.text(element).await
    }

    pub async fn is_displayed(&self, element: &ElementRef) -> Result<bool> {
        self.browser.is_displayed(element).await
    }

    /// Find and click
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        let element = self.find(locator).await?;
        self.browser.click(&element).await
    }

    /// Clear a field and type into it
    pub async fn fill(&self, element: &ElementRef, value: &str) -> Result<()> {
        self.browser.clear(element).await?;
        self.browser.send_keys(element, value).await
    }

    /// Find a field and append text to whatever it holds
    pub async fn type_into(&self, locator: &Locator, value: &str) -> Result<()> {
        let element = self.find(locator).await?;
        self.browser.send_keys(&element, value).await
    }

    /// Pick the `<option>` of a `<select>` whose text matches exactly
    pub async fn select_by_visible_text(&self, select: &ElementRef, text: &str) -> Result<()> {
        let option = Locator::css("option");
        for candidate in self.browser.find_children(select, &option).await? {
            if self.browser.text(&candidate).await?.trim() == text {
                tracing::debug!(option = text, "Selecting option");
                return self.browser.click(&candidate).await;
            }
        }
        Err(Error::not_found(format!("option with text '{}'", text)))
    }

    pub async fn current_url(&self) -> Result<String> {
        self.browser.current_url().await
    }

    pub async fn back(&self) -> Result<()> {
        self.browser.back().await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.browser.refresh().await
    }

    /// Save the step screenshot; never fails the step
    pub async fn capture(&self, step_number: usize) -> Option<PathBuf> {
        if !self.artifacts.is_enabled() {
            return None;
        }
        match self.browser.screenshot().await {
            Ok(png) => self.artifacts.save(step_number, &png),
            Err(e) => {
                self.artifacts.report_failure(&Error::ArtifactWriteFailed {
                    path: self.artifacts.path_for(step_number).display().to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    pub async fn close(&self) -> Result<()> {
        self.browser.close().await
    }
}

/// Fail unless the observed text equals the expected literal
pub fn assert_text_eq(what: &str, expected: &str, actual: &str) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(Error::assertion(what, expected, actual))
    }
}

/// Fail unless a condition holds
pub fn assert_that(what: &str, condition: bool) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::assertion(what, "true", "false"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_text_eq() {
        assert!(assert_text_eq("message", "User registered", "User registered").is_ok());
        let err = assert_text_eq("message", "User registered", "User already exists").unwrap_err();
        assert!(matches!(err, Error::AssertionFailed { .. }));
    }

    #[test]
    fn test_assert_that() {
        assert!(assert_that("empty order button displayed", true).is_ok());
        assert!(matches!(
            assert_that("empty order button displayed", false),
            Err(Error::AssertionFailed { .. })
        ));
    }
}
