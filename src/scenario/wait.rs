//! Bounded polling for asynchronous page updates
//!
//! The shop re-renders after every action without telling anyone, so the
//! only way to synchronize is to look again until the condition holds or
//! the deadline passes.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::common::config::Timeouts;
use crate::common::{Error, Result};
use crate::webdriver::{Browser, ElementRef, Locator};

/// Default upper bound for a single wait
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default delay between probes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Condition on the rendered text of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch<'a> {
    Contains(&'a str),
    Equals(&'a str),
    /// Equal once both sides are lower-cased
    EqualsIgnoreCase(&'a str),
}

impl TextMatch<'_> {
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            TextMatch::Contains(text) => actual.contains(*text),
            TextMatch::Equals(text) => actual == *text,
            TextMatch::EqualsIgnoreCase(text) => actual.to_lowercase() == text.to_lowercase(),
        }
    }
}

impl fmt::Display for TextMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatch::Contains(text) => write!(f, "text containing '{}'", text),
            TextMatch::Equals(text) => write!(f, "text '{}'", text),
            TextMatch::EqualsIgnoreCase(text) => write!(f, "text '{}' (any case)", text),
        }
    }
}

/// Polls a condition at a fixed interval up to a timeout
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    timeout: Duration,
    poll_interval: Duration,
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

impl Waiter {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            // A zero interval would spin
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    pub fn from_timeouts(timeouts: &Timeouts) -> Self {
        Self::new(
            Duration::from_secs(timeouts.wait_secs),
            Duration::from_millis(timeouts.poll_interval_ms),
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Run `probe` until it yields a value or the timeout expires
    ///
    /// `Ok(None)`, `NotFound` and `StaleElement` mean "not yet". Any other
    /// error ends the wait immediately. Expiry yields `TimedOut`, reported
    /// no earlier than the timeout and at most one interval after it.
    pub async fn poll_until<T, F, Fut>(&self, what: &str, mut probe: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let start = Instant::now();
        // A timeout past the end of the clock never expires
        let deadline = start.checked_add(self.timeout);
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match probe().await {
                Ok(Some(value)) => {
                    tracing::trace!(what, attempts, "Wait satisfied");
                    return Ok(value);
                }
                Ok(None) => {}
                Err(e) if e.is_transient() => {
                    tracing::trace!(what, attempts, error = %e, "Not yet");
                }
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            let pause = match deadline {
                Some(deadline) if now >= deadline => {
                    tracing::debug!(what, attempts, "Wait expired");
                    return Err(Error::timed_out(what, now - start));
                }
                Some(deadline) => self.poll_interval.min(deadline - now),
                None => self.poll_interval,
            };
            tokio::time::sleep(pause).await;
        }
    }

    /// Wait until an element matching `locator` exists
    ///
    /// Expiry is reported as `NotFound`.
    pub async fn until_present<B>(&self, browser: &B, locator: &Locator) -> Result<ElementRef>
    where
        B: Browser + ?Sized,
    {
        let what = format!("presence of {}", locator);
        let result = self
            .poll_until(&what, || async { browser.find_element(locator).await.map(Some) })
            .await;

        match result {
            Err(Error::TimedOut { waited_ms, .. }) => Err(Error::NotFound {
                locator: format!("{} (waited {} ms)", locator, waited_ms),
            }),
            other => other,
        }
    }

    /// Wait until an element matching `locator` exists and is displayed
    pub async fn until_visible<B>(&self, browser: &B, locator: &Locator) -> Result<ElementRef>
    where
        B: Browser + ?Sized,
    {
        let seen = AtomicBool::new(false);
        let what = format!("visibility of {}", locator);

        let result = self
            .poll_until(&what, || async {
                let element = browser.find_element(locator).await?;
                seen.store(true, Ordering::SeqCst);
                Ok(browser.is_displayed(&element).await?.then_some(element))
            })
            .await;

        self.classify_expiry(result, &seen, locator)
    }

    /// Wait until the text of the element matching `locator` satisfies `expected`
    pub async fn until_text<B>(
        &self,
        browser: &B,
        locator: &Locator,
        expected: TextMatch<'_>,
    ) -> Result<ElementRef>
    where
        B: Browser + ?Sized,
    {
        let seen = AtomicBool::new(false);
        let last_text = Mutex::new(String::new());
        let what = format!("{} in {}", expected, locator);

        let result = self
            .poll_until(&what, || async {
                let element = browser.find_element(locator).await?;
                seen.store(true, Ordering::SeqCst);
                let actual = browser.text(&element).await?;
                let matched = expected.matches(&actual);
                if let Ok(mut last) = last_text.lock() {
                    *last = actual;
                }
                Ok(matched.then_some(element))
            })
            .await;

        match result {
            Err(Error::TimedOut { what, waited_ms }) if seen.load(Ordering::SeqCst) => {
                let last = last_text.lock().map(|s| s.clone()).unwrap_or_default();
                Err(Error::TimedOut {
                    what: format!("{} (last text '{}')", what, last),
                    waited_ms,
                })
            }
            other => self.classify_expiry(other, &seen, locator),
        }
    }

    /// An element that never showed up is NotFound; one that showed up
    /// without meeting the condition is TimedOut
    fn classify_expiry(
        &self,
        result: Result<ElementRef>,
        seen: &AtomicBool,
        locator: &Locator,
    ) -> Result<ElementRef> {
        match result {
            Err(Error::TimedOut { waited_ms, .. }) if !seen.load(Ordering::SeqCst) => {
                Err(Error::NotFound {
                    locator: format!("{} (waited {} ms)", locator, waited_ms),
                })
            }
            other => other,
        }
    }
}
