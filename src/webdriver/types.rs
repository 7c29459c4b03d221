//! W3C WebDriver wire types and element locators

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::Error;

/// Key under which W3C WebDriver serializes element references
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// How to find an element on the page
///
/// Test-id locators are preferred over structural selectors wherever the
/// page exposes a `data-testid` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Raw CSS selector
    Css(String),
    /// Value of the `name` attribute
    Name(String),
    /// `tag[data-testid='id']`
    TestId { tag: String, id: String },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn test_id(tag: impl Into<String>, id: impl Into<String>) -> Self {
        Self::TestId {
            tag: tag.into(),
            id: id.into(),
        }
    }

    /// WebDriver location strategy and value
    ///
    /// W3C WebDriver has no "name" strategy, so names become attribute
    /// selectors.
    pub fn strategy(&self) -> (&'static str, String) {
        match self {
            Locator::Css(selector) => ("css selector", selector.clone()),
            Locator::Name(name) => ("css selector", format!("*[name=\"{}\"]", name)),
            Locator::TestId { tag, id } => ("css selector", format!("{}[data-testid='{}']", tag, id)),
        }
    }

    /// Request body for the find element commands
    pub fn to_wire(&self) -> Value {
        let (using, value) = self.strategy();
        serde_json::json!({ "using": using, "value": value })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Name(name) => write!(f, "name={}", name),
            other => f.write_str(&other.strategy().1),
        }
    }
}

/// Opaque reference to an element in the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Element reference as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireElement {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub id: String,
}

impl From<WireElement> for ElementRef {
    fn from(e: WireElement) -> Self {
        ElementRef(e.id)
    }
}

/// Every WebDriver response wraps its payload in `value`
#[derive(Debug, Deserialize)]
pub struct ValueResponse<T> {
    pub value: T,
}

/// Error payload of a failed command
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorValue {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// Payload of `POST /session`
#[derive(Debug, Deserialize)]
pub struct NewSessionValue {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Value,
}

/// Payload of `GET /status`
#[derive(Debug, Deserialize)]
pub struct StatusValue {
    pub ready: bool,
    #[serde(default)]
    pub message: String,
}

impl ErrorValue {
    /// Map a wire error code to our error taxonomy
    pub fn into_error(self, command: &str) -> Error {
        match self.error.as_str() {
            "no such element" => Error::NotFound {
                locator: self.message,
            },
            "stale element reference" => Error::StaleElement,
            "timeout" | "script timeout" => Error::TimedOut {
                what: format!("{} ({})", command, self.message),
                waited_ms: 0,
            },
            "invalid session id" => Error::SessionNotActive,
            _ => Error::webdriver_request_failed(command, &self.error, &self.message),
        }
    }
}
