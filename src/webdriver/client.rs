//! WebDriver HTTP client
//!
//! Speaks the W3C WebDriver protocol to chromedriver (or any compatible
//! endpoint). One client owns exactly one browser session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::common::config::WebDriverConfig;
use crate::common::{join_url, Error, Result};

use super::types::*;
use super::Browser;

/// WebDriver client bound to a single session
pub struct WebDriverClient {
    http: reqwest::Client,
    /// Endpoint base URL, e.g. `http://localhost:9515`
    base_url: String,
    session_id: String,
    closed: AtomicBool,
}

impl WebDriverClient {
    /// Create a new browser session on the endpoint
    pub async fn connect(config: &WebDriverConfig, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;

        let body = new_session_body(config);
        tracing::debug!(url = %config.url, "Creating WebDriver session");

        let value: NewSessionValue = send(
            &http,
            Method::POST,
            &join_url(&config.url, "session"),
            Some(body),
            "new session",
        )
        .await?;

        tracing::info!(session = %value.session_id, "Browser session started");

        Ok(Self {
            http,
            base_url: config.url.clone(),
            session_id: value.session_id,
            closed: AtomicBool::new(false),
        })
    }

    fn session_url(&self, suffix: &str) -> Result<String> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::SessionNotActive);
        }
        let path = if suffix.is_empty() {
            format!("session/{}", self.session_id)
        } else {
            format!("session/{}/{}", self.session_id, suffix)
        };
        Ok(join_url(&self.base_url, &path))
    }

    async fn get<T: DeserializeOwned>(&self, suffix: &str, command: &str) -> Result<T> {
        let url = self.session_url(suffix)?;
        send(&self.http, Method::GET, &url, None, command).await
    }

    async fn post<T: DeserializeOwned>(&self, suffix: &str, body: Value, command: &str) -> Result<T> {
        let url = self.session_url(suffix)?;
        send(&self.http, Method::POST, &url, Some(body), command).await
    }

    /// POST a command whose result value is null
    async fn post_void(&self, suffix: &str, body: Value, command: &str) -> Result<()> {
        let _: Value = self.post(suffix, body, command).await?;
        Ok(())
    }

    async fn find(&self, suffix: &str, locator: &Locator) -> Result<ElementRef> {
        let found: Result<WireElement> = self.post(suffix, locator.to_wire(), "find element").await;
        match found {
            Ok(element) => Ok(element.into()),
            Err(Error::NotFound { .. }) => Err(Error::not_found(locator)),
            Err(e) => Err(e),
        }
    }

    async fn find_all(&self, suffix: &str, locator: &Locator) -> Result<Vec<ElementRef>> {
        let found: Vec<WireElement> = self
            .post(suffix, locator.to_wire(), "find elements")
            .await?;
        Ok(found.into_iter().map(ElementRef::from).collect())
    }
}

/// Query the readiness of an endpoint without a session
pub async fn status(http: &reqwest::Client, base_url: &str) -> Result<StatusValue> {
    send(http, Method::GET, &join_url(base_url, "status"), None, "status").await
}

/// Capabilities requested for a new Chrome session
pub fn new_session_body(config: &WebDriverConfig) -> Value {
    let mut args: Vec<String> = Vec::new();
    if config.headless {
        args.push("--headless=new".to_string());
        args.push("--window-size=1920,1080".to_string());
    }
    args.extend(config.browser_args.iter().cloned());

    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args }
            }
        }
    })
}

async fn send<T: DeserializeOwned>(
    http: &reqwest::Client,
    method: Method,
    url: &str,
    body: Option<Value>,
    command: &str,
) -> Result<T> {
    tracing::debug!("WebDriver >>> {} {} {}", method, url, command);

    let request = match body {
        Some(body) => http.request(method, url).json(&body),
        None => http.request(method, url),
    };

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    tracing::trace!("WebDriver <<< {} {}", status, text);

    parse_response(status, &text, command)
}

/// Decode a response body, mapping wire errors to our error type
pub fn parse_response<T: DeserializeOwned>(status: StatusCode, body: &str, command: &str) -> Result<T> {
    if !status.is_success() {
        return match serde_json::from_str::<ValueResponse<ErrorValue>>(body) {
            Ok(resp) => Err(resp.value.into_error(command)),
            Err(_) => Err(Error::WebDriverProtocol(format!(
                "'{}' returned HTTP {} with unparseable body: {}",
                command, status, body
            ))),
        };
    }

    serde_json::from_str::<ValueResponse<T>>(body)
        .map(|resp| resp.value)
        .map_err(|e| Error::WebDriverProtocol(format!("Failed to parse {} response: {}", command, e)))
}

#[async_trait]
impl Browser for WebDriverClient {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.post_void("url", json!({ "url": url }), "navigate").await
    }

    async fn current_url(&self) -> Result<String> {
        self.get("url", "get current url").await
    }

    async fn back(&self) -> Result<()> {
        self.post_void("back", json!({}), "back").await
    }

    async fn refresh(&self) -> Result<()> {
        self.post_void("refresh", json!({}), "refresh").await
    }

    async fn maximize_window(&self) -> Result<()> {
        // Returns the new window rect, which we don't need
        self.post_void("window/maximize", json!({}), "maximize window")
            .await
    }

    async fn find_element(&self, locator: &Locator) -> Result<ElementRef> {
        self.find("element", locator).await
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        self.find_all("elements", locator).await
    }

    async fn find_child(&self, parent: &ElementRef, locator: &Locator) -> Result<ElementRef> {
        self.find(&format!("element/{}/element", parent.id()), locator)
            .await
    }

    async fn find_children(
        &self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>> {
        self.find_all(&format!("element/{}/elements", parent.id()), locator)
            .await
    }

    async fn text(&self, element: &ElementRef) -> Result<String> {
        self.get(&format!("element/{}/text", element.id()), "get element text")
            .await
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool> {
        self.get(
            &format!("element/{}/displayed", element.id()),
            "is element displayed",
        )
        .await
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        self.post_void(&format!("element/{}/click", element.id()), json!({}), "click")
            .await
    }

    async fn clear(&self, element: &ElementRef) -> Result<()> {
        self.post_void(&format!("element/{}/clear", element.id()), json!({}), "clear")
            .await
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<()> {
        self.post_void(
            &format!("element/{}/value", element.id()),
            json!({ "text": text }),
            "send keys",
        )
        .await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let encoded: String = self.get("screenshot", "take screenshot").await?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| Error::WebDriverProtocol(format!("Invalid screenshot data: {}", e)))
    }

    async fn close(&self) -> Result<()> {
        let url = match self.session_url("") {
            Ok(url) => url,
            Err(Error::SessionNotActive) => return Ok(()),
            Err(e) => return Err(e),
        };
        self.closed.store(true, Ordering::SeqCst);

        let _: Value = send(&self.http, Method::DELETE, &url, None, "delete session").await?;
        tracing::info!(session = %self.session_id, "Browser session closed");
        Ok(())
    }
}
