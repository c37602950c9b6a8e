//! Uniform JSON-in/JSON-out API helper
//!
//! Every backend call goes through this client. Transport failures and
//! non-JSON bodies collapse into a `None` sentinel rather than an error, so
//! callers treat "no result" and "server returned an error body" the same
//! way; the backend reports command failures inside a 200 response as
//! `{ok: false, msg}` anyway.

use serde_json::Value;

use crate::status::StatusSnapshot;

/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and decode the body as JSON. `None` on any failure.
    pub async fn get_json(&self, path: &str) -> Option<Value> {
        let url = format!("{}{path}", self.base_url);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(%url, %error, "GET failed");
                return None;
            }
        };
        match response.json::<Value>().await {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::debug!(%url, %error, "non-JSON response body");
                None
            }
        }
    }

    /// POST a JSON body to `path` and decode the response. `None` on any
    /// failure. Views use this for their feature endpoints
    /// (`/api/wifi/scan`, `/api/wifi/attack`, ...).
    pub async fn post_json(&self, path: &str, body: &Value) -> Option<Value> {
        let url = format!("{}{path}", self.base_url);
        let response = match self.http.post(&url).json(body).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(%url, %error, "POST failed");
                return None;
            }
        };
        match response.json::<Value>().await {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::debug!(%url, %error, "non-JSON response body");
                None
            }
        }
    }

    /// Fetch and decode the global status snapshot.
    pub async fn fetch_status(&self) -> Option<StatusSnapshot> {
        let value = self.get_json("/api/status").await?;
        match serde_json::from_value(value) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                tracing::debug!(%error, "status payload failed to decode");
                None
            }
        }
    }
}
