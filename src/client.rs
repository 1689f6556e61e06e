use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{GATEWAY_ERRORS, GATEWAY_REQUEST_DURATION, GATEWAY_REQUESTS};
use crate::types::{ChatReply, ChatRequest};

/// Endpoint used when no chat gateway is configured.
pub const DEFAULT_CHAT_URL: &str = "http://127.0.0.1:8000/chat";

/// Transport timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reply shown in place of an answer whenever the gateway call fails.
pub const FALLBACK_ANSWER: &str = "Sorry, an error occurred. Please try again later.";

/// Something that can answer a chat question.
///
/// [`Gateway`] is the production implementation; the chat controller only
/// depends on this trait.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Ask `request.question` in the context of `request.chat_history` and
    /// return the answer text verbatim.
    async fn ask(&self, request: &ChatRequest) -> Result<String>;
}

#[async_trait::async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    async fn ask(&self, request: &ChatRequest) -> Result<String> {
        self.as_ref().ask(request).await
    }
}

/// Client for the remote chat gateway.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: ReqwestClient,
    endpoint: Url,
    timeout: Duration,
}

impl Gateway {
    /// Create a gateway client for `endpoint` with the default timeout.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_options(endpoint, None)
    }

    /// Create a gateway client with custom settings.
    pub fn with_options(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = build_http_client(timeout)?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The configured transport timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POST `request` to the gateway and return the answer.
    pub async fn send(&self, request: &ChatRequest) -> Result<String> {
        GATEWAY_REQUESTS.click();
        let start = Instant::now();
        let result = self.send_inner(request).await;
        GATEWAY_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            GATEWAY_ERRORS.click();
            tracing::debug!(
                session_id = %request.session_id,
                error = %err,
                "chat gateway request failed"
            );
        }
        result
    }

    async fn send_inner(&self, request: &ChatRequest) -> Result<String> {
        tracing::debug!(
            session_id = %request.session_id,
            history_len = request.chat_history.len(),
            endpoint = %self.endpoint,
            "sending question to chat gateway"
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(json_headers())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(process_error_response(response).await);
        }

        let body = response.text().await?;
        let reply: ChatReply = serde_json::from_str(&body).map_err(|e| {
            Error::serialization(
                format!("Failed to parse chat reply: {e}"),
                Some(Box::new(e)),
            )
        })?;
        Ok(reply.answer)
    }
}

#[async_trait::async_trait]
impl ChatBackend for Gateway {
    async fn ask(&self, request: &ChatRequest) -> Result<String> {
        self.send(request).await
    }
}

/// Collapse a gateway result into text that can always be shown as a bot
/// reply.  The flag is true when `fallback` was used.
///
/// A blank answer counts as a malformed reply.
pub fn reply_or_fallback(result: Result<String>, fallback: &str) -> (String, bool) {
    match result {
        Ok(answer) if !answer.trim().is_empty() => (answer, false),
        Ok(_) => {
            tracing::warn!("chat gateway returned a blank answer; replying with fallback");
            (fallback.to_string(), true)
        }
        Err(err) => {
            tracing::warn!(error = %err, "chat gateway failed; replying with fallback");
            (fallback.to_string(), true)
        }
    }
}

/// Build the HTTP client shared by the outbound collaborators.
pub(crate) fn build_http_client(timeout: Duration) -> Result<ReqwestClient> {
    ReqwestClient::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {e}"),
                Some(Box::new(e)),
            )
        })
}

/// Headers for JSON request/response exchanges.
pub(crate) fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Turn a non-success response into an error, keeping whatever message the
/// body carried.
pub(crate) async fn process_error_response(response: Response) -> Error {
    let status_code = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.parse::<u64>().ok());

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            return Error::http_client(
                format!("Failed to read error response: {e}"),
                Some(Box::new(e)),
            );
        }
    };

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .or_else(|| value.get("detail"))
                .or_else(|| value.get("message"))
                .and_then(|v| v.as_str().map(String::from))
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {status_code}")
            } else {
                body
            }
        });

    Error::from_status(status_code, message, retry_after)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_creation() {
        let gateway = Gateway::new(DEFAULT_CHAT_URL).unwrap();
        assert_eq!(gateway.endpoint().as_str(), DEFAULT_CHAT_URL);
        assert_eq!(gateway.timeout(), DEFAULT_TIMEOUT);

        let gateway = Gateway::with_options(
            "https://chat.example.org/api/chat",
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        assert_eq!(gateway.endpoint().host_str(), Some("chat.example.org"));
        assert_eq!(gateway.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn gateway_rejects_bad_url() {
        match Gateway::new("not a url") {
            Err(Error::Url { .. }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn fallback_on_error() {
        let (text, failed) = reply_or_fallback(
            Err(Error::connection("refused", None)),
            FALLBACK_ANSWER,
        );
        assert!(failed);
        assert_eq!(text, FALLBACK_ANSWER);

        let (text, failed) = reply_or_fallback(Ok("**Hi**".to_string()), FALLBACK_ANSWER);
        assert!(!failed);
        assert_eq!(text, "**Hi**");

        let (text, failed) = reply_or_fallback(Ok(String::new()), FALLBACK_ANSWER);
        assert!(failed);
        assert_eq!(text, FALLBACK_ANSWER);
    }
}
