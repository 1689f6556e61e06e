//! Client for the contact-form relay.
//!
//! The relay is an opaque HTTP endpoint: it accepts the form fields as JSON and
//! answers with any 2xx status on success.  Nothing in the response body is
//! relied upon.

use std::time::Duration;

use reqwest::Client as ReqwestClient;
use url::Url;

use crate::client::{DEFAULT_TIMEOUT, build_http_client, json_headers, process_error_response};
use crate::error::Result;
use crate::observability::{CONTACT_ERRORS, CONTACT_SUBMISSIONS};
use crate::types::ContactSubmission;

/// Client for the contact-form relay.
#[derive(Debug, Clone)]
pub struct ContactRelay {
    client: ReqwestClient,
    endpoint: Url,
}

impl ContactRelay {
    /// Create a relay client for `endpoint` with the default timeout.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_options(endpoint, None)
    }

    /// Create a relay client with custom settings.
    pub fn with_options(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        let client = build_http_client(timeout.unwrap_or(DEFAULT_TIMEOUT))?;
        Ok(Self { client, endpoint })
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Validate `submission` and deliver it to the relay.
    ///
    /// Nothing is sent if validation fails.
    pub async fn submit(&self, submission: &ContactSubmission) -> Result<()> {
        submission.validate()?;
        CONTACT_SUBMISSIONS.click();
        let result = self.submit_inner(submission).await;
        match &result {
            Ok(()) => tracing::info!(endpoint = %self.endpoint, "contact form delivered"),
            Err(err) => {
                CONTACT_ERRORS.click();
                tracing::warn!(
                    endpoint = %self.endpoint,
                    error = %err,
                    "contact form not delivered"
                );
            }
        }
        result
    }

    async fn submit_inner(&self, submission: &ContactSubmission) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(json_headers())
            .json(submission)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(process_error_response(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_submission_is_not_sent() {
        // Nothing listens here; validation must fail before any connection attempt.
        let relay = ContactRelay::new("http://127.0.0.1:9/contact").unwrap();
        let submission = ContactSubmission::new("Ada", "not-an-email", "hi");
        let err = relay.submit(&submission).await.unwrap_err();
        assert!(err.is_validation());
    }
}
