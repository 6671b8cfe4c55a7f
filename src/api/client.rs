//! HTTP transport shared by the fetcher and the download resolver

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use url::Url;

use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::signing::{CredentialsProvider, SigningParams, sign};

use super::response::parse_body;

/// How outgoing requests are authorized
#[derive(Clone)]
pub(crate) enum RequestPolicy {
    /// Plain request, no extra headers
    Unsigned,
    /// SigV4-signed with credentials from the provider
    Signed {
        provider: Arc<dyn CredentialsProvider>,
        region: Option<String>,
        service: String,
    },
}

impl RequestPolicy {
    pub(crate) fn from_config(
        config: &PortalConfig,
        provider: Arc<dyn CredentialsProvider>,
    ) -> Self {
        if config.use_signed_requests {
            RequestPolicy::Signed {
                provider,
                region: config.region.clone(),
                service: config.service.clone(),
            }
        } else {
            RequestPolicy::Unsigned
        }
    }

    /// Headers to attach for a GET of `url`.
    ///
    /// Configuration and credential problems surface here, before any
    /// network traffic.
    pub(crate) fn headers_for(&self, url: &Url) -> Result<Vec<(String, String)>, PortalError> {
        let RequestPolicy::Signed {
            provider,
            region,
            service,
        } = self
        else {
            return Ok(Vec::new());
        };

        let region = region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(PortalError::ConfigurationMissing("region"))?;
        let credentials = provider
            .credentials()
            .ok_or(PortalError::CredentialsUnavailable)?;

        let signed = sign(
            "GET",
            url,
            b"",
            &SigningParams {
                credentials: &credentials,
                region,
                service,
                time: Utc::now(),
                apply_checksum: true,
            },
        )?;
        tracing::trace!(url = %url, signature = %signed.signature, "attached signature");
        Ok(signed.headers)
    }
}

/// Reason text for a failed response: the canonical phrase, then the body
fn status_reason(canonical: Option<&str>, body: &str) -> String {
    let body = body.trim();
    match (canonical, body.is_empty()) {
        (Some(phrase), true) => phrase.to_string(),
        (Some(phrase), false) => format!("{phrase}: {body}"),
        (None, false) => body.to_string(),
        (None, true) => "Unknown error".to_string(),
    }
}

/// Blocking JSON client built on a shared `ureq` agent
#[derive(Clone)]
pub(crate) struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub(crate) fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }

    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<ureq::http::Response<ureq::Body>, PortalError> {
        let mut request = self.agent.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.call()?;

        let status = response.status();
        tracing::debug!(url, status = status.as_u16(), "GET");
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .into_body()
            .read_to_string()
            .unwrap_or_default();
        Err(PortalError::Status {
            status: status.as_u16(),
            reason: status_reason(status.canonical_reason(), &body),
        })
    }

    /// GET `url` and parse the body as JSON; non-2xx statuses are errors
    pub(crate) fn get_json(
        &self,
        url: &Url,
        headers: &[(String, String)],
    ) -> Result<Value, PortalError> {
        let response = self.get(url.as_str(), headers)?;
        let text = response.into_body().read_to_string()?;
        parse_body(&text)
    }

    /// Body of a successful GET of `url`; non-2xx statuses are errors
    pub(crate) fn open(&self, url: &str) -> Result<ureq::Body, PortalError> {
        Ok(self.get(url, &[])?.into_body())
    }
}
