use crate::config::PortalConfig;
use crate::core::SessionRow;
use crate::error::PortalError;

use super::client::{HttpClient, RequestPolicy};
use super::response::parse_session_list;

/// Retrieves the session list from the list endpoint.
///
/// One attempt per call; failures are returned to the caller untouched.
#[derive(Clone)]
pub(crate) struct SessionsFetcher {
    config: PortalConfig,
    client: HttpClient,
    policy: RequestPolicy,
}

impl SessionsFetcher {
    pub(crate) fn new(config: PortalConfig, client: HttpClient, policy: RequestPolicy) -> Self {
        Self {
            config,
            client,
            policy,
        }
    }

    pub(crate) fn list_sessions(&self) -> Result<Vec<SessionRow>, PortalError> {
        let url = self.config.list_endpoint()?;
        let headers = self.policy.headers_for(&url)?;
        let body = self.client.get_json(&url, &headers)?;
        let rows: Vec<SessionRow> = parse_session_list(&body)
            .into_iter()
            .map(SessionRow::from)
            .collect();
        tracing::debug!(count = rows.len(), "fetched sessions");
        Ok(rows)
    }
}
