use url::Url;

use crate::config::PortalConfig;
use crate::consts::SESSION_ID_PARAM;
use crate::core::DownloadLink;
use crate::error::PortalError;
use crate::navigate::Navigator;

use super::client::{HttpClient, RequestPolicy};
use super::response::parse_download_link;

/// Copy of `base` with `sessionId` set to `session_id`; other pairs are kept
pub(crate) fn download_request_url(base: &Url, session_id: &str) -> Url {
    let mut url = base.clone();
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != SESSION_ID_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(SESSION_ID_PARAM, session_id);
    url
}

/// Exchanges a session identifier for a short-lived download URL
#[derive(Clone)]
pub(crate) struct DownloadResolver {
    config: PortalConfig,
    client: HttpClient,
    policy: RequestPolicy,
}

impl DownloadResolver {
    pub(crate) fn new(config: PortalConfig, client: HttpClient, policy: RequestPolicy) -> Self {
        Self {
            config,
            client,
            policy,
        }
    }

    pub(crate) fn resolve(&self, session_id: &str) -> Result<DownloadLink, PortalError> {
        let base = self.config.download_endpoint()?;
        let url = download_request_url(&base, session_id);
        let headers = self.policy.headers_for(&url)?;
        let body = self.client.get_json(&url, &headers)?;
        parse_download_link(&body)
    }

    /// Resolve and navigate. Nothing is navigated to unless resolution succeeds.
    pub(crate) fn download(
        &self,
        session_id: &str,
        navigator: &mut dyn Navigator,
    ) -> Result<DownloadLink, PortalError> {
        let link = self.resolve(session_id)?;
        navigator.navigate(&link.url)?;
        Ok(link)
    }
}
