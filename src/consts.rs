/// Application name, used for config paths
pub(crate) const APP_NAME: &str = "sessions-portal";

/// Query parameter carrying the session identifier on download requests
pub(crate) const SESSION_ID_PARAM: &str = "sessionId";

/// Route prefix for the session detail view
pub(crate) const SESSION_ROUTE_PREFIX: &str = "/session/";

/// Default signing service for function URLs
pub(crate) const DEFAULT_SERVICE: &str = "lambda";

/// Default global timeout for HTTP requests, in seconds
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Placeholder shown when a row has a time label but no date label
pub(crate) const MISSING_LABEL: &str = "—";
