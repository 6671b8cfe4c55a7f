use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum PortalError {
    #[error("Missing configuration: {0} is not set")]
    ConfigurationMissing(&'static str),

    #[error("No AWS credentials available (set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY)")]
    CredentialsUnavailable,

    #[error("API error: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("endpoint did not return a url")]
    MissingDownloadUrl,

    #[error("Invalid URL \"{input}\": {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl From<ureq::Error> for PortalError {
    fn from(err: ureq::Error) -> Self {
        PortalError::Request(err.to_string())
    }
}
