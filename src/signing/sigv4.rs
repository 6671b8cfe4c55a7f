//! AWS Signature Version 4 request signing
//!
//! Only what the portal needs: header-based signing of bodiless requests
//! against a function URL. Paths are double-encoded as for every service
//! other than S3.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::PortalError;

use super::credentials::Credentials;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const SCOPE_DATE_FORMAT: &str = "%Y%m%d";

/// RFC 3986 unreserved characters stay as-is, everything else is escaped
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Everything needed to sign one request
#[derive(Debug, Clone)]
pub(crate) struct SigningParams<'a> {
    pub(crate) credentials: &'a Credentials,
    pub(crate) region: &'a str,
    pub(crate) service: &'a str,
    pub(crate) time: DateTime<Utc>,
    /// Add `x-amz-content-sha256` to the signed headers
    pub(crate) apply_checksum: bool,
}

/// Headers to attach to the outgoing request.
///
/// `host` is signed but not included here; the HTTP client sets it from the
/// URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SignedHeaders {
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) signature: String,
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, PortalError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|err| PortalError::Signing(format!("invalid signing key: {err}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, UNRESERVED).to_string()
}

fn host_header(url: &Url) -> Result<String, PortalError> {
    let host = url.host_str().ok_or_else(|| PortalError::InvalidUrl {
        input: url.to_string(),
        reason: "URL has no host".to_string(),
    })?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Path with each segment escaped once more on top of URL encoding
pub(crate) fn canonical_uri(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/').map(encode).collect::<Vec<_>>().join("/")
}

/// Query pairs escaped and sorted by key, then value
pub(crate) fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Lowercased, trimmed and sorted header list plus the `;`-joined names
fn canonical_headers(headers: &[(String, String)]) -> (String, String) {
    let mut normalized: Vec<(String, String)> = headers
        .iter()
        .map(|(k, v)| {
            let value = v.split_whitespace().collect::<Vec<_>>().join(" ");
            (k.to_ascii_lowercase(), value)
        })
        .collect();
    normalized.sort();

    let canonical = normalized
        .iter()
        .map(|(k, v)| format!("{k}:{v}\n"))
        .collect::<String>();
    let signed = normalized
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");
    (canonical, signed)
}

pub(crate) fn canonical_request(
    method: &str,
    url: &Url,
    headers: &[(String, String)],
    payload_hash: &str,
) -> (String, String) {
    let (canonical_headers, signed_headers) = canonical_headers(headers);
    let request = format!(
        "{method}\n{}\n{}\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
        canonical_uri(url),
        canonical_query(url),
    );
    (request, signed_headers)
}

pub(crate) fn credential_scope(time: DateTime<Utc>, region: &str, service: &str) -> String {
    format!(
        "{}/{region}/{service}/aws4_request",
        time.format(SCOPE_DATE_FORMAT)
    )
}

pub(crate) fn string_to_sign(time: DateTime<Utc>, scope: &str, canonical_request: &str) -> String {
    format!(
        "{ALGORITHM}\n{}\n{scope}\n{}",
        time.format(AMZ_DATE_FORMAT),
        sha256_hex(canonical_request.as_bytes())
    )
}

pub(crate) fn signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, PortalError> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// Sign a request and return the headers to attach.
pub(crate) fn sign(
    method: &str,
    url: &Url,
    payload: &[u8],
    params: &SigningParams<'_>,
) -> Result<SignedHeaders, PortalError> {
    let amz_date = params.time.format(AMZ_DATE_FORMAT).to_string();
    let payload_hash = sha256_hex(payload);

    let mut headers = vec![
        ("host".to_string(), host_header(url)?),
        ("x-amz-date".to_string(), amz_date),
    ];
    if params.apply_checksum {
        headers.push(("x-amz-content-sha256".to_string(), payload_hash.clone()));
    }
    if let Some(token) = &params.credentials.session_token {
        headers.push(("x-amz-security-token".to_string(), token.clone()));
    }

    let (request, signed_headers) = canonical_request(method, url, &headers, &payload_hash);
    let scope = credential_scope(params.time, params.region, params.service);
    let to_sign = string_to_sign(params.time, &scope, &request);
    let key = signing_key(
        &params.credentials.secret_access_key,
        &params.time.format(SCOPE_DATE_FORMAT).to_string(),
        params.region,
        params.service,
    )?;
    let signature = hex::encode(hmac_sha256(&key, to_sign.as_bytes())?);

    tracing::debug!(scope = %scope, signed_headers = %signed_headers, "signed request");

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        params.credentials.access_key_id
    );

    headers.retain(|(k, _)| k != "host");
    headers.push(("authorization".to_string(), authorization));

    Ok(SignedHeaders { headers, signature })
}
