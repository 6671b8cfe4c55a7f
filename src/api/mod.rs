//! Remote API access: session listing and download resolution

mod client;
mod download;
mod list;
mod response;

pub(crate) use client::{HttpClient, RequestPolicy};
pub(crate) use download::DownloadResolver;
pub(crate) use list::SessionsFetcher;
