//! Artifact downloads
//!
//! A [`Fetcher`] opens a byte stream for a URL. Transport errors and non-success
//! responses surface as `DownloadFailed` when the stream is opened or read; the
//! resolver owns writing the bytes to disk.

use std::io::Read;
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, resolve::download_failed};

/// An open download
pub struct Download {
    pub reader: Box<dyn Read>,
    /// Content length when the server sent one
    pub length: Option<u64>,
}

pub trait Fetcher {
    fn open(&self, url: &str) -> Result<Download>;
}

/// Blocking HTTP(S) fetcher
///
/// Only a connect timeout is set; the body streams for as long as it takes.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("kindling/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .timeout(None)
            .build()
            .map_err(|e| download_failed("<client>", e))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn open(&self, url: &str) -> Result<Download> {
        debug!(url, "opening download");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| download_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_failed(url, format!("HTTP {status}")));
        }

        Ok(Download {
            length: response.content_length(),
            reader: Box::new(response),
        })
    }
}
