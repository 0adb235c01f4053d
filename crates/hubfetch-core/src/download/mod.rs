//! Byte-stream downloader for the auxiliary asset.
//!
//! One GET per hop with libcurl's own redirect handling turned off: 301/302 are
//! followed here, up to `max_redirects` hops, by resolving `Location` against
//! the current URL. Only a 200 body reaches the destination file; bodies of
//! redirects and errors are dropped. Runs on the current thread; call from
//! `spawn_blocking` if used from async code.

mod error;
mod head;

pub use error::DownloadError;

use std::cell::RefCell;
use std::path::Path;
use std::str;
use std::time::Duration;
use url::Url;

use crate::config::DownloadConfig;
use crate::storage::Destination;
use head::ResponseHead;

/// Bytes/s below which a transfer counts as stalled.
const STALL_BYTES_PER_SEC: u32 = 1024;

/// Result of a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub bytes: u64,
    pub redirects: u32,
    /// URL that produced the 200 response.
    pub final_url: String,
}

/// Fetch the full body at `url` into the file at `dest`.
pub trait AssetDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<Transfer, DownloadError>;
}

impl<T: AssetDownloader + ?Sized> AssetDownloader for &T {
    fn download(&self, url: &str, dest: &Path) -> Result<Transfer, DownloadError> {
        (**self).download(url, dest)
    }
}

/// Outcome of a single request in the redirect chain.
#[derive(Debug)]
enum Hop {
    Redirect { status: u32, location: String },
    Done { status: u32 },
}

/// libcurl-backed [`AssetDownloader`].
#[derive(Debug, Clone, Default)]
pub struct CurlDownloader {
    opts: DownloadConfig,
}

impl CurlDownloader {
    pub fn new(opts: DownloadConfig) -> Self {
        Self { opts }
    }

    fn easy_for(&self, url: &Url) -> Result<curl::easy::Easy, DownloadError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(false)?;
        easy.useragent(concat!("hubfetch/", env!("CARGO_PKG_VERSION")))?;
        easy.connect_timeout(Duration::from_secs(self.opts.connect_timeout_secs))?;
        easy.low_speed_limit(STALL_BYTES_PER_SEC)?;
        easy.low_speed_time(Duration::from_secs(self.opts.stall_timeout_secs))?;
        if let Some(secs) = self.opts.timeout_secs {
            easy.timeout(Duration::from_secs(secs))?;
        }
        Ok(easy)
    }

    /// Issue one GET. Body bytes are written to `dest` only for a 200 response.
    fn get_once(&self, url: &Url, dest: &mut Destination) -> Result<Hop, DownloadError> {
        let mut easy = self.easy_for(url)?;
        let head = RefCell::new(ResponseHead::default());
        let mut write_err: Option<std::io::Error> = None;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(line) = str::from_utf8(data) {
                    head.borrow_mut().observe(line);
                }
                true
            })?;
            transfer.write_function(|data| {
                if !head.borrow().is_ok() {
                    return Ok(data.len());
                }
                match dest.write_chunk(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        write_err = Some(e);
                        Ok(0) // abort transfer
                    }
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(DownloadError::Storage(e));
        }
        performed?;

        let status = easy.response_code()?;
        match status {
            301 | 302 => {
                let location = head
                    .into_inner()
                    .location
                    .ok_or(DownloadError::MissingLocation(status))?;
                Ok(Hop::Redirect { status, location })
            }
            _ => Ok(Hop::Done { status }),
        }
    }
}

fn parse_url(raw: &str) -> Result<Url, DownloadError> {
    Url::parse(raw).map_err(|source| DownloadError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

impl AssetDownloader for CurlDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<Transfer, DownloadError> {
        let mut current = parse_url(url)?;
        let mut out = Destination::create(dest)?;
        let limit = self.opts.max_redirects;
        let mut redirects = 0u32;

        loop {
            match self.get_once(&current, &mut out)? {
                Hop::Redirect { status, location } => {
                    let next = current
                        .join(&location)
                        .map_err(|source| DownloadError::InvalidUrl {
                            url: location.clone(),
                            source,
                        })?;
                    if redirects >= limit {
                        return Err(DownloadError::TooManyRedirects {
                            limit,
                            last: next.to_string(),
                        });
                    }
                    redirects += 1;
                    tracing::info!(status, from = %current, to = %next, hop = redirects, "following redirect");
                    current = next;
                }
                Hop::Done { status: 200 } => {
                    let bytes = out.finish()?;
                    tracing::debug!(url = %current, bytes, redirects, dest = %dest.display(), "download complete");
                    return Ok(Transfer {
                        bytes,
                        redirects,
                        final_url: current.to_string(),
                    });
                }
                Hop::Done { status } => {
                    tracing::warn!(url = %current, status, "download failed with HTTP status");
                    return Err(DownloadError::Http(status));
                }
            }
        }
    }
}
