//! Asset download error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Transport failure reported by libcurl (DNS, connect, TLS, timeout, reset).
    #[error("transfer failed: {0}")]
    Curl(#[from] curl::Error),
    /// Final response was not 200.
    #[error("HTTP error! status: {0}")]
    Http(u32),
    /// A 301/302 came back without a usable `Location` header.
    #[error("HTTP {0} redirect without a Location header")]
    MissingLocation(u32),
    /// The redirect chain exceeded the configured hop count.
    #[error("too many redirects (more than {limit}), last location {last}")]
    TooManyRedirects { limit: u32, last: String },
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// Opening or writing the destination file failed.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}

impl DownloadError {
    /// HTTP status carried by the error, if it is a status failure.
    pub fn status(&self) -> Option<u32> {
        match self {
            DownloadError::Http(code) | DownloadError::MissingLocation(code) => Some(*code),
            _ => None,
        }
    }
}
