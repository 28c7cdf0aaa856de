use hyper::http;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid URL: {0}")]
    UrlFormat(#[from] url::ParseError),
    #[error("Invalid request URI: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),
    #[error("The status code {0} is invalid")]
    InvalidStatusCode(u16),
    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
    #[error("Request to {url} failed with status {status}{}", reason_suffix(.reason))]
    HttpStatus {
        url: String,
        status: u16,
        reason: Option<String>,
    },
    #[error("Hyper error: {0}")]
    HyperError(#[from] hyper::Error),
    #[error("Http error: {0}")]
    HttpError(#[from] http::Error),
    #[error("The client has been closed")]
    Closed,
    #[error("Middleware error: {0}")]
    Middleware(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps an arbitrary failure raised inside a middleware.
    pub fn middleware<E: Into<Box<dyn std::error::Error + Send + Sync>>>(error: E) -> Self {
        Error::Middleware(error.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(" {}", reason),
        None => String::new(),
    }
}
