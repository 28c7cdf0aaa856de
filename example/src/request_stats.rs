use http_interceptor::{async_trait, Error, Middleware, RequestData, ResponseData};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts the exchanges a client performs. Safe to share between concurrent
/// requests.
#[derive(Debug, Default)]
pub struct RequestStatsMiddleware {
    requests: AtomicU64,
    responses: AtomicU64,
    error_responses: AtomicU64,
    bytes_received: AtomicU64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RequestStats {
    pub requests: u64,
    pub responses: u64,
    pub error_responses: u64,
    pub bytes_received: u64,
}

impl RequestStatsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RequestStats {
        RequestStats {
            requests: self.requests.load(Ordering::Relaxed),
            responses: self.responses.load(Ordering::Relaxed),
            error_responses: self.error_responses.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl Middleware for RequestStatsMiddleware {
    async fn intercept_request(&self, _request: &mut RequestData) -> Result<(), Error> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn intercept_response(&self, response: &mut ResponseData) -> Result<(), Error> {
        self.responses.fetch_add(1, Ordering::Relaxed);
        self.bytes_received
            .fetch_add(response.body_bytes.len() as u64, Ordering::Relaxed);

        if response.status_code >= 400 {
            self.error_responses.fetch_add(1, Ordering::Relaxed);
        }

        Ok(())
    }
}
