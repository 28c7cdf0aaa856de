//! The interception contract every middleware implements.
//!
//! The client calls `intercept_request` on each registered middleware, in
//! registration order, before the request is dispatched, and
//! `intercept_response` on each of them, in the same order, once the response
//! has been buffered. Calls for one exchange never overlap; calls for
//! different exchanges may run concurrently on the same middleware instance.

mod logging;

pub use logging::{LogLevel, LoggingMiddleware};

use crate::{error::Error, RequestData, ResponseData};
use async_trait::async_trait;
use std::fmt::Debug;

#[async_trait]
pub trait Middleware: Debug + Send + Sync {
    /// Observes, and may rewrite, the request before it is sent. Returning an
    /// error aborts the exchange.
    async fn intercept_request(&self, _request: &mut RequestData) -> Result<(), Error> {
        Ok(())
    }

    /// Observes, and may rewrite, the response before the caller sees it.
    /// Returning an error aborts the exchange.
    async fn intercept_response(&self, _response: &mut ResponseData) -> Result<(), Error> {
        Ok(())
    }
}
