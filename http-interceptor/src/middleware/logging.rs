//! Middleware that logs every exchange through `tracing`

use super::Middleware;
use crate::{error::Error, RequestBody, RequestData, ResponseData};
use async_trait::async_trait;
use tracing::{debug, info, trace};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
}

/// Logs requests and responses without touching them.
#[derive(Debug)]
pub struct LoggingMiddleware {
    level: LogLevel,
    /// Whether to log bodies (can be verbose)
    log_bodies: bool,
}

impl LoggingMiddleware {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            log_bodies: false,
        }
    }

    pub fn with_bodies(mut self) -> Self {
        self.log_bodies = true;
        self
    }

    fn emit(&self, message: String) {
        match self.level {
            LogLevel::Trace => trace!("{}", message),
            LogLevel::Debug => debug!("{}", message),
            LogLevel::Info => info!("{}", message),
        }
    }

    fn describe_body(body: &RequestBody) -> String {
        match body {
            RequestBody::None => String::from("<none>"),
            RequestBody::Text(text) => text.clone(),
            RequestBody::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
            RequestBody::Fields(fields) => format!("{:?}", fields),
        }
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn intercept_request(&self, request: &mut RequestData) -> Result<(), Error> {
        let mut message = format!(
            "--> {} {} ({} headers)",
            request.method,
            request.url,
            request.headers.len()
        );

        if self.log_bodies {
            message.push_str(&format!(" body: {}", Self::describe_body(&request.body)));
        }

        self.emit(message);
        Ok(())
    }

    async fn intercept_response(&self, response: &mut ResponseData) -> Result<(), Error> {
        let mut message = format!(
            "<-- {} {} {} ({} bytes)",
            response.status_code,
            response.method,
            response.url,
            response.body_bytes.len()
        );

        if self.log_bodies {
            message.push_str(&format!(" body: {}", response.body()));
        }

        self.emit(message);
        Ok(())
    }
}
