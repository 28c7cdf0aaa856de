use crate::{
    client::InterceptingClient,
    middleware::Middleware,
    transport::{HyperTransport, Transport},
};
use std::{fmt::Debug, sync::Arc, time::Duration};

/// Builder used to build an InterceptingClient instance.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    middlewares: Vec<Arc<dyn Middleware>>,
    request_timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new ClientBuilder instance with no middleware, no timeout and the default transport.
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
            request_timeout: None,
            transport: None,
        }
    }

    /// Append a middleware to the chain. Middleware run in the order they are added.
    ///
    /// # Arguments
    /// `middleware` - the middleware to append.
    ///
    /// # Returns
    /// This builder.
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Append several middleware, keeping their order. Absent (`None`) entries are dropped here and never
    /// reach the client.
    ///
    /// # Arguments
    /// `middlewares` - shared middleware, either bare or wrapped in an `Option`.
    ///
    /// # Returns
    /// This builder.
    pub fn middlewares<M, I>(mut self, middlewares: I) -> Self
    where
        M: Into<Option<Arc<dyn Middleware>>>,
        I: IntoIterator<Item = M>,
    {
        self.middlewares
            .extend(middlewares.into_iter().filter_map(Into::into));
        self
    }

    /// Bound every intercepted dispatch by `timeout`.
    ///
    /// # Arguments
    /// `timeout` - the longest the transport may take to answer a request.
    ///
    /// # Returns
    /// This builder.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Use the given transport instead of a fresh `HyperTransport`.
    ///
    /// # Arguments
    /// `transport` - the transport the client will own.
    ///
    /// # Returns
    /// This builder.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Consume the builder and create an InterceptingClient using all of the previously configured values or
    /// their defaults.
    ///
    /// # Returns
    /// An InterceptingClient instance.
    pub fn build(self) -> InterceptingClient {
        InterceptingClient::from_parts(
            self.middlewares,
            self.request_timeout,
            self.transport
                .unwrap_or_else(|| Arc::new(HyperTransport::new())),
        )
    }
}
