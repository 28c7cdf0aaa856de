use crate::error::Error;
use async_trait::async_trait;
use hyper::{client::HttpConnector, Body, Request, Response};
use hyper_tls::HttpsConnector;
use std::{fmt::Debug, sync::Mutex};

/// The HTTP client doing the actual network I/O underneath the middleware
/// pipeline.
#[async_trait]
pub trait Transport: Debug + Send + Sync {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, Error>;

    /// Releases pooled connections.
    fn close(&self);
}

type HyperClient = hyper::Client<HttpsConnector<HttpConnector>>;

/// Default transport: a pooled hyper client speaking HTTP and HTTPS.
#[derive(Debug)]
pub struct HyperTransport {
    client: Mutex<Option<HyperClient>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self::from_client(hyper::Client::builder().build(HttpsConnector::new()))
    }

    pub fn from_client(client: HyperClient) -> Self {
        Self {
            client: Mutex::new(Some(client)),
        }
    }

    fn client(&self) -> Result<HyperClient, Error> {
        self.client
            .lock()
            .map_err(|_| Error::Closed)?
            .clone()
            .ok_or(Error::Closed)
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, Error> {
        let client = self.client()?;

        Ok(client.request(request).await?)
    }

    fn close(&self) {
        // dropping the last client handle shuts its connection pool down
        if let Ok(mut client) = self.client.lock() {
            client.take();
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}
