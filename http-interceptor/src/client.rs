use crate::{
    client_builder::ClientBuilder,
    encoding::Encoding,
    error::Error,
    into_url::IntoUrl,
    method::HttpMethod,
    middleware::Middleware,
    response::HttpResponse,
    transport::Transport,
    RequestBody, RequestData, ResponseData,
};
use hyper::{Body, Request, Response};
use std::{collections::HashMap, convert::TryFrom, sync::Arc, time::Duration};
use tracing::{debug, warn};
use url::Url;

/// Headers supplied with a request.
pub type Headers = HashMap<String, String>;

/// HTTP client that runs every request and response through an ordered chain
/// of middleware.
///
/// Each exchange builds a `RequestData` snapshot, hands it to every middleware,
/// sends the request the snapshot describes, buffers the response into a
/// `ResponseData`, hands that to every middleware, and finally returns an
/// `HttpResponse` built from it. Middleware are called one after another in
/// registration order, and the first error aborts the exchange.
///
/// The client is immutable once built and can be shared between tasks behind
/// an `Arc`; concurrent exchanges share the middleware and the transport.
#[derive(Debug)]
pub struct InterceptingClient {
    middlewares: Vec<Arc<dyn Middleware>>,
    request_timeout: Option<Duration>,
    transport: Arc<dyn Transport>,
}

impl InterceptingClient {
    /// Create an InterceptingClient with no middleware and the default transport.
    ///
    /// # Returns
    /// An InterceptingClient.
    pub fn new() -> Self {
        ClientBuilder::new().build()
    }

    /// Start configuring a client.
    ///
    /// # Returns
    /// A ClientBuilder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_parts(
        middlewares: Vec<Arc<dyn Middleware>>,
        request_timeout: Option<Duration>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            middlewares,
            request_timeout,
            transport,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Sends a HEAD request.
    ///
    /// # Arguments
    /// `url` - a parsed `Url` or a string to parse.
    /// `headers` - request headers, none when `None`.
    ///
    /// # Returns
    /// The response after every middleware has seen it.
    pub async fn head<U: IntoUrl>(&self, url: U, headers: Option<Headers>) -> Result<HttpResponse, Error> {
        self.send_unstreamed(HttpMethod::Head, url, headers, RequestBody::None, None)
            .await
    }

    /// Sends a GET request.
    ///
    /// # Arguments
    /// `url` - a parsed `Url` or a string to parse.
    /// `headers` - request headers, none when `None`.
    ///
    /// # Returns
    /// The response after every middleware has seen it.
    pub async fn get<U: IntoUrl>(&self, url: U, headers: Option<Headers>) -> Result<HttpResponse, Error> {
        self.send_unstreamed(HttpMethod::Get, url, headers, RequestBody::None, None)
            .await
    }

    /// Sends a POST request.
    ///
    /// # Arguments
    /// `url` - a parsed `Url` or a string to parse.
    /// `headers` - request headers, none when `None`.
    /// `body` - text, bytes, form fields or `RequestBody::None`.
    /// `encoding` - encoding for text and form bodies, UTF-8 when `None`.
    ///
    /// # Returns
    /// The response after every middleware has seen it.
    pub async fn post<U: IntoUrl, B: Into<RequestBody>>(
        &self,
        url: U,
        headers: Option<Headers>,
        body: B,
        encoding: Option<Encoding>,
    ) -> Result<HttpResponse, Error> {
        self.send_unstreamed(HttpMethod::Post, url, headers, body.into(), encoding)
            .await
    }

    /// Sends a PUT request. Arguments are the same as for [`post`](Self::post).
    pub async fn put<U: IntoUrl, B: Into<RequestBody>>(
        &self,
        url: U,
        headers: Option<Headers>,
        body: B,
        encoding: Option<Encoding>,
    ) -> Result<HttpResponse, Error> {
        self.send_unstreamed(HttpMethod::Put, url, headers, body.into(), encoding)
            .await
    }

    /// Sends a PATCH request. Arguments are the same as for [`post`](Self::post).
    pub async fn patch<U: IntoUrl, B: Into<RequestBody>>(
        &self,
        url: U,
        headers: Option<Headers>,
        body: B,
        encoding: Option<Encoding>,
    ) -> Result<HttpResponse, Error> {
        self.send_unstreamed(HttpMethod::Patch, url, headers, body.into(), encoding)
            .await
    }

    /// Sends a DELETE request. Arguments are the same as for [`post`](Self::post).
    pub async fn delete<U: IntoUrl, B: Into<RequestBody>>(
        &self,
        url: U,
        headers: Option<Headers>,
        body: B,
        encoding: Option<Encoding>,
    ) -> Result<HttpResponse, Error> {
        self.send_unstreamed(HttpMethod::Delete, url, headers, body.into(), encoding)
            .await
    }

    /// Sends a GET request and returns the decoded body.
    ///
    /// # Returns
    /// The body text, or `Error::HttpStatus` when the status is 400 or above.
    pub async fn read<U: IntoUrl>(&self, url: U, headers: Option<Headers>) -> Result<String, Error> {
        let url = url.into_url()?;
        let response = self.get(&url, headers).await?.error_for_status(&url)?;

        Ok(response.text().into_owned())
    }

    /// Sends a GET request and returns the raw body.
    ///
    /// # Returns
    /// The body bytes, or `Error::HttpStatus` when the status is 400 or above.
    pub async fn read_bytes<U: IntoUrl>(
        &self,
        url: U,
        headers: Option<Headers>,
    ) -> Result<Vec<u8>, Error> {
        let url = url.into_url()?;
        let response = self.get(&url, headers).await?.error_for_status(&url)?;

        Ok(response.into_bytes())
    }

    /// Hands `request` straight to the transport. No middleware runs and the
    /// request timeout does not apply.
    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>, Error> {
        self.transport.send(request).await
    }

    /// Releases the transport's pooled connections.
    pub fn close(&self) {
        self.transport.close();
    }

    async fn send_unstreamed<U: IntoUrl>(
        &self,
        method: HttpMethod,
        url: U,
        headers: Option<Headers>,
        body: RequestBody,
        encoding: Option<Encoding>,
    ) -> Result<HttpResponse, Error> {
        let url = url.into_url()?;
        let mut request_data = RequestData::new(method, url.as_str())
            .with_headers(headers)
            .with_body(body)
            .with_encoding(encoding);

        // reject what cannot go on the wire before any middleware sees it
        request_data.to_http_request()?;

        for middleware in &self.middlewares {
            middleware
                .intercept_request(&mut request_data)
                .await
                .map_err(|e| {
                    warn!("Middleware {:?} rejected {} {}: {}", middleware, method, url, e);
                    e
                })?;
        }

        let request = request_data.to_http_request()?;

        debug!("Sending {} {}", method, url);
        let response = self.dispatch(request, &url).await?;
        let mut response_data = ResponseData::from_streamed(method, url.as_str(), response).await?;
        debug!("Received {} for {} {}", response_data.status_code, method, url);

        for middleware in &self.middlewares {
            middleware
                .intercept_response(&mut response_data)
                .await
                .map_err(|e| {
                    warn!("Middleware {:?} rejected the response to {} {}: {}", middleware, method, url, e);
                    e
                })?;
        }

        HttpResponse::try_from(response_data)
    }

    async fn dispatch(&self, request: Request<Body>, url: &Url) -> Result<Response<Body>, Error> {
        match self.request_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.transport.send(request))
                .await
                .map_err(|_| {
                    warn!("Request to {} timed out after {:?}", url, timeout);
                    Error::Timeout {
                        url: url.to_string(),
                        timeout,
                    }
                })?,
            None => self.transport.send(request).await,
        }
    }
}

impl Default for InterceptingClient {
    fn default() -> Self {
        Self::new()
    }
}
