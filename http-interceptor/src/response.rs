use crate::{encoding::Encoding, error::Error, method::HttpMethod, util, ResponseData};
use hyper::StatusCode;
use std::{borrow::Cow, collections::HashMap, convert::TryFrom};
use url::Url;

/// The request a response answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: Url,
}

/// A fully buffered response, as seen by the caller after every middleware
/// has run.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    reason_phrase: Option<String>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    is_redirect: bool,
    persistent_connection: bool,
    request: RequestDescriptor,
}

impl HttpResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// The reason phrase the server sent, falling back to the canonical one.
    pub fn reason_phrase(&self) -> Option<&str> {
        self.reason_phrase.as_deref()
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        util::find_header(&self.headers, name)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// The body decoded with the charset named in `Content-Type`, UTF-8 when
    /// none is given.
    pub fn text(&self) -> Cow<'_, str> {
        Encoding::for_headers(&self.headers).decode(&self.body)
    }

    pub fn is_redirect(&self) -> bool {
        self.is_redirect
    }

    pub fn persistent_connection(&self) -> bool {
        self.persistent_connection
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    /// Fails with `Error::HttpStatus` naming `url` when the status is 400 or
    /// above.
    pub(crate) fn error_for_status(self, url: &Url) -> Result<Self, Error> {
        if self.status.as_u16() >= 400 {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: self.status.as_u16(),
                reason: self.reason_phrase,
            });
        }

        Ok(self)
    }
}

impl TryFrom<ResponseData> for HttpResponse {
    type Error = Error;

    fn try_from(data: ResponseData) -> Result<Self, Self::Error> {
        let status =
            StatusCode::from_u16(data.status_code).map_err(|_| Error::InvalidStatusCode(data.status_code))?;
        let url = Url::parse(&data.url)?;

        Ok(Self {
            status,
            reason_phrase: data.reason_phrase,
            headers: data.headers,
            body: data.body_bytes,
            is_redirect: data.is_redirect,
            persistent_connection: data.persistent_connection,
            request: RequestDescriptor {
                method: data.method,
                url,
            },
        })
    }
}
