use crate::{encoding::Encoding, error::Error, method::HttpMethod, util};
use hyper::{
    body,
    ext::ReasonPhrase,
    header::{self, HeaderValue},
    http::response::Parts,
    Body, HeaderMap, Method, Request, Response, Uri, Version,
};
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
};
use url::form_urlencoded;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RequestBody {
    None,
    Text(String),
    Bytes(Vec<u8>),
    /// Sent URL-form-encoded.
    Fields(BTreeMap<String, String>),
}

impl RequestBody {
    pub fn is_none(&self) -> bool {
        matches!(self, RequestBody::None)
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        RequestBody::None
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(String::from(text))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<&[u8]> for RequestBody {
    fn from(bytes: &[u8]) -> Self {
        RequestBody::Bytes(bytes.to_vec())
    }
}

impl From<BTreeMap<String, String>> for RequestBody {
    fn from(fields: BTreeMap<String, String>) -> Self {
        RequestBody::Fields(fields)
    }
}

impl From<HashMap<String, String>> for RequestBody {
    fn from(fields: HashMap<String, String>) -> Self {
        RequestBody::Fields(fields.into_iter().collect())
    }
}

impl<T: Into<RequestBody>> From<Option<T>> for RequestBody {
    fn from(body: Option<T>) -> Self {
        body.map(Into::into).unwrap_or_default()
    }
}

/// Snapshot of an outgoing request, handed to every middleware before
/// dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestData {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: RequestBody,
    pub encoding: Option<Encoding>,
}

impl RequestData {
    pub fn new<S: Into<String>>(method: HttpMethod, url: S) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: RequestBody::None,
            encoding: None,
        }
    }

    pub fn with_headers(mut self, headers: Option<HashMap<String, String>>) -> Self {
        self.headers = headers.unwrap_or_default();
        self
    }

    pub fn with_body<B: Into<RequestBody>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_encoding(mut self, encoding: Option<Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        util::find_header(&self.headers, name)
    }

    /// Builds the transport request this snapshot describes.
    ///
    /// Text bodies are encoded with the snapshot's encoding (UTF-8 when unset)
    /// and form fields are URL-form-encoded; both get a default `Content-Type`
    /// unless one is present. Fields combined with a non-form `Content-Type`
    /// are rejected.
    pub fn to_http_request(&self) -> Result<Request<Body>, Error> {
        let uri: Uri = self.url.parse()?;
        let encoding = self.encoding.unwrap_or_default();
        let content_type = self.header("content-type");

        let (body, default_content_type) = match &self.body {
            RequestBody::None => (Body::empty(), None),
            RequestBody::Text(text) => (
                Body::from(encoding.encode(text)?),
                Some(format!("text/plain; charset={}", encoding.label())),
            ),
            RequestBody::Bytes(bytes) => (Body::from(bytes.clone()), None),
            RequestBody::Fields(fields) => {
                if let Some(content_type) = content_type {
                    if !is_form_content_type(content_type) {
                        return Err(Error::InvalidArgument(format!(
                            "cannot send form fields with content-type {:?}",
                            content_type
                        )));
                    }
                }

                (
                    Body::from(encode_fields(fields, encoding)?),
                    Some(format!("{}; charset={}", FORM_CONTENT_TYPE, encoding.label())),
                )
            }
        };

        let mut request_builder = Request::builder()
            .method(Method::from(self.method))
            .uri(uri);

        if let Some(headers_mut) = request_builder.headers_mut() {
            util::put_headers(headers_mut, &self.headers)?;

            if let (None, Some(default_content_type)) = (content_type, default_content_type) {
                headers_mut.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_str(&default_content_type).map_err(|_| {
                        Error::InvalidArgument(format!(
                            "invalid content-type {:?}",
                            default_content_type
                        ))
                    })?,
                );
            }
        }

        Ok(request_builder.body(body)?)
    }
}

fn is_form_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map_or(false, |mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

fn encode_fields(fields: &BTreeMap<String, String>, encoding: Encoding) -> Result<Vec<u8>, Error> {
    let mut pairs = Vec::with_capacity(fields.len());

    for (key, value) in fields {
        let key: String = form_urlencoded::byte_serialize(&encoding.encode(key)?).collect();
        let value: String = form_urlencoded::byte_serialize(&encoding.encode(value)?).collect();
        pairs.push(format!("{}={}", key, value));
    }

    Ok(pairs.join("&").into_bytes())
}

/// Snapshot of a completed exchange, handed to every middleware before the
/// caller sees the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    pub status_code: u16,
    /// Reason phrase sent by the server, or the canonical one for the status.
    pub reason_phrase: Option<String>,
    pub headers: HashMap<String, String>,
    pub body_bytes: Vec<u8>,
    pub is_redirect: bool,
    pub persistent_connection: bool,
    pub method: HttpMethod,
    pub url: String,
}

impl ResponseData {
    /// Buffers a streamed transport response into a snapshot.
    pub async fn from_streamed<S: Into<String>>(
        method: HttpMethod,
        url: S,
        response: Response<Body>,
    ) -> Result<Self, Error> {
        let (parts, streamed_body) = response.into_parts();
        let body_bytes = body::to_bytes(streamed_body).await?;

        Ok(Self::from_parts(method, url, &parts, body_bytes.to_vec()))
    }

    pub fn from_parts<S: Into<String>>(
        method: HttpMethod,
        url: S,
        parts: &Parts,
        body_bytes: Vec<u8>,
    ) -> Self {
        let reason_phrase = match parts.extensions.get::<ReasonPhrase>() {
            Some(reason) => Some(String::from_utf8_lossy(reason.as_bytes()).into_owned()),
            None => parts.status.canonical_reason().map(String::from),
        };

        Self {
            status_code: parts.status.as_u16(),
            reason_phrase,
            headers: util::extract_headers(&parts.headers),
            body_bytes,
            is_redirect: parts.status.is_redirection(),
            persistent_connection: keeps_alive(parts.version, &parts.headers),
            method,
            url: url.into(),
        }
    }

    /// Charset of the body, taken from `Content-Type`.
    pub fn encoding(&self) -> Encoding {
        Encoding::for_headers(&self.headers)
    }

    /// The body decoded as text.
    pub fn body(&self) -> Cow<'_, str> {
        self.encoding().decode(&self.body_bytes)
    }

    /// Replaces the body with `body` encoded in the response charset, keeping
    /// an existing `Content-Length` in step.
    pub fn set_body(&mut self, body: &str) -> Result<(), Error> {
        self.body_bytes = self.encoding().encode(body)?;

        if let Some(content_length) = self.headers.get_mut("content-length") {
            *content_length = self.body_bytes.len().to_string();
        }

        Ok(())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        util::find_header(&self.headers, name)
    }
}

fn keeps_alive(version: Version, headers: &HeaderMap) -> bool {
    let connection = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .collect::<Vec<_>>();

    match version {
        Version::HTTP_09 | Version::HTTP_10 => connection.iter().any(|token| token == "keep-alive"),
        _ => !connection.iter().any(|token| token == "close"),
    }
}
