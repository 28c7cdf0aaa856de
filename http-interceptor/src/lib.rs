mod client;
mod client_builder;
mod data;
mod encoding;
mod error;
mod into_url;
mod method;
pub mod middleware;
pub mod mutations;
mod response;
mod transport;
mod util;

pub use client::{Headers, InterceptingClient};
pub use client_builder::ClientBuilder;
pub use data::{RequestBody, RequestData, ResponseData};
pub use encoding::Encoding;
pub use error::{Error, Result};
pub use into_url::IntoUrl;
pub use method::HttpMethod;
pub use middleware::Middleware;
pub use response::{HttpResponse, RequestDescriptor};
pub use transport::{HyperTransport, Transport};
pub use async_trait::async_trait;
pub use url::Url;
