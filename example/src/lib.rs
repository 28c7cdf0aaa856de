//! Client for the World Bank Climate Data API, built on an intercepting HTTP
//! client so every call is counted and can be observed by extra middleware.

mod climate_api_client;
mod data;
pub mod error;
mod request_stats;

pub use climate_api_client::{ClimateApiClient, ClimateApiClientBuilder};
pub use data::{AnnualData, AnnualGcmData, AnnualGcmDatum};
pub use request_stats::{RequestStats, RequestStatsMiddleware};
