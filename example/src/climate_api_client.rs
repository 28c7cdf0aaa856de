use crate::{data::AnnualGcmData, error::Error, request_stats::RequestStatsMiddleware};
use http_interceptor::{InterceptingClient, Middleware};
use std::{sync::Arc, time::Duration};
use tracing::debug;

const DEFAULT_DOMAIN_NAME: &str = "http://climatedataapi.worldbank.org";

/// Builder used to build a ClimateApiClient instance
#[derive(Debug, Default)]
pub struct ClimateApiClientBuilder {
    domain_name: Option<String>,
    middlewares: Vec<Arc<dyn Middleware>>,
    request_timeout: Option<Duration>,
}

impl ClimateApiClientBuilder {
    /// Create a new ClimateApiClientBuilder instance.
    pub fn new() -> Self {
        Self {
            domain_name: None,
            middlewares: Vec::new(),
            request_timeout: None,
        }
    }

    /// Use the given domain_name when building a ClimateApiClient instance.
    ///
    /// # Arguments
    /// `domain_name` - a domain name to use when calling the API.
    ///
    /// # Returns
    /// This builder.
    pub fn with_domain_name<T: Into<String>>(mut self, domain_name: T) -> Self {
        self.domain_name = Some(domain_name.into());
        self
    }

    /// Run the given middleware around every API call, after the client's own request statistics.
    ///
    /// # Arguments
    /// `middleware` - a middleware shared with the caller.
    ///
    /// # Returns
    /// This builder.
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Give up on API calls that take longer than `timeout`.
    ///
    /// # Arguments
    /// `timeout` - the longest a call may wait for the API.
    ///
    /// # Returns
    /// This builder.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Consume the builder and create a ClimateApiClient instance using all of the previously configured values or
    /// their defaults.
    ///
    /// # Returns
    /// A ClimateApiClient instance.
    pub fn build(mut self) -> ClimateApiClient {
        let stats = Arc::new(RequestStatsMiddleware::new());
        let mut http_builder = InterceptingClient::builder()
            .middlewares(vec![stats.clone() as Arc<dyn Middleware>])
            .middlewares(self.middlewares);

        if let Some(timeout) = self.request_timeout {
            http_builder = http_builder.request_timeout(timeout);
        }

        ClimateApiClient {
            http: http_builder.build(),
            stats,
            domain_name: self
                .domain_name
                .take()
                .unwrap_or_else(|| String::from(DEFAULT_DOMAIN_NAME)),
        }
    }
}

/// Struct that represents a World Bank Climate Data API client.
#[derive(Debug)]
pub struct ClimateApiClient {
    http: InterceptingClient,
    stats: Arc<RequestStatsMiddleware>,
    domain_name: String,
}

impl ClimateApiClient {
    /// Create a ClimateApiClient talking to the public API.
    ///
    /// # Returns
    /// A ClimateApiClient.
    pub fn new() -> Self {
        ClimateApiClientBuilder::new().build()
    }

    /// Gets an average annual rainfall data from WorldBank Climate Data API.
    ///
    /// # Arguments
    /// `from_year` - start of the year interval. It should be a value between 1920 and 2080 inclusive and it should be
    ///     divisible by 20.
    /// `to_year` - end of the year interval. It should be a value equal to `from_year` + 19.
    /// `country_iso` - ISO3 country code
    ///
    /// # Returns
    /// Average of all of the average annual values from all Global Circulation Models (GCM).
    pub async fn get_average_annual_rainfall<T: AsRef<str>>(
        &self,
        from_year: u16,
        to_year: u16,
        country_iso: T,
    ) -> Result<f64, Error> {
        Self::check_years(from_year, to_year)?;

        let url = self.construct_get_average_annual_rainfall_url(from_year, to_year, country_iso);
        let response_text = self.http.read(url.as_str(), None).await?;

        if response_text.starts_with("Invalid country code") {
            return Err(Error::NotRecognizedByClimateWeb);
        }

        let data: AnnualGcmData = quick_xml::de::from_str(&response_text)?;
        debug!(
            "{} circulation models reported rainfall for {}",
            data.results.as_ref().map_or(0, Vec::len),
            url
        );

        Ok(data.average())
    }

    /// Request statistics gathered by the client's middleware.
    pub fn stats(&self) -> &RequestStatsMiddleware {
        &self.stats
    }

    /// Releases the client's pooled connections.
    pub fn close(&self) {
        self.http.close();
    }

    fn construct_get_average_annual_rainfall_url<T: AsRef<str>>(
        &self,
        from_year: u16,
        to_year: u16,
        country_iso: T,
    ) -> String {
        format!(
            "{}/climateweb/rest/v1/country/annualavg/pr/{}/{}/{}.xml",
            self.domain_name,
            from_year,
            to_year,
            country_iso.as_ref()
        )
    }

    fn check_years(from_year: u16, to_year: u16) -> Result<(), Error> {
        if from_year < 1920 || from_year > 2080 || from_year % 20 != 0 || to_year != from_year + 19
        {
            Err(Error::DateRangeNotSupported(from_year, to_year))
        } else {
            Ok(())
        }
    }
}

impl Default for ClimateApiClient {
    fn default() -> Self {
        Self::new()
    }
}
