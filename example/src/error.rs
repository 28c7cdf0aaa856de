use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Date range {0}-{1} not supported")]
    DateRangeNotSupported(u16, u16),
    #[error("Not recognized by ClimateWeb")]
    NotRecognizedByClimateWeb,
    #[error("{0}")]
    DeserializationError(#[from] quick_xml::DeError),
    #[error("{0}")]
    HttpError(#[from] http_interceptor::Error),
}
