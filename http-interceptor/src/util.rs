use crate::error::Error;
use hyper::{
    header::{HeaderName, HeaderValue},
    HeaderMap,
};
use std::collections::HashMap;

/// Flattens a header map: names are lower-cased and repeated headers are
/// joined with `,`. Values that are not valid UTF-8 are decoded lossily.
pub fn extract_headers(header_map: &HeaderMap) -> HashMap<String, String> {
    let mut headers: HashMap<String, String> = HashMap::new();

    for (key, value) in header_map.iter() {
        let value = String::from_utf8_lossy(value.as_bytes());

        headers
            .entry(String::from(key.as_str()))
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }

    headers
}

pub fn put_headers<'a, I: IntoIterator<Item = (&'a String, &'a String)>>(
    header_map: &mut HeaderMap<HeaderValue>,
    headers: I,
) -> Result<(), Error> {
    for (key, value) in headers {
        let header_name = HeaderName::from_bytes(key.to_lowercase().as_bytes())
            .map_err(|_| Error::InvalidArgument(format!("invalid header name {:?}", key)))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            Error::InvalidArgument(format!("invalid value {:?} for header {:?}", value, key))
        })?;
        header_map.append(header_name, header_value);
    }

    Ok(())
}

/// Case-insensitive header lookup on a flattened header map.
pub fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
