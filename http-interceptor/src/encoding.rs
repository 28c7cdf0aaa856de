use crate::error::Error;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::HashMap, fmt::Display, str::FromStr};

lazy_static! {
    static ref CHARSET_PARAMETER: Regex =
        Regex::new(r#"(?i);\s*charset\s*=\s*"?([^";\s]+)"?"#).unwrap();
}

/// Text encoding applied to textual request bodies and used to decode
/// response bodies.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    Utf8,
    Latin1,
    Ascii,
}

impl Encoding {
    pub fn label(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "iso-8859-1",
            Encoding::Ascii => "us-ascii",
        }
    }

    /// Encodes `text`, failing on the first character the encoding cannot
    /// represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, Error> {
        let limit = match self {
            Encoding::Utf8 => return Ok(text.as_bytes().to_vec()),
            Encoding::Latin1 => 0xFF,
            Encoding::Ascii => 0x7F,
        };

        text.chars()
            .map(|c| {
                if (c as u32) <= limit {
                    Ok(c as u8)
                } else {
                    Err(Error::InvalidArgument(format!(
                        "character {:?} cannot be encoded as {}",
                        c,
                        self.label()
                    )))
                }
            })
            .collect()
    }

    /// Decodes `bytes`; invalid sequences become U+FFFD.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes),
            Encoding::Latin1 => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
            Encoding::Ascii => Cow::Owned(
                bytes
                    .iter()
                    .map(|&b| if b.is_ascii() { b as char } else { '\u{FFFD}' })
                    .collect(),
            ),
        }
    }

    /// Encoding named by the `charset` parameter of a `Content-Type` value.
    /// Unknown or missing charsets yield `None`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        CHARSET_PARAMETER
            .captures(content_type)
            .and_then(|captures| captures.get(1))
            .and_then(|charset| charset.as_str().parse().ok())
    }

    /// Encoding for a header map keyed by lower-case names, UTF-8 by default.
    pub fn for_headers(headers: &HashMap<String, String>) -> Self {
        headers
            .get("content-type")
            .and_then(|content_type| Self::from_content_type(content_type))
            .unwrap_or_default()
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Utf8
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "iso-8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1" => Ok(Encoding::Latin1),
            "us-ascii" | "ascii" => Ok(Encoding::Ascii),
            _ => Err(Error::InvalidArgument(format!("unsupported encoding {:?}", s))),
        }
    }
}
