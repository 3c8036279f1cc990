//! `data:` URL parsing and encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    /// `data:[<mime>][;param]*[;base64],<payload>`
    static ref RE_DATA_URL: Regex =
        Regex::new(r"(?s)^data:([A-Za-z0-9!#$&^_.+-]+/[A-Za-z0-9!#$&^_.+-]+)?((?:;[^;,]*)*?)(;base64)?,(.*)$")
            .expect("valid data URL regex");
}

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Media type, `text/plain` when omitted
    pub mime: String,
    /// Decoded payload
    pub data: Vec<u8>,
}

impl DataUrl {
    /// Parse and decode a `data:` URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use snapguide::raster::DataUrl;
    ///
    /// let url = DataUrl::parse("data:image/png;base64,AQID").unwrap();
    /// assert_eq!(url.mime, "image/png");
    /// assert_eq!(url.data, vec![1, 2, 3]);
    /// ```
    pub fn parse(url: &str) -> Result<DataUrl> {
        let caps = RE_DATA_URL
            .captures(url.trim())
            .ok_or_else(|| Error::InvalidDataUrl(describe(url)))?;
        let mime = caps
            .get(1)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_else(|| "text/plain".to_string());
        let payload = caps.get(4).map_or("", |m| m.as_str());
        let data = if caps.get(3).is_some() {
            let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
            STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| Error::InvalidDataUrl(format!("bad base64 payload: {}", e)))?
        } else {
            payload.as_bytes().to_vec()
        };
        Ok(DataUrl { mime, data })
    }

    /// Whether the media type is an image.
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Encode bytes as a base64 `data:` URL.
///
/// # Examples
///
/// ```
/// use snapguide::raster::encode_data_url;
///
/// assert_eq!(encode_data_url("image/jpeg", &[1, 2, 3]), "data:image/jpeg;base64,AQID");
/// ```
pub fn encode_data_url(mime: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

fn describe(url: &str) -> String {
    let head: String = url.chars().take(32).collect();
    if url.starts_with("data:") {
        format!("malformed data URL '{}...'", head)
    } else {
        format!("not a data URL: '{}'", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_params() {
        let url = DataUrl::parse("data:image/jpeg;name=shot.jpg;base64,AQID").unwrap();
        assert_eq!(url.mime, "image/jpeg");
        assert_eq!(url.data, vec![1, 2, 3]);
        assert!(url.is_image());
    }

    #[test]
    fn test_parse_plain_payload() {
        let url = DataUrl::parse("data:,hello").unwrap();
        assert_eq!(url.mime, "text/plain");
        assert_eq!(url.data, b"hello");
        assert!(!url.is_image());
    }

    #[test]
    fn test_whitespace_in_base64_is_ignored() {
        let url = DataUrl::parse("data:image/png;base64,AQ\nID").unwrap();
        assert_eq!(url.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_rejects_non_data_urls() {
        assert!(matches!(
            DataUrl::parse("https://example.com/a.png"),
            Err(Error::InvalidDataUrl(_))
        ));
        assert!(DataUrl::parse("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_encode_parse() {
        let encoded = encode_data_url("image/png", b"\x89PNG");
        assert_eq!(DataUrl::parse(&encoded).unwrap().data, b"\x89PNG");
    }
}
