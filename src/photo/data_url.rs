/// Self-contained `data:` URLs for encoded photos
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{SnapError, SnapResult};

pub const JPEG_MIME: &str = "image/jpeg";
pub const PNG_MIME: &str = "image/png";

/// Wrap encoded image bytes into a `data:<mime>;base64,` URL
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Extract the raw bytes of a base64 `data:` URL
pub fn decode_data_url(url: &str) -> SnapResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| SnapError::decode("not a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SnapError::decode("data URL has no payload separator"))?;
    if !header.ends_with(";base64") {
        return Err(SnapError::decode("data URL is not base64 encoded"));
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|e| SnapError::decode(format!("invalid base64 payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_has_mime_header() {
        let url = encode_data_url(JPEG_MIME, &[0xFF, 0xD8, 0xFF]);
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(decode_data_url(&url).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_rejects_malformed_urls() {
        assert!(matches!(
            decode_data_url("https://example.com/a.jpg"),
            Err(SnapError::Decode(_))
        ));
        assert!(decode_data_url("data:image/png;base64").is_err());
        assert!(decode_data_url("data:text/plain,hello").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }
}
