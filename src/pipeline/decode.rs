/// Payload decoding: data-URI / base64 text or raw encoded bytes into a
/// `DynamicImage` (PNG/JPEG/BMP/GIF).

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use image::DynamicImage;

use crate::error::{Error, Result};

/// Standard alphabet; accepts input with or without `=` padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Image data as it arrives in a request.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePayload {
    /// `data:image/...;base64,<payload>` or a bare base64 string.
    Text(String),
    /// Encoded image file bytes.
    Bytes(Vec<u8>),
}

impl ImagePayload {
    pub fn is_empty(&self) -> bool {
        match self {
            ImagePayload::Text(s)  => s.trim().is_empty(),
            ImagePayload::Bytes(b) => b.is_empty(),
        }
    }
}

pub fn decode(payload: &ImagePayload) -> Result<DynamicImage> {
    if payload.is_empty() {
        return Err(Error::MissingPayload);
    }
    match payload {
        ImagePayload::Text(text)  => decode_bytes(&decode_text(text)?),
        ImagePayload::Bytes(raw)  => decode_bytes(raw),
    }
}

/// Extracts the binary image from a data URI (everything after the first
/// comma) or from bare base64.  Whitespace inside the payload is ignored.
pub fn decode_text(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    let encoded = if text.starts_with("data:image") {
        let (_, payload) = text
            .split_once(',')
            .ok_or_else(|| Error::Decode("data URI has no ',' separator".into()))?;
        payload
    } else {
        text
    };
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    LENIENT_BASE64
        .decode(compact.as_bytes())
        .map_err(|e| Error::Decode(format!("invalid base64: {}", e)))
}

pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{checkerboard_png, data_uri};

    #[test]
    fn data_uri_and_bare_base64_both_decode() {
        let png = checkerboard_png(4);
        let uri = data_uri(&png);
        let img = decode(&ImagePayload::Text(uri.clone())).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));

        let bare = uri.split_once(',').unwrap().1.to_owned();
        assert!(decode(&ImagePayload::Text(bare)).is_ok());
    }

    #[test]
    fn missing_padding_and_line_breaks_are_tolerated() {
        let uri = data_uri(&checkerboard_png(3));
        let (head, body) = uri.split_once(',').unwrap();
        let wrapped: String = body
            .trim_end_matches('=')
            .as_bytes()
            .chunks(10)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(decode(&ImagePayload::Text(format!("{},{}", head, wrapped))).is_ok());
    }

    #[test]
    fn malformed_base64_is_a_decode_error() {
        let err = decode(&ImagePayload::Text("data:image/png;base64,@@not-base64@@".into())).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn data_uri_without_comma_is_a_decode_error() {
        let err = decode(&ImagePayload::Text("data:image/png;base64".into())).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn non_image_bytes_are_a_decode_error() {
        let err = decode(&ImagePayload::Bytes(b"definitely not a png".to_vec())).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn empty_payload_is_missing() {
        assert!(matches!(decode(&ImagePayload::Text("  ".into())), Err(Error::MissingPayload)));
        assert!(matches!(decode(&ImagePayload::Bytes(vec![])), Err(Error::MissingPayload)));
    }
}
