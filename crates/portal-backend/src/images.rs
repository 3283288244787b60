//! Inline image proofs.
//!
//! Browsers submit image proofs as `data:image/<type>;base64,<payload>` URIs.
//! Before an application is persisted each one is decoded, stored as a blob,
//! and replaced by its blob id.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::PortalError;

/// Largest accepted decoded image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime: String,
    pub data: Vec<u8>,
}

/// Decode a base64 `data:image/...` URI.
///
/// # Errors
///
/// Returns `PortalError::Validation` if the URI is not a base64 image URI,
/// the payload does not decode, or the image exceeds [`MAX_IMAGE_BYTES`].
pub fn decode_data_uri(uri: &str) -> Result<InlineImage, PortalError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| PortalError::Validation("image proof is not a data URI".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| PortalError::Validation("data URI has no payload".into()))?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();
    if !mime.starts_with("image/") {
        return Err(PortalError::Validation(format!(
            "data URI type '{mime}' is not an image"
        )));
    }
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(PortalError::Validation(
            "image data URI must be base64 encoded".into(),
        ));
    }

    let data = STANDARD
        .decode(payload.trim())
        .map_err(|e| PortalError::Validation(format!("image payload is not valid base64: {e}")))?;
    if data.is_empty() {
        return Err(PortalError::Validation("image payload is empty".into()));
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(PortalError::Validation(format!(
            "image is {} bytes, limit is {MAX_IMAGE_BYTES}",
            data.len()
        )));
    }
    Ok(InlineImage { mime, data })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn decodes_png_uri() {
        let image = decode_data_uri("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.data, vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn extra_parameters_are_tolerated() {
        let image = decode_data_uri("data:image/jpeg;name=cat.jpg;base64,/9j/").unwrap();
        assert_eq!(image.mime, "image/jpeg");
    }

    #[rstest]
    #[case("https://cdn.example.com/a.png")]
    #[case("data:text/plain;base64,aGk=")]
    #[case("data:image/png,rawbytes")]
    #[case("data:image/png;base64,%%%")]
    #[case("data:image/png;base64,")]
    #[case("data:image/png;base64")]
    fn rejects_malformed(#[case] uri: &str) {
        assert!(matches!(
            decode_data_uri(uri),
            Err(PortalError::Validation(_))
        ));
    }
}
