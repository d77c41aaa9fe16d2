//! Image attachments: extension checks and base64 payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::ChatError;
use crate::session::{ContentPart, ImageDetail};

/// Accepted attachment extensions (lowercase) and the MIME type each is sent as.
pub const SUPPORTED_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// A file picked for sending, read fully into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

pub fn mime_type_for(filename: &str) -> Option<&'static str> {
    let (_, extension) = filename.rsplit_once('.')?;
    SUPPORTED_EXTENSIONS
        .iter()
        .find(|(supported, _)| extension.eq_ignore_ascii_case(supported))
        .map(|&(_, mime_type)| mime_type)
}

/// Rejects the whole batch if any file has an unsupported extension.
pub fn validate_all(uploads: &[ImageUpload]) -> Result<(), ChatError> {
    match uploads
        .iter()
        .find(|upload| mime_type_for(&upload.filename).is_none())
    {
        Some(upload) => Err(ChatError::UnsupportedMedia {
            filename: upload.filename.clone(),
        }),
        None => Ok(()),
    }
}

pub fn encode_payload(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(payload)
}

pub fn data_url(mime_type: &str, payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, payload)
}

/// Encodes a validated upload. Callers run `validate_all` first.
pub(crate) fn to_content_part(upload: &ImageUpload, detail: ImageDetail) -> ContentPart {
    ContentPart::Image {
        mime_type: mime_type_for(&upload.filename).unwrap_or("image/jpeg"),
        base64_payload: encode_payload(&upload.bytes),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_matched_case_insensitively() {
        assert_eq!(mime_type_for("photo.PNG"), Some("image/png"));
        assert_eq!(mime_type_for("a.b.JPEG"), Some("image/jpeg"));
        assert_eq!(mime_type_for("anim.gif"), Some("image/gif"));
        assert_eq!(mime_type_for("pic.webp"), Some("image/webp"));
        assert_eq!(mime_type_for("photo.bmp"), None);
        assert_eq!(mime_type_for("README"), None);
    }

    #[test]
    fn every_supported_extension_is_accepted() {
        for &(extension, mime_type) in SUPPORTED_EXTENSIONS {
            let upload = ImageUpload::new(format!("upload.{}", extension.to_uppercase()), vec![0]);
            assert_eq!(validate_all(std::slice::from_ref(&upload)), Ok(()));
            assert_eq!(mime_type_for(&upload.filename), Some(mime_type));
        }
        assert_eq!(mime_type_for("png"), None);
    }

    #[test]
    fn one_bad_file_rejects_the_batch() {
        let uploads = vec![
            ImageUpload::new("ok.png", vec![1]),
            ImageUpload::new("photo.bmp", vec![2]),
        ];
        assert_eq!(
            validate_all(&uploads),
            Err(ChatError::UnsupportedMedia {
                filename: "photo.bmp".to_string()
            })
        );
    }

    #[test]
    fn payload_round_trips_byte_for_byte() {
        let bytes: Vec<u8> = (0..=255).collect();
        let payload = encode_payload(&bytes);
        assert_eq!(decode_payload(&payload).unwrap(), bytes);
    }

    #[test]
    fn content_part_carries_detail_and_mime() {
        let part = to_content_part(&ImageUpload::new("x.jpg", b"abc".to_vec()), ImageDetail::High);
        assert_eq!(
            part,
            ContentPart::Image {
                mime_type: "image/jpeg",
                base64_payload: "YWJj".to_string(),
                detail: ImageDetail::High,
            }
        );
        assert_eq!(data_url("image/jpeg", "YWJj"), "data:image/jpeg;base64,YWJj");
    }
}
