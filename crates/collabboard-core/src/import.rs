//! File import entry points.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kurbo::Size;

/// File extensions accepted by the presentation import trigger.
pub const PRESENTATION_EXTENSIONS: [&str; 3] = ["ppt", "pptx", "pdf"];

/// Size given to newly uploaded images.
pub const DEFAULT_IMAGE_SIZE: Size = Size::new(200.0, 150.0);

/// Whether `file_name` looks like a presentation we accept.
///
/// Accepted files are only logged; their contents are not parsed.
pub fn accepts_presentation(file_name: &str) -> bool {
    let accepted = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            PRESENTATION_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        });
    if accepted {
        log::info!("Presentation selected for import: {file_name}");
    } else {
        log::debug!("Ignoring non-presentation file: {file_name}");
    }
    accepted
}

/// A file picked through the image upload flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Whether the MIME type is an `image/*` type.
    pub fn is_image(&self) -> bool {
        self.mime_type
            .trim()
            .to_ascii_lowercase()
            .strip_prefix("image/")
            .is_some_and(|subtype| !subtype.is_empty())
    }

    /// The upload as a `data:` URL.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type.trim(),
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Split a base64 `data:` URL into its MIME type and decoded bytes.
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime.to_string(), bytes))
}
