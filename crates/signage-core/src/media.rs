//! Media file helpers.
//!
//! File references are relative paths such as `products/2024/ad1.JPG`.
//! The display type tag sent to stations is the lowercased extension of that
//! path; the coarser [`MediaKind`] is only used where markup has to be chosen.

use crate::store::StoreError;

/// Extensions accepted for uploaded media.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "mp4", "mov", "zip", "jpg", "jpeg", "png", "gif"];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov"];

/// Return the lowercased extension of a file reference, without the dot.
///
/// Only the last path component is considered and leading dots of that
/// component do not start an extension (`.hidden` has none). Returns an
/// empty string when there is no extension.
pub fn media_type_tag(file: &str) -> String {
    let name = file.rsplit(['/', '\\']).next().unwrap_or(file);
    let stem = name.trim_start_matches('.');

    match stem.rfind('.') {
        Some(pos) => stem[pos + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Check a file reference against the upload extension policy.
pub fn validate_media_file(file: &str) -> Result<(), StoreError> {
    let ext = media_type_tag(file);
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(StoreError::InvalidData(format!(
            "file extension not allowed for '{}'; allowed extensions are: {}",
            file,
            ALLOWED_EXTENSIONS.join(", ")
        )))
    }
}

/// Coarse classification of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Document,
    Other,
}

impl MediaKind {
    pub fn from_file(file: &str) -> Self {
        Self::from_tag(&media_type_tag(file))
    }

    pub fn from_tag(tag: &str) -> Self {
        if IMAGE_EXTENSIONS.contains(&tag) {
            MediaKind::Image
        } else if VIDEO_EXTENSIONS.contains(&tag) {
            MediaKind::Video
        } else if tag == "pdf" {
            MediaKind::Document
        } else {
            MediaKind::Other
        }
    }
}

/// Turns stored file references into public URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrlBuilder {
    base: String,
}

impl MediaUrlBuilder {
    /// Create a builder for the given public prefix (e.g. "/media/" or
    /// "https://cdn.example.com/media").
    pub fn new(base: &str) -> Self {
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    /// Resolve a file reference; each path segment is percent-encoded.
    pub fn url(&self, file: &str) -> String {
        let normalized = file.replace('\\', "/");
        let encoded: Vec<String> = normalized
            .trim_start_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}{}", self.base, encoded.join("/"))
    }
}

impl Default for MediaUrlBuilder {
    fn default() -> Self {
        Self::new("/media/")
    }
}
