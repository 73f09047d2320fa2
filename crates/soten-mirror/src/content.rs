//! File content classification
//!
//! Text files are decoded as UTF-8. Everything else is kept as a binary blob
//! tagged with a MIME type derived from the file extension.

use crate::error::StoreError;
use bytes::Bytes;
use std::path::Path;

const OCTET_STREAM: &str = "application/octet-stream";

const TEXT_EXTENSIONS: &[&str] = &[
    "md", "markdown", "mdx", "txt", "text", "org", "rst", "adoc", "json", "yaml", "yml",
    "toml", "csv", "tsv", "html", "htm", "css", "js", "ts", "xml", "ini", "cfg", "conf",
    "log", "tex", "bib",
];

const MIME_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("bmp", "image/bmp"),
    ("ico", "image/x-icon"),
    ("avif", "image/avif"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("pdf", "application/pdf"),
];

/// How a file's bytes are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Image,
}

/// Binary content with its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime: &'static str,
    pub bytes: Bytes,
}

/// Materialized content of one mirrored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Image(Blob),
}

impl FileContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            FileContent::Text(_) => ContentKind::Text,
            FileContent::Image(_) => ContentKind::Image,
        }
    }

    /// Decode raw bytes read from `path` according to its extension
    pub fn decode(path: &str, bytes: Vec<u8>) -> Result<Self, StoreError> {
        match classify(path) {
            ContentKind::Text => String::from_utf8(bytes)
                .map(FileContent::Text)
                .map_err(|_| StoreError::InvalidUtf8(path.to_string())),
            ContentKind::Image => Ok(FileContent::Image(Blob {
                mime: mime_type(path),
                bytes: Bytes::from(bytes),
            })),
        }
    }
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// Text for known text extensions and extension-less files, image otherwise
pub fn classify(path: &str) -> ContentKind {
    match extension(path) {
        None => ContentKind::Text,
        Some(ext) if TEXT_EXTENSIONS.contains(&ext.as_str()) => ContentKind::Text,
        Some(_) => ContentKind::Image,
    }
}

/// MIME type by extension, `application/octet-stream` when unknown
pub fn mime_type(path: &str) -> &'static str {
    extension(path)
        .and_then(|ext| {
            MIME_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(OCTET_STREAM)
}
