//! Export utilities
//!
//! Turns the current editor content into a downloadable artifact. The
//! bytes are the content verbatim; only the metadata differs per format.

use serde::Serialize;

use crate::shared::error::{AppError, AppResult};

pub const MARKDOWN_FILE_NAME: &str = "content.md";
pub const MARKDOWN_MIME_TYPE: &str = "text/markdown;charset=utf-8";
pub const TEXT_FILE_NAME: &str = "content.txt";
pub const TEXT_MIME_TYPE: &str = "text/plain;charset=utf-8";

#[derive(Debug, Clone, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

pub fn export_content(
    content: &str,
    file_name: &str,
    mime_type: &str,
) -> AppResult<ExportArtifact> {
    if content.trim().is_empty() {
        return Err(AppError::Precondition(
            "There is no content to download".to_string(),
        ));
    }

    Ok(ExportArtifact {
        file_name: file_name.to_string(),
        mime_type: mime_type.to_string(),
        bytes: content.as_bytes().to_vec(),
    })
}
