//! Local input checks applied by the controllers before anything is sent.

use crate::error::ValidationError;
use crate::types::UploadFile;

pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Extensions accepted by the uploaders: images, PDF, CAD drawings and STEP models.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff", "svg", "pdf", "dwg", "dxf", "step", "stp",
];

/// Trim and reject blank text. Returns the trimmed slice on success.
pub fn non_blank(text: &str, on_empty: ValidationError) -> Result<&str, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(on_empty)
    } else {
        Ok(trimmed)
    }
}

pub fn upload_file(file: Option<&UploadFile>, max_bytes: u64) -> Result<&UploadFile, ValidationError> {
    let file = file.ok_or(ValidationError::MissingFile)?;
    if file.size > max_bytes {
        return Err(ValidationError::FileTooLarge { size: file.size, limit: max_bytes });
    }
    let extension = file.extension().unwrap_or_default();
    if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ValidationError::UnsupportedFileType { extension });
    }
    Ok(file)
}
