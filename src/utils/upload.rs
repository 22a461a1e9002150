//! Client-side checks applied before a file is uploaded.
//!
//! The backend enforces its own limits; these mirror them so obvious
//! rejects never leave the machine.

use std::path::Path;

/// Hard ceiling on upload size.
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// File types the backend knows how to extract text from.
pub const SUPPORTED_EXTENSIONS: [&str; 8] =
    ["pdf", "doc", "docx", "hwp", "txt", "jpg", "jpeg", "png"];

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Whether the extension is one the backend advertises support for.
/// Unknown extensions are advisory only; the upload still goes out.
pub fn is_supported_extension(file_name: &str) -> bool {
    extension(file_name).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Rejects uploads the backend is certain to refuse: archives and
/// anything over [`MAX_UPLOAD_BYTES`].
pub fn validate_upload(file_name: &str, size: u64) -> Result<(), String> {
    if extension(file_name).as_deref() == Some("zip") {
        return Err(format!(
            "{file_name}: archives are not accepted, upload the document itself"
        ));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(format!(
            "{file_name}: {size} bytes exceeds the {MAX_UPLOAD_BYTES} byte upload limit"
        ));
    }
    Ok(())
}
