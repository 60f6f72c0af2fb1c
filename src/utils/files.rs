use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::SelectedFile;

/// Declared content type from the file extension. This mirrors what a file
/// picker would report; the compressor still decides whether the bytes
/// decode.
pub fn content_type_for(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
    .to_string()
}

pub fn read_selected_files(paths: &[PathBuf]) -> Result<Vec<SelectedFile>> {
    paths
        .iter()
        .map(|path| {
            let bytes = fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(SelectedFile {
                name: path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unnamed")
                    .to_string(),
                content_type: content_type_for(path),
                bytes,
            })
        })
        .collect()
}
