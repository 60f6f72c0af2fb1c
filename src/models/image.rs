use serde::{Deserialize, Serialize};

/// Output of one compression pass: an inline-embeddable JPEG data URI plus
/// size-reduction metrics. `compression_ratio` is a percentage rounded to one
/// decimal and may be negative when re-encoding inflated the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressedImage {
    pub data_url: String,
    pub file_name: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
}

/// A user-selected file with its declared content type. The content type is
/// taken at face value; only the compressor decides whether the bytes
/// actually decode.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
