pub mod image_compressor;
pub mod tracker;
