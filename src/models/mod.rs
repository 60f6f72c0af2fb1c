pub mod entry;
pub mod image;
pub mod settings;
pub mod storage;

pub use entry::*;
pub use image::*;
pub use settings::*;
pub use storage::*;
