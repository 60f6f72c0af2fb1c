pub mod entry;
pub mod storage;
