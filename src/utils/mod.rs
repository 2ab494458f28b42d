pub mod browser;
pub mod format;
pub mod media;
pub mod storage;
