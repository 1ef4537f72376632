pub mod browser;
pub mod downloader;
pub mod extract;
