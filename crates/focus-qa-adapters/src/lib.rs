//! Focus QA Adapters - External adapters for focus-qa.
//!
//! This crate provides the filesystem image source that discovers and
//! decodes raster images into grayscale buffers.

pub mod fs;

pub use fs::FsImageSource;
