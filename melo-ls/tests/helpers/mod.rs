//! Test Helper Utilities
//!
//! Shared in-memory sources for exercising melo-ls without network access

#![allow(dead_code)]

pub mod log_capture;
pub mod mock_sources;

pub use log_capture::LogCapture;
pub use mock_sources::{
    catalog_song, record, FailingMetadata, PanickingCatalog, StaticCatalog, StaticMetadata,
};
