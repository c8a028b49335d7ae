//! Hivecast Core Library
//!
//! This crate provides configuration and the backend descriptors that are shared
//! between the storage drivers and the binaries that construct them.

pub mod config;
pub mod constants;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, SwarmConfig};
pub use storage_types::{StorageType, UploadMode};
