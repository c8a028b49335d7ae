//! Hivecast Storage Library
//!
//! This crate provides the driver/session storage abstraction used by hivecast
//! and its Swarm implementation.
//!
//! # Object names
//!
//! A session is created for one logical output path (for example
//! `videos/stream1`). Names passed to a session are resolved against that path
//! with lexical cleaning, so `../` segments and duplicate separators never reach
//! the backend. Paths ending in `.m3u8` are treated as playlists; everything
//! else is immutable segment content.

pub mod content;
pub mod factory;
pub mod paths;
#[cfg(feature = "storage-swarm")]
pub mod swarm;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-swarm")]
pub use factory::create_driver;
pub use factory::select_driver;
pub use hivecast_core::StorageType;
#[cfg(feature = "storage-swarm")]
pub use swarm::{SwarmDriver, SwarmSession, TokenCache};
pub use traits::{ObjectSession, ObjectStoreDriver, StorageError, StorageResult};
