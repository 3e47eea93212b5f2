//! Reference implementations of the directory collaborators.

pub mod cache;
pub mod directory;

pub use directory::{CacheStatus, CachedPayload, DirectoryClient};
