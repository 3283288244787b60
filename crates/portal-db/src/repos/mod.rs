//! Repository modules for every stored collection.
//!
//! Each module adds methods to `PortalDb` via `impl PortalDb` blocks.

pub mod applications;
pub mod blobs;
pub mod codes;
pub mod config;
pub mod settings;
