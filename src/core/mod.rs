// src/core/mod.rs
//! Shared plumbing: HTTP gateway, state media and local file handling

pub mod api_client;
pub mod database;
pub mod fs_ops;
pub mod medium;
pub mod memory;

pub use api_client::ApiClient;
pub use database::StateDatabase;
pub use fs_ops::{FsOps, UploadFile};
pub use medium::StateMedium;
pub use memory::MemoryMedium;
