// src/lib.rs
//! Headless client for the recruiting pipeline backend: persisted state
//! slices, candidate filtering, streamed document analysis and the
//! company/project/position navigation tree.

pub mod analysis;
pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod filter;
pub mod services;
pub mod store;
pub mod tree;
pub mod types;

pub use auth::AuthSession;
pub use config::ClientConfig;
pub use core::{ApiClient, StateDatabase, StateMedium};
pub use error::{ApiError, ApiResult};

/// Structured logging entry point used across the crate.
///
/// `app_log!(info, "Loaded {} candidates", n)` expands to `tracing::info!`.
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}
