//! Core types, errors, and configuration for the `studygate` service.
//!
//! This crate establishes the foundational building blocks used throughout
//! the workspace. It carries no I/O of its own.
//!
//! ## Key Components
//!
//! - **`errors`**: Defines the primary `Error` enum and `Result` type alias,
//!   centralizing all failure modes for predictable error handling.
//! - **`config`**: The process-wide `Config` loaded once at startup from
//!   `STUDYGATE_*` environment variables and validated before any request
//!   is served.
//! - **`constants`**: Shared constants such as header names, key-value store
//!   key prefixes, and rate-limit defaults.
//! - **`time`**: Small wall-clock helpers; operational code takes explicit
//!   `now` parameters internally so behavior stays testable.

pub mod config;
pub mod constants;
pub mod errors;
pub mod time;

pub use self::{
    config::{Config, RateLimitSettings},
    errors::{Error, Result},
};
