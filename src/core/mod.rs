//! Core types and utilities for RaptorAlloc.

pub mod config;
pub mod error;
pub mod linalg;
pub mod rng;
pub mod types;

pub use config::RunConfig;
pub use error::{AllocError, Result};
pub use rng::Xoshiro256;
pub use types::*;
