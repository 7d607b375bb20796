//! Core domain types and utilities for voxbridge.
//!
//! This crate provides the identifiers and the error-handling foundation
//! shared by every other crate in the workspace.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ChatId, ParseIdError};
