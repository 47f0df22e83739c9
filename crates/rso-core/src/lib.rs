//! RSO Core - Container types, the storage allocator, and shared errors
//!
//! This crate provides the foundational types used across all RSO components.
//! The allocator is a pure function: it owns no state and never fails for
//! non-negative input.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod allocator;
pub mod error;
pub mod types;
pub mod util;

pub use allocator::{optimize, Allocator, AllocatorParams};
pub use error::{Result, RsoError};
pub use types::*;
