//! Shared building blocks for the `neurosig` crates.
//!
//! Holds the crate-wide [`Error`] type and a small set of numpy-flavoured array helpers in
//! [`num_rs`].
#![no_std]
#![deny(missing_docs)]

extern crate alloc;

mod error;
pub mod num_rs;

pub use error::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = core::result::Result<T, Error>;
