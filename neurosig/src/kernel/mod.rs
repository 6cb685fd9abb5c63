//! Shared kernel substrate.
//!
//! Every operation in [`crate::signal`] is backed by a kernel: a struct built from a validated
//! `*Config` through [`KernelLifecycle::try_new`] and run over 1D buffers bound through the
//! [`Read1D`] / [`Write1D`] adapters.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;
