//! Digital IIR filtering: design, causal and zero-phase application, and the one-call
//! [`filt`] band filter.

/// Digital IIR filter design.
/// Modelled on the [`Filter design` section of
/// `scipy.signal`](https://docs.scipy.org/doc/scipy/reference/signal.html#filter-design).
pub mod design;

pub(crate) mod arraytools;
mod filt;
mod filtfilt;
mod kernels;
mod lfilter;

pub use filt::*;
pub use filtfilt::*;
pub use kernels::*;
pub use lfilter::*;
