//! Equivalents of the handful of numpy routines the signal kernels are built on.

mod convolve;

pub use convolve::*;
