//! Signal-processing core for neurophysiological time series.
//!
//! * [`signal::filter`]: Butterworth and Bessel IIR design, causal and zero-phase filtering,
//!   and the one-call [`filt`] band filter.
//! * [`signal::wavelet`]: complex Morlet wavelets and their convolution with 1D or
//!   N-dimensional signals.
//! * [`signal::spectral`]: Welch power spectral density.
//! * [`signal::band_power`]: band power over time from Morlet or Welch estimates.
//!
//! Every operation is available as a free function mirroring its Python counterpart and as a
//! kernel built from a validated config through [`kernel::KernelLifecycle`].
#![deny(missing_docs)]

extern crate alloc;

/// Kernel lifecycle, buffer adapters and their errors.
pub mod kernel;

/// Linear algebra helpers: companion matrices and polynomial roots.
pub mod linalg;

/// Filtering, wavelets, spectra and band power.
pub mod signal;

pub use nalgebra as na;
pub use neurosig_core::{Error, Result};

pub use signal::band_power::{morlet_power, welch_power};
pub use signal::filter::filt;
pub use signal::wavelet::{morlet, morlet_wavelet, ndmorlet};
