/// Digital filtering.
pub mod filter;

/// Trait interfaces implemented by the signal kernels.
pub mod traits;

/// Window functions.
pub mod windows;

/// Spectral density estimation.
pub mod spectral;

/// Morlet wavelet decomposition.
pub mod wavelet;

/// Band power estimation over time.
pub mod band_power;
