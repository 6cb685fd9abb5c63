//! Trait interfaces for signal-processing capabilities.
//!
//! Kernels implement these over the [`Read1D`]/[`Write1D`] adapters. `run_into` writes into a
//! caller-provided buffer of the exact output length; `run_alloc` allocates.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};

use alloc::vec::Vec;
use nalgebra::Complex;

/// Output of a spectral estimate: sample frequencies and the matching power values.
pub type Spectrum<T> = (Vec<T>, Vec<T>);

/// 1D `lfilter` capability.
pub trait LFilter1D<T> {
    /// Run filtering into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Run filtering and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D `filtfilt` capability.
pub trait FiltFilt1D<T> {
    /// Run zero-phase filtering into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Run zero-phase filtering and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// IIR design capability.
pub trait IirDesign<T> {
    /// Output representation produced by the design kernel.
    type Output;

    /// Run IIR design and allocate output representation.
    fn run_alloc(&self) -> Result<Self::Output, ExecInvariantViolation>;
}

/// Complex Morlet decomposition of a real 1D signal.
pub trait Morlet1D<T> {
    /// Decompose into a caller-provided buffer of the input length.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<Complex<T>> + ?Sized;

    /// Decompose and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<Complex<T>>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Welch power spectral density estimate of a 1D signal.
pub trait WelchPsd1D<T> {
    /// Estimate the spectrum, returning `(freqs, pxx)`.
    fn run_alloc<I>(&self, input: &I) -> Result<Spectrum<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Band power estimation over time.
pub trait BandPower<T> {
    /// Band power representation produced by the kernel.
    type Output;

    /// Estimate band power of `input` and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Self::Output, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Window generation capability.
pub trait WindowGenerate<T> {
    /// Run window generation into a caller-provided output buffer.
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<T> + ?Sized;

    /// Run window generation and allocate output samples.
    fn run_alloc(&self) -> Result<Vec<T>, ExecInvariantViolation>;
}
