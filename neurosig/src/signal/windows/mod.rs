//! Cosine-sum windows.

use crate::kernel::{bind_output, ConfigError, ExecInvariantViolation, KernelLifecycle, Write1D};
use crate::signal::traits::WindowGenerate;
use alloc::{vec, vec::Vec};
use core::f64::consts::PI;

/// Generic weighted sum of cosine terms.
///
/// `w[n] = sum_k (-1)^k a[k] cos(2 pi k n / (M - 1))` over `M` symmetric samples. With
/// `sym = false` the window is periodic: `M + 1` samples are generated and the last one is
/// dropped, which is the form used for spectral analysis.
///
/// ```
/// use neurosig::signal::windows::general_cosine;
///
/// let w = general_cosine(5, &[0.5, 0.5], true);
/// assert!((w[2] - 1.).abs() < 1e-12);
/// assert!(w[0].abs() < 1e-12 && w[4].abs() < 1e-12);
/// ```
pub fn general_cosine(m: usize, a: &[f64], sym: bool) -> Vec<f64> {
    match m {
        0 => return Vec::new(),
        1 => return vec![1.],
        _ => {}
    }
    let len = if sym { m } else { m + 1 };
    let step = 2. * PI / (len - 1) as f64;
    (0..m)
        .map(|n| {
            let fac = -PI + step * n as f64;
            a.iter()
                .enumerate()
                .map(|(k, ak)| ak * (k as f64 * fac).cos())
                .sum()
        })
        .collect()
}

/// Hann window of `m` samples, `0.5 - 0.5 cos(2 pi n / (M - 1))`.
///
/// ```
/// use neurosig::signal::windows::hann;
///
/// let w = hann(4, false);
/// let expected = [0., 0.5, 1., 0.5];
/// w.iter().zip(expected).for_each(|(a, b)| assert!((a - b).abs() < 1e-12));
/// ```
pub fn hann(m: usize, sym: bool) -> Vec<f64> {
    general_cosine(m, &[0.5, 0.5], sym)
}

/// Constructor config for [`WindowKernel`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowConfig {
    /// Window length.
    pub nx: usize,
    /// Symmetric window when `true`, periodic otherwise.
    pub sym: bool,
}

/// Hann window generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowKernel {
    nx: usize,
    sym: bool,
}

impl KernelLifecycle for WindowKernel {
    type Config = WindowConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.nx == 0 {
            return Err(ConfigError::EmptyInput { arg: "nx" });
        }
        Ok(Self {
            nx: config.nx,
            sym: config.sym,
        })
    }
}

impl WindowGenerate<f64> for WindowKernel {
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<f64> + ?Sized,
    {
        let out = bind_output(out, self.nx)?;
        out.copy_from_slice(&hann(self.nx, self.sym));
        Ok(())
    }

    fn run_alloc(&self) -> Result<Vec<f64>, ExecInvariantViolation> {
        Ok(hann(self.nx, self.sym))
    }
}
