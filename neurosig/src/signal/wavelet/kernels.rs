//! Kernels for Morlet decomposition.

use super::morlet_wavelet_unchecked;
use crate::kernel::{
    bind_output, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D,
};
use crate::signal::traits::Morlet1D;
use alloc::{format, vec::Vec};
use nalgebra::Complex;
use ndarray::ArrayView1;
use neurosig_core::num_rs::{convolve, ConvolveMode};
use neurosig_core::Result;

/// Constructor config for [`MorletKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MorletConfig {
    /// Sampling frequency in Hz.
    pub sf: f64,
    /// Centre frequency in Hz.
    pub f: f64,
    /// Number of oscillations under the Gaussian envelope.
    pub width: f64,
}

impl Default for MorletConfig {
    fn default() -> Self {
        Self {
            sf: 0.,
            f: 0.,
            width: 7.,
        }
    }
}

impl MorletConfig {
    pub(crate) fn validate(&self) -> core::result::Result<(), ConfigError> {
        if !(self.sf.is_finite() && self.sf > 0.) {
            return Err(ConfigError::invalid(
                "sf",
                format!("sampling frequency must be finite and > 0, got {}", self.sf),
            ));
        }
        let nyquist = self.sf / 2.;
        if !(self.f > 0. && self.f < nyquist) {
            return Err(ConfigError::invalid(
                "f",
                format!("frequency {} Hz must satisfy 0 < f < sf/2 = {nyquist} Hz", self.f),
            ));
        }
        if !(self.width.is_finite() && self.width > 0.) {
            return Err(ConfigError::invalid(
                "width",
                format!("width must be finite and > 0, got {}", self.width),
            ));
        }
        Ok(())
    }
}

/// Complex Morlet decomposition at a single frequency.
///
/// The wavelet is built once at construction and convolved with every input.
#[derive(Debug, Clone, PartialEq)]
pub struct MorletKernel {
    wavelet: Vec<Complex<f64>>,
}

impl KernelLifecycle for MorletKernel {
    type Config = MorletConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        let wavelet = morlet_wavelet_unchecked(config.sf, config.f, config.width);
        if wavelet.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "wavelet" });
        }
        Ok(Self { wavelet })
    }
}

impl MorletKernel {
    /// The sampled wavelet.
    pub fn wavelet(&self) -> &[Complex<f64>] {
        &self.wavelet
    }

    /// Convolve `x` with the wavelet and keep the `x.len()` samples centred on `x`.
    pub(crate) fn decompose(&self, x: &[f64]) -> Result<Vec<Complex<f64>>> {
        if x.is_empty() {
            return Ok(Vec::new());
        }
        let signal: Vec<Complex<f64>> = x.iter().map(|v| Complex::new(*v, 0.)).collect();
        let full = convolve(
            ArrayView1::from(signal.as_slice()),
            ArrayView1::from(self.wavelet.as_slice()),
            ConvolveMode::Full,
        )?;
        let m = self.wavelet.len();
        let start = m.div_ceil(2) - 1;
        let end = full.len() - m / 2;
        Ok(full.slice(ndarray::s![start..end]).to_vec())
    }
}

impl Morlet1D<f64> for MorletKernel {
    fn run_into<I, O>(
        &self,
        input: &I,
        out: &mut O,
    ) -> core::result::Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<Complex<f64>> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let out = bind_output(out, input.len())?;
        out.copy_from_slice(&self.decompose(input)?);
        Ok(())
    }

    fn run_alloc<I>(
        &self,
        input: &I,
    ) -> core::result::Result<Vec<Complex<f64>>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        Ok(self.decompose(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn kernel(sf: f64, f: f64, width: f64) -> MorletKernel {
        MorletKernel::try_new(MorletConfig { sf, f, width }).expect("valid morlet config")
    }

    /// Textbook full convolution `sum_k x[k] w[j - k]`, trimmed to the centred `x.len()` samples.
    fn direct_morlet(x: &[f64], w: &[Complex<f64>]) -> Vec<Complex<f64>> {
        let (n, m) = (x.len(), w.len());
        let full: Vec<Complex<f64>> = (0..n + m - 1)
            .map(|j| {
                (j.saturating_sub(m - 1)..=j.min(n - 1))
                    .map(|k| w[j - k] * x[k])
                    .sum()
            })
            .collect();
        full[m.div_ceil(2) - 1..full.len() - m / 2].to_vec()
    }

    fn assert_matches_direct(k: &MorletKernel, x: &[f64]) {
        let got = k.run_alloc(x).unwrap();
        let want = direct_morlet(x, k.wavelet());
        assert_eq!(got.len(), want.len());
        let scale = want.iter().map(|c| c.norm()).fold(0., f64::max);
        for (g, w) in got.iter().zip(&want) {
            assert!((g - w).norm() <= 1e-9 * scale, "{g} vs {w}");
            if w.norm() > 1e-3 * scale {
                assert_relative_eq!(g.arg(), w.arg(), epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn short_wavelet_matches_direct_convolution() {
        let k = kernel(256., 10., 7.);
        assert_eq!(k.wavelet().len(), 200);
        let x: Vec<f64> = (0..600)
            .map(|i| (2. * core::f64::consts::PI * 10. * i as f64 / 256.).sin() + 0.01 * i as f64)
            .collect();
        assert_matches_direct(&k, &x);
    }

    #[test]
    fn long_wavelet_matches_direct_convolution() {
        let k = kernel(256., 2., 7.);
        assert!(k.wavelet().len() > 300);
        let x: Vec<f64> = (0..300).map(|i| ((i * 7 % 11) as f64 - 5.) / 3.).collect();
        assert_matches_direct(&k, &x);
        assert_matches_direct(&k, &x[..1]);
    }

    #[test]
    fn phase_advances_with_positive_frequency() {
        let (sf, f) = (256., 10.);
        let k = kernel(sf, f, 7.);
        let x: Vec<f64> = (0..1024)
            .map(|i| (2. * core::f64::consts::PI * f * i as f64 / sf).cos())
            .collect();
        let y = k.run_alloc(&x).unwrap();
        let step = 2. * core::f64::consts::PI * f / sf;
        for n in 300..700 {
            assert_relative_eq!((y[n + 1] / y[n]).arg(), step, epsilon = 1e-3);
        }
    }

    #[test]
    fn impulse_response_is_centred_wavelet() {
        let k = kernel(10., 1., 2.);
        let m = k.wavelet().len();
        assert_eq!(m, 7);
        let centre = m.div_ceil(2) - 1;

        let mut x = [0.0f64; 21];
        x[10] = 1.;
        let y = k.run_alloc(&x).unwrap();
        assert_eq!(y.len(), x.len());
        for j in 0..m {
            let got = y[10 + j - centre];
            let want = k.wavelet()[j];
            assert_relative_eq!(got.re, want.re, epsilon = 1e-12);
            assert_relative_eq!(got.im, want.im, epsilon = 1e-12);
        }
        assert_eq!(y[0], Complex::new(0., 0.));
    }

    #[test]
    fn wavelet_longer_than_signal_keeps_length() {
        let k = kernel(256., 2., 7.);
        assert!(k.wavelet().len() > 50);
        let x: Vec<f64> = (0..50).map(|i| (i as f64 * 0.1).sin()).collect();
        assert_eq!(k.run_alloc(&x).unwrap().len(), 50);
        assert_eq!(k.run_alloc(&[1.0]).unwrap().len(), 1);
        assert!(k.run_alloc(&Vec::<f64>::new()).unwrap().is_empty());
    }

    #[test]
    fn run_into_checks_output_length() {
        let k = kernel(100., 10., 7.);
        let x = [0.5f64; 16];
        let mut out = vec![Complex::new(0., 0.); 16];
        k.run_into(&x, &mut out).unwrap();
        assert_eq!(out, k.run_alloc(&x).unwrap());

        let mut short = vec![Complex::new(0., 0.); 4];
        assert!(matches!(
            k.run_into(&x, &mut short),
            Err(ExecInvariantViolation::LengthMismatch { expected: 16, got: 4, .. })
        ));
    }

    #[test]
    fn config_validation_names_the_argument() {
        for (config, arg) in [
            (MorletConfig { sf: 0., f: 1., width: 7. }, "sf"),
            (MorletConfig { sf: 100., f: 50., width: 7. }, "f"),
            (MorletConfig { sf: 100., f: -1., width: 7. }, "f"),
            (MorletConfig { sf: 100., f: f64::NAN, width: 7. }, "f"),
            (MorletConfig { sf: 100., f: 10., width: 0. }, "width"),
        ] {
            match MorletKernel::try_new(config) {
                Err(ConfigError::InvalidArgument { arg: got, .. }) => assert_eq!(got, arg),
                other => panic!("{config:?} should fail on {arg}, got {other:?}"),
            }
        }
    }
}
