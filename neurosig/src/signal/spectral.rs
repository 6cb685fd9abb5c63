//! Welch power spectral density, modelled on `scipy.signal.welch`.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D};
use crate::signal::traits::{Spectrum, WelchPsd1D};
use crate::signal::traits::WindowGenerate;
use crate::signal::windows::{WindowConfig, WindowKernel};
use alloc::{format, vec, vec::Vec};
use core::{fmt, str::FromStr};
use neurosig_core::{Error, Result};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Normalisation of the averaged periodogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Scaling {
    /// Power spectral density in `V**2/Hz`, scaled by `1 / (fs * sum(w**2))`.
    #[default]
    Density,
    /// Power spectrum in `V**2`, scaled by `1 / sum(w)**2`.
    Spectrum,
}

impl Scaling {
    /// Lower-case name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Scaling::Density => "density",
            Scaling::Spectrum => "spectrum",
        }
    }
}

impl FromStr for Scaling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "density" => Ok(Scaling::Density),
            "spectrum" => Ok(Scaling::Spectrum),
            other => Err(Error::invalid_arg(
                "scaling",
                format!("expected one of 'density', 'spectrum', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Scaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trend removed from each segment before windowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Detrend {
    /// Leave segments untouched.
    None,
    /// Subtract the segment mean.
    #[default]
    Constant,
}

/// Zero-padded forward transform of `x` into `buf`, whose length is the plan's `nfft`. Only the
/// first `nfft / 2 + 1` bins are meaningful for real input.
fn rfft_real_into(fft: &dyn Fft<f64>, x: &[f64], buf: &mut [Complex<f64>]) {
    buf.fill(Complex::new(0.0, 0.0));
    for (dst, src) in buf.iter_mut().zip(x.iter().copied()) {
        *dst = Complex::new(src, 0.0);
    }
    fft.process(buf);
}

fn onesided_freqs(nfft: usize, fs: f64) -> Vec<f64> {
    let n_freq = nfft / 2 + 1;
    (0..n_freq).map(|k| k as f64 * fs / nfft as f64).collect()
}

fn segment_starts(len: usize, nperseg: usize, noverlap: usize) -> Vec<usize> {
    let hop = nperseg - noverlap;
    (0..)
        .map(|i| i * hop)
        .take_while(|start| start + nperseg <= len)
        .collect()
}

/// Constructor config for [`WelchKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WelchConfig {
    /// Sampling frequency in Hz.
    pub fs: f64,
    /// Segment length. Clipped to the input length.
    pub nperseg: usize,
    /// Samples shared by consecutive segments. `None` selects `nperseg / 2`.
    pub noverlap: Option<usize>,
    /// FFT length, zero-padding each segment. `None` selects `nperseg`.
    pub nfft: Option<usize>,
    /// Output normalisation.
    pub scaling: Scaling,
    /// Per-segment detrending.
    pub detrend: Detrend,
}

impl Default for WelchConfig {
    fn default() -> Self {
        Self {
            fs: 1.,
            nperseg: 256,
            noverlap: None,
            nfft: None,
            scaling: Scaling::Density,
            detrend: Detrend::Constant,
        }
    }
}

/// Welch PSD estimator: Hann-windowed, one-sided, mean-averaged periodograms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchKernel {
    fs: f64,
    nperseg: usize,
    noverlap: Option<usize>,
    nfft: Option<usize>,
    scaling: Scaling,
    detrend: Detrend,
}

impl KernelLifecycle for WelchKernel {
    type Config = WelchConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        if !config.fs.is_finite() || config.fs <= 0.0 {
            return Err(ConfigError::invalid(
                "fs",
                format!("fs must be finite and > 0, got {}", config.fs),
            ));
        }
        if config.nperseg == 0 {
            return Err(ConfigError::invalid("nperseg", "nperseg must be > 0"));
        }
        if let Some(noverlap) = config.noverlap.filter(|n| *n >= config.nperseg) {
            return Err(ConfigError::invalid(
                "noverlap",
                format!(
                    "noverlap must be less than nperseg = {}, got {noverlap}",
                    config.nperseg
                ),
            ));
        }
        if let Some(nfft) = config.nfft.filter(|n| *n < config.nperseg) {
            return Err(ConfigError::invalid(
                "nfft",
                format!("nfft must be >= nperseg = {}, got {nfft}", config.nperseg),
            ));
        }
        Ok(Self {
            fs: config.fs,
            nperseg: config.nperseg,
            noverlap: config.noverlap,
            nfft: config.nfft,
            scaling: config.scaling,
            detrend: config.detrend,
        })
    }
}

impl WelchKernel {
    /// Number of one-sided frequency bins produced for an input of `input_len` samples.
    pub fn expected_len(&self, input_len: usize) -> usize {
        let nperseg = self.nperseg.min(input_len);
        self.nfft.unwrap_or(nperseg).max(nperseg) / 2 + 1
    }

    fn estimate(&self, x: &[f64]) -> core::result::Result<Spectrum<f64>, ExecInvariantViolation> {
        if x.is_empty() {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "welch input must be non-empty",
            });
        }
        let nperseg = self.nperseg.min(x.len());
        if nperseg < self.nperseg {
            log::trace!("welch: nperseg {} clipped to input length {nperseg}", self.nperseg);
        }
        let noverlap = self.noverlap.unwrap_or(nperseg / 2);
        if noverlap >= nperseg {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "noverlap must be less than the segment length",
            });
        }
        let nfft = self.nfft.unwrap_or(nperseg).max(nperseg);

        let window = WindowKernel::try_new(WindowConfig {
            nx: nperseg,
            sym: false,
        })?
        .run_alloc()?;
        let scale = match self.scaling {
            Scaling::Density => 1. / (self.fs * window.iter().map(|w| w * w).sum::<f64>()),
            Scaling::Spectrum => 1. / window.iter().sum::<f64>().powi(2),
        };
        let n_freq = nfft / 2 + 1;
        let starts = segment_starts(x.len(), nperseg, noverlap);
        let mut accum = vec![0.0; n_freq];
        let mut segment = vec![0.0; nperseg];
        let fft = FftPlanner::<f64>::new().plan_fft_forward(nfft);
        let mut spec = vec![Complex::new(0.0, 0.0); nfft];
        for &start in &starts {
            let raw = &x[start..start + nperseg];
            let mean = match self.detrend {
                Detrend::None => 0.,
                Detrend::Constant => raw.iter().sum::<f64>() / nperseg as f64,
            };
            segment
                .iter_mut()
                .zip(raw.iter().zip(&window))
                .for_each(|(s, (v, w))| *s = (v - mean) * w);
            rfft_real_into(fft.as_ref(), &segment, &mut spec);
            for (k, (a, c)) in accum.iter_mut().zip(&spec[..n_freq]).enumerate() {
                let mut p = c.norm_sqr() * scale;
                // fold negative frequencies, except DC and an even-length Nyquist bin
                if k != 0 && !(nfft % 2 == 0 && k == nfft / 2) {
                    p *= 2.;
                }
                *a += p;
            }
        }

        let inv = 1.0 / starts.len() as f64;
        accum.iter_mut().for_each(|v| *v *= inv);
        Ok((onesided_freqs(nfft, self.fs), accum))
    }
}

impl WelchPsd1D<f64> for WelchKernel {
    fn run_alloc<I>(
        &self,
        input: &I,
    ) -> core::result::Result<Spectrum<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        self.estimate(input)
    }
}

/// Estimate the power spectral density of `x` with Welch's method.
///
/// `x` is split into segments of `nperseg` samples overlapping by `noverlap`. Each segment is
/// detrended, multiplied by a periodic Hann window and transformed; the one-sided
/// periodograms are averaged. Returns `(freqs, pxx)` with `nfft / 2 + 1` bins.
///
/// ```
/// use neurosig::signal::spectral::{welch, Scaling, WelchConfig};
///
/// let fs = 100.;
/// let x: Vec<f64> = (0..400)
///     .map(|i| (2. * core::f64::consts::PI * 10. * i as f64 / fs).sin())
///     .collect();
/// let (f, pxx) = welch(
///     &x,
///     WelchConfig { fs, nperseg: 100, scaling: Scaling::Spectrum, ..Default::default() },
/// )
/// .unwrap();
/// assert_eq!(f[10], 10.);
/// assert!((pxx[10] - 0.5).abs() < 1e-9);
/// ```
pub fn welch(x: &[f64], config: WelchConfig) -> Result<Spectrum<f64>> {
    let kernel = WelchKernel::try_new(config)?;
    Ok(kernel.run_alloc(x)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use core::f64::consts::PI;
    use crate::signal::windows::hann;

    fn test_signal() -> Vec<f64> {
        let fs = 100.0;
        (0..512)
            .map(|i| {
                let t = i as f64 / fs;
                (2.0 * PI * 5.0 * t).sin() + 0.2 * (2.0 * PI * 12.0 * t).sin()
            })
            .collect()
    }

    fn config(fs: f64, nperseg: usize) -> WelchConfig {
        WelchConfig {
            fs,
            nperseg,
            ..Default::default()
        }
    }

    #[test]
    fn welch_detects_main_frequency_bin() {
        let x = test_signal();
        let (f, pxx) = welch(&x, config(100.0, 128)).unwrap();
        let (idx, _) = pxx
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .expect("max bin");
        assert_abs_diff_eq!(f[idx], 5.0, epsilon = 1.0);
        assert_eq!(f.len(), 65);
        assert_eq!(pxx.len(), 65);
    }

    #[test]
    fn spectrum_scaling_recovers_sine_power() {
        let fs = 100.;
        let x: Vec<f64> = (0..400)
            .map(|i| 2. * (2. * PI * 10. * i as f64 / fs).sin())
            .collect();
        let (_, pxx) = welch(
            &x,
            WelchConfig {
                scaling: Scaling::Spectrum,
                ..config(fs, 100)
            },
        )
        .unwrap();
        // A**2 / 2 for a bin-centred sine of amplitude A
        assert_relative_eq!(pxx[10], 2., epsilon = 1e-9);
        assert!(pxx[20] < 1e-12);
    }

    #[test]
    fn density_and_spectrum_differ_by_window_gain() {
        let x = test_signal();
        let (_, density) = welch(&x, config(100., 64)).unwrap();
        let (_, spectrum) = welch(
            &x,
            WelchConfig {
                scaling: Scaling::Spectrum,
                ..config(100., 64)
            },
        )
        .unwrap();
        let w = hann(64, false);
        let ratio = w.iter().sum::<f64>().powi(2) / (100. * w.iter().map(|v| v * v).sum::<f64>());
        density
            .iter()
            .zip(&spectrum)
            .for_each(|(d, s)| assert_relative_eq!(*d, s * ratio, max_relative = 1e-9));
    }

    #[test]
    fn constant_detrend_removes_offset() {
        let x: Vec<f64> = test_signal().iter().map(|v| v + 3.).collect();
        let (_, detrended) = welch(&x, config(100., 128)).unwrap();
        let (_, raw) = welch(
            &x,
            WelchConfig {
                detrend: Detrend::None,
                ..config(100., 128)
            },
        )
        .unwrap();
        assert!(raw[0] > 1.);
        assert!(detrended[0] < raw[0] / 100.);
    }

    #[test]
    fn nfft_zero_pads_to_a_finer_grid() {
        let x = test_signal();
        let (f, pxx) = welch(
            &x,
            WelchConfig {
                nfft: Some(1000),
                ..config(100., 128)
            },
        )
        .unwrap();
        assert_eq!(f.len(), 501);
        assert_eq!(pxx.len(), 501);
        assert_relative_eq!(f[1], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn short_input_clips_segment_length() {
        let x = [1., 2., 0., -1., 0.5];
        let kernel = WelchKernel::try_new(config(10., 64)).unwrap();
        assert_eq!(kernel.expected_len(x.len()), 3);
        let (f, pxx) = kernel.run_alloc(&x).unwrap();
        assert_eq!(f.len(), 3);
        assert_eq!(pxx.len(), 3);
    }

    #[test]
    fn welch_kernel_contracts_validate_config() {
        assert!(matches!(
            WelchKernel::try_new(config(100.0, 0)),
            Err(ConfigError::InvalidArgument { arg: "nperseg", .. })
        ));
        assert!(matches!(
            WelchKernel::try_new(config(0.0, 8)),
            Err(ConfigError::InvalidArgument { arg: "fs", .. })
        ));
        assert!(matches!(
            WelchKernel::try_new(WelchConfig {
                noverlap: Some(8),
                ..config(1., 8)
            }),
            Err(ConfigError::InvalidArgument { arg: "noverlap", .. })
        ));
        assert!(matches!(
            WelchKernel::try_new(WelchConfig {
                nfft: Some(4),
                ..config(1., 8)
            }),
            Err(ConfigError::InvalidArgument { arg: "nfft", .. })
        ));
        let kernel = WelchKernel::try_new(config(1., 8)).unwrap();
        assert!(matches!(
            kernel.run_alloc(&Vec::<f64>::new()),
            Err(ExecInvariantViolation::InvalidState { .. })
        ));
    }

    #[test]
    fn scaling_parses() {
        assert_eq!("spectrum".parse::<Scaling>().unwrap(), Scaling::Spectrum);
        assert!(matches!(
            "magnitude".parse::<Scaling>(),
            Err(Error::InvalidArg { ref arg, .. }) if arg == "scaling"
        ));
    }

    #[test]
    fn padded_segments_do_not_leak_into_each_other() {
        let segment: Vec<f64> = (0..100).map(|i| ((i * 13 % 17) as f64).sin()).collect();
        let cfg = WelchConfig {
            noverlap: Some(0),
            nfft: Some(256),
            ..config(100., 100)
        };
        let (_, single) = welch(&segment, cfg).unwrap();
        let repeated = [segment.as_slice(), segment.as_slice(), segment.as_slice()].concat();
        let (_, averaged) = welch(&repeated, cfg).unwrap();
        assert_eq!(averaged.len(), 129);
        single
            .iter()
            .zip(&averaged)
            .for_each(|(a, b)| assert_relative_eq!(*a, *b, max_relative = 1e-12, epsilon = 1e-15));
    }
}
