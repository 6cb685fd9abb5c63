//! Power in frequency bands over time, from Morlet decompositions or Welch periodograms.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D};
use crate::signal::spectral::{Detrend, Scaling, WelchConfig, WelchKernel};
use crate::signal::traits::{BandPower, WelchPsd1D};
use crate::signal::wavelet::{MorletConfig, MorletKernel};
use alloc::{format, vec::Vec};
use ndarray::{Array1, Array2, Axis};
use neurosig_core::Result;

/// Spacing of the Welch frequency grid in Hz.
const GRID_STEP: f64 = 0.1;

/// Largest distance in Hz between a requested frequency and its grid point.
const GRID_TOLERANCE: f64 = 1e-6;

/// Constructor config for [`MorletPowerKernel`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MorletPowerConfig {
    /// Sampling frequency in Hz.
    pub sf: f64,
    /// Band edges in Hz; `freqs.len() - 1` contiguous bands.
    pub freqs: Vec<f64>,
    /// Divide every time point by its sum over bands.
    pub norm: bool,
    /// Wavelet width, see [`MorletConfig::width`].
    pub width: f64,
}

impl Default for MorletPowerConfig {
    fn default() -> Self {
        Self {
            sf: 0.,
            freqs: Vec::new(),
            norm: true,
            width: 7.,
        }
    }
}

/// Morlet band power: one wavelet per band midpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct MorletPowerKernel {
    bands: Vec<MorletKernel>,
    norm: bool,
}

impl KernelLifecycle for MorletPowerKernel {
    type Config = MorletPowerConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        if config.freqs.len() < 2 {
            return Err(ConfigError::invalid(
                "freqs",
                format!("at least two band edges are required, got {:?}", config.freqs),
            ));
        }
        if config.freqs.windows(2).any(|e| !(e[0] < e[1])) {
            return Err(ConfigError::invalid(
                "freqs",
                format!("band edges must be strictly increasing, got {:?}", config.freqs),
            ));
        }
        let bands = config
            .freqs
            .windows(2)
            .map(|e| {
                let f = (e[0] + e[1]) / 2.;
                MorletKernel::try_new(MorletConfig {
                    sf: config.sf,
                    f,
                    width: config.width,
                })
                .map_err(|err| match err {
                    ConfigError::InvalidArgument { arg: "f", reason } => ConfigError::invalid(
                        "freqs",
                        format!("band ({}, {}) midpoint: {reason}", e[0], e[1]),
                    ),
                    other => other,
                })
            })
            .collect::<core::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            bands,
            norm: config.norm,
        })
    }
}

impl MorletPowerKernel {
    /// Number of bands.
    pub fn n_bands(&self) -> usize {
        self.bands.len()
    }
}

impl BandPower<f64> for MorletPowerKernel {
    type Output = Array2<f64>;

    fn run_alloc<I>(&self, input: &I) -> core::result::Result<Array2<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let x = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let mut power = Array2::<f64>::zeros((self.bands.len(), x.len()));
        for (band, mut row) in self.bands.iter().zip(power.axis_iter_mut(Axis(0))) {
            let coeffs = band.decompose(x)?;
            row.iter_mut()
                .zip(coeffs)
                .for_each(|(p, c)| *p = c.norm_sqr());
        }
        if self.norm {
            for mut column in power.axis_iter_mut(Axis(1)) {
                let total = column.sum();
                if total > 0. {
                    column.mapv_inplace(|p| p / total);
                }
            }
        }
        Ok(power)
    }
}

/// Morlet power of `x` in the bands delimited by `freqs`.
///
/// Band `b` is represented by its midpoint `(freqs[b] + freqs[b + 1]) / 2`, at which the squared
/// magnitude of [`morlet`](crate::signal::wavelet::morlet) is computed. The result has shape
/// `(freqs.len() - 1, x.len())`. With `norm`, each column is divided by its sum so that it holds
/// the share of each band at that time point; all-zero columns stay zero.
///
/// ```
/// use neurosig::signal::band_power::morlet_power;
///
/// let x: Vec<f64> = (0..512).map(|i| (i as f64 * 0.25).sin()).collect();
/// let p = morlet_power(&x, &[2., 6., 12., 20.], 64., true).unwrap();
/// assert_eq!(p.dim(), (3, 512));
/// assert!((p.column(256).sum() - 1.).abs() < 1e-9);
/// ```
pub fn morlet_power(x: &[f64], freqs: &[f64], sf: f64, norm: bool) -> Result<Array2<f64>> {
    let kernel = MorletPowerKernel::try_new(MorletPowerConfig {
        sf,
        freqs: freqs.to_vec(),
        norm,
        ..Default::default()
    })?;
    log::debug!(
        "morlet_power: sf {sf} Hz, {} bands from edges {freqs:?}, norm {norm}, {} samples",
        kernel.n_bands(),
        x.len()
    );
    Ok(kernel.run_alloc(x)?)
}

/// Constructor config for [`WelchPowerKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WelchPowerConfig {
    /// Sampling frequency in Hz, truncated to an integer.
    pub sf: f64,
    /// Lower band edge in Hz, on the 0.1 Hz grid.
    pub fmin: f64,
    /// Upper band edge in Hz, on the 0.1 Hz grid.
    pub fmax: f64,
    /// Window duration in seconds, greater than 10.
    pub window_s: f64,
    /// Report the band's share of the total power instead of its mean power.
    pub norm: bool,
}

impl Default for WelchPowerConfig {
    fn default() -> Self {
        Self {
            sf: 0.,
            fmin: 0.,
            fmax: 0.,
            window_s: 30.,
            norm: true,
        }
    }
}

/// Welch band power over consecutive non-overlapping windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchPowerKernel {
    welch: WelchKernel,
    segment: usize,
    window: usize,
    imin: usize,
    imax: usize,
    norm: bool,
}

fn grid_index(arg: &'static str, f: f64, top: usize) -> core::result::Result<usize, ConfigError> {
    let idx = (f / GRID_STEP).round();
    if !(f.is_finite() && idx >= 0. && (f - idx * GRID_STEP).abs() <= GRID_TOLERANCE) {
        return Err(ConfigError::invalid(
            arg,
            format!("{f} Hz is not on the {GRID_STEP} Hz frequency grid"),
        ));
    }
    let idx = idx as usize;
    if idx > top {
        return Err(ConfigError::invalid(
            arg,
            format!("{f} Hz is above the Nyquist frequency {} Hz", top as f64 * GRID_STEP),
        ));
    }
    Ok(idx)
}

impl KernelLifecycle for WelchPowerKernel {
    type Config = WelchPowerConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        if !(config.sf.is_finite() && config.sf >= 1.) {
            return Err(ConfigError::invalid(
                "sf",
                format!("sampling frequency must be finite and >= 1, got {}", config.sf),
            ));
        }
        if !(config.window_s.is_finite() && config.window_s > 10.) {
            return Err(ConfigError::invalid(
                "window_s",
                format!("window must be longer than 10 s, got {}", config.window_s),
            ));
        }
        let sf = config.sf.trunc() as usize;
        let segment = sf * 10;
        let top = segment / 2;
        let imin = grid_index("fmin", config.fmin, top)?;
        let imax = grid_index("fmax", config.fmax, top)?;
        if imin > imax {
            return Err(ConfigError::invalid(
                "fmin",
                format!("fmin = {} Hz is above fmax = {} Hz", config.fmin, config.fmax),
            ));
        }
        let welch = WelchKernel::try_new(WelchConfig {
            fs: sf as f64,
            nperseg: segment,
            noverlap: None,
            nfft: Some(segment),
            scaling: Scaling::Spectrum,
            detrend: Detrend::Constant,
        })?;
        Ok(Self {
            welch,
            segment,
            window: (config.window_s * sf as f64) as usize,
            imin,
            imax,
            norm: config.norm,
        })
    }
}

impl WelchPowerKernel {
    /// Samples per window.
    pub fn window_len(&self) -> usize {
        self.window
    }

    fn reduce(&self, pxx: &[f64]) -> f64 {
        let band = &pxx[self.imin..=self.imax];
        let band_sum = band.iter().sum::<f64>();
        if self.norm {
            let total = pxx.iter().sum::<f64>();
            if total > 0. {
                band_sum / total
            } else {
                0.
            }
        } else {
            band_sum / band.len() as f64
        }
    }
}

impl BandPower<f64> for WelchPowerKernel {
    type Output = Array1<f64>;

    fn run_alloc<I>(&self, input: &I) -> core::result::Result<Array1<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let x = input.read_slice().map_err(ExecInvariantViolation::from)?;
        x.chunks(self.window)
            .map(|chunk| {
                if chunk.len() < self.segment {
                    log::warn!(
                        "welch_power: window of {} samples is shorter than one {}-sample \
                         segment, zero-padding its periodogram",
                        chunk.len(),
                        self.segment
                    );
                }
                let (_, pxx) = self.welch.run_alloc(chunk)?;
                log::trace!("welch_power: window of {} samples", chunk.len());
                Ok(self.reduce(&pxx))
            })
            .collect::<core::result::Result<Vec<f64>, ExecInvariantViolation>>()
            .map(Array1::from)
    }
}

/// Welch power in `[fmin, fmax]` over consecutive windows of `window_s` seconds.
///
/// The sampling frequency is truncated to an integer. Each window of `window_s * sf` samples
/// gets a Hann-windowed Welch periodogram with `10 * sf`-sample segments and `spectrum`
/// scaling, giving a 0.1 Hz frequency grid; `fmin` and `fmax` must lie on that grid. A window
/// then reduces to the mean power over the band, or with `norm` to the band's share of the
/// window's total power. The last window may be shorter; when it is shorter than one segment
/// its periodogram is zero-padded to keep the grid.
///
/// Returns `ceil(x.len() / (window_s * sf))` values; an empty input gives an empty output.
///
/// ```
/// use neurosig::signal::band_power::welch_power;
///
/// let x: Vec<f64> = (0..2500).map(|i| (i as f64 * 0.2 * core::f64::consts::PI).sin()).collect();
/// let p = welch_power(&x, 8., 12., 100., 11., true).unwrap();
/// assert_eq!(p.len(), 3);
/// assert!(p.iter().all(|v| *v > 0.9));
/// ```
pub fn welch_power(
    x: &[f64],
    fmin: f64,
    fmax: f64,
    sf: f64,
    window_s: f64,
    norm: bool,
) -> Result<Array1<f64>> {
    let kernel = WelchPowerKernel::try_new(WelchPowerConfig {
        sf,
        fmin,
        fmax,
        window_s,
        norm,
    })?;
    log::debug!(
        "welch_power: sf {sf} Hz, band [{fmin}, {fmax}] Hz, {}-sample windows, norm {norm}, \
         {} samples",
        kernel.window_len(),
        x.len()
    );
    Ok(kernel.run_alloc(x)?)
}
