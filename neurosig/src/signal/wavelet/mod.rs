//! Complex Morlet wavelets and their convolution with sampled signals.

mod kernels;
pub use kernels::*;

use crate::kernel::{ConfigError, KernelLifecycle};
use crate::signal::filter::arraytools::{check_and_get_axis_dyn, map_lanes};
use alloc::{format, vec::Vec};
use core::{f64::consts::PI, fmt, str::FromStr};
use nalgebra::Complex;
use ndarray::{Array, ArrayBase, Data, Dimension};
use neurosig_core::{Error, Result};

/// Sample a complex Morlet wavelet without validating its parameters.
///
/// `t` spans `[-width * st / 2, width * st / 2)` in steps of `1 / sf`, where
/// `st = width / (2 pi f)` is the standard deviation of the Gaussian envelope.
pub(crate) fn morlet_wavelet_unchecked(sf: f64, f: f64, width: f64) -> Vec<Complex<f64>> {
    let dt = 1. / sf;
    let st = 1. / (2. * PI * (f / width));
    let start = -width * st / 2.;
    let stop = width * st / 2.;
    let n = ((stop - start) / dt).ceil().max(0.) as usize;
    let a = 1. / (st * PI.sqrt()).sqrt();
    (0..n)
        .map(|i| {
            let t = start + i as f64 * dt;
            let envelope = a * (-t * t / (2. * st * st)).exp();
            Complex::from_polar(envelope, 2. * PI * f * t)
        })
        .collect()
}

/// Complex Morlet wavelet centred on `f` Hz, sampled at `sf` Hz.
///
/// The wavelet is `a * exp(-t**2 / (2 st**2)) * exp(2j pi f t)` with
/// `st = 1 / (2 pi f / width)` and `a = 1 / sqrt(st sqrt(pi))`, sampled over
/// `t in [-width st / 2, width st / 2)`. Larger `width` trades time resolution for frequency
/// resolution.
///
/// ```
/// use neurosig::signal::wavelet::morlet_wavelet;
///
/// let w = morlet_wavelet(256., 10., 7.).unwrap();
/// assert_eq!(w.len(), 200);
/// ```
pub fn morlet_wavelet(sf: f64, f: f64, width: f64) -> Result<Vec<Complex<f64>>> {
    let kernel = MorletKernel::try_new(MorletConfig { sf, f, width })?;
    Ok(kernel.wavelet().to_vec())
}

/// Complex Morlet decomposition of `x` at `f` Hz.
///
/// `x` is fully convolved with [`morlet_wavelet`] and the result trimmed by
/// `ceil(m / 2) - 1` samples at the start and `floor(m / 2)` at the end, `m` being the
/// wavelet length, so the output has the length of `x` and is aligned on its samples. This
/// also holds when the wavelet is longer than `x`.
///
/// ```
/// use neurosig::signal::wavelet::morlet;
///
/// let x: Vec<f64> = (0..64).map(|i| (i as f64).cos()).collect();
/// assert_eq!(morlet(&x, 100., 4., 7.).unwrap().len(), 64);
/// ```
pub fn morlet(x: &[f64], sf: f64, f: f64, width: f64) -> Result<Vec<Complex<f64>>> {
    let kernel = MorletKernel::try_new(MorletConfig { sf, f, width })?;
    log::debug!(
        "morlet: sf {sf} Hz, f {f} Hz, width {width}, {} samples against a {}-sample wavelet",
        x.len(),
        kernel.wavelet().len()
    );
    kernel.decompose(x)
}

/// View extracted from a complex Morlet decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MorletOutput {
    /// The raw complex coefficients.
    #[default]
    Complex,
    /// Magnitude.
    Amplitude,
    /// Squared magnitude.
    Power,
    /// Angle in radians.
    Phase,
}

impl MorletOutput {
    /// Lower-case name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            MorletOutput::Complex => "complex",
            MorletOutput::Amplitude => "amplitude",
            MorletOutput::Power => "power",
            MorletOutput::Phase => "phase",
        }
    }
}

impl FromStr for MorletOutput {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "complex" => Ok(MorletOutput::Complex),
            "amplitude" => Ok(MorletOutput::Amplitude),
            "power" => Ok(MorletOutput::Power),
            "phase" => Ok(MorletOutput::Phase),
            other => Err(Error::invalid_arg(
                "get",
                format!(
                    "expected one of 'complex', 'amplitude', 'power', 'phase', got '{other}'"
                ),
            )),
        }
    }
}

impl fmt::Display for MorletOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`ndmorlet`]: complex coefficients or one of their real views.
#[derive(Debug, Clone, PartialEq)]
pub enum MorletArray<D: Dimension> {
    /// Returned for [`MorletOutput::Complex`].
    Complex(Array<Complex<f64>, D>),
    /// Returned for amplitude, power and phase.
    Real(Array<f64, D>),
}

impl<D: Dimension> MorletArray<D> {
    /// Shape of the wrapped array.
    pub fn shape(&self) -> &[usize] {
        match self {
            MorletArray::Complex(a) => a.shape(),
            MorletArray::Real(a) => a.shape(),
        }
    }

    /// The complex coefficients, if that is what was requested.
    pub fn into_complex(self) -> Option<Array<Complex<f64>, D>> {
        match self {
            MorletArray::Complex(a) => Some(a),
            MorletArray::Real(_) => None,
        }
    }

    /// The real view, if one was requested.
    pub fn into_real(self) -> Option<Array<f64, D>> {
        match self {
            MorletArray::Real(a) => Some(a),
            MorletArray::Complex(_) => None,
        }
    }
}

/// Constructor config for [`NdMorletKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NdMorletConfig {
    /// Wavelet parameters.
    pub morlet: MorletConfig,
    /// Time axis, negative values count from the end.
    pub axis: Option<isize>,
    /// Requested view.
    pub get: MorletOutput,
}

impl Default for NdMorletConfig {
    fn default() -> Self {
        Self {
            morlet: MorletConfig::default(),
            axis: Some(0),
            get: MorletOutput::Complex,
        }
    }
}

/// Morlet decomposition along one axis of an N-dimensional array.
#[derive(Debug, Clone, PartialEq)]
pub struct NdMorletKernel {
    morlet: MorletKernel,
    axis: Option<isize>,
    get: MorletOutput,
}

impl KernelLifecycle for NdMorletKernel {
    type Config = NdMorletConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        Ok(Self {
            morlet: MorletKernel::try_new(config.morlet)?,
            axis: config.axis,
            get: config.get,
        })
    }
}

impl NdMorletKernel {
    /// Decompose every lane of `x` along the configured axis.
    pub fn run<S, D>(&self, x: &ArrayBase<S, D>) -> Result<MorletArray<D>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let axis = check_and_get_axis_dyn(self.axis, x)?;
        log::trace!("ndmorlet along axis {axis} of an array shaped {:?}", x.shape());
        let coeffs = map_lanes(x, axis, |lane| self.morlet.decompose(lane))?;
        Ok(match self.get {
            MorletOutput::Complex => MorletArray::Complex(coeffs),
            MorletOutput::Amplitude => MorletArray::Real(coeffs.mapv(|c| c.norm())),
            MorletOutput::Power => MorletArray::Real(coeffs.mapv(|c| c.norm_sqr())),
            MorletOutput::Phase => MorletArray::Real(coeffs.mapv(|c| c.arg())),
        })
    }
}

/// Morlet decomposition of `x` at `f` Hz along `axis` (default `0`).
///
/// Every lane is processed as in [`morlet`]; `get` selects the returned view.
///
/// ```
/// use ndarray::Array2;
/// use neurosig::signal::wavelet::{ndmorlet, MorletOutput};
///
/// let x = Array2::from_shape_fn((3, 128), |(c, i)| ((c + 1) as f64 * i as f64 * 0.2).sin());
/// let power = ndmorlet(&x, 64., 8., Some(1), MorletOutput::Power, 7.)
///     .unwrap()
///     .into_real()
///     .unwrap();
/// assert_eq!(power.dim(), (3, 128));
/// ```
pub fn ndmorlet<S, D>(
    x: &ArrayBase<S, D>,
    sf: f64,
    f: f64,
    axis: Option<isize>,
    get: MorletOutput,
    width: f64,
) -> Result<MorletArray<D>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let kernel = NdMorletKernel::try_new(NdMorletConfig {
        morlet: MorletConfig { sf, f, width },
        axis,
        get,
    })?;
    log::debug!(
        "ndmorlet: sf {sf} Hz, f {f} Hz, width {width}, get {get}, axis {axis:?}, wavelet of {}",
        kernel.morlet.wavelet().len()
    );
    kernel.run(x)
}
