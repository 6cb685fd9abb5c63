//! One-call band filtering of sampled signals.

use super::design::{iir_design, BaFormatFilter, FilterBandType, FilterMethod};
use super::{filtfilt, lfilter, FiltFiltPad};
use crate::kernel::{ConfigError, KernelLifecycle};
use alloc::{format, vec, vec::Vec};
use core::{fmt, str::FromStr};
use ndarray::{Array, ArrayBase, Data, Dimension};
use neurosig_core::{Error, Result};

/// How designed coefficients are applied to the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FilterDirection {
    /// Forward then backward: zero phase, non-causal.
    #[default]
    FiltFilt,
    /// Single causal pass, introduces group delay.
    LFilter,
}

impl FilterDirection {
    /// Lower-case name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterDirection::FiltFilt => "filtfilt",
            FilterDirection::LFilter => "lfilter",
        }
    }
}

impl FromStr for FilterDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "filtfilt" => Ok(FilterDirection::FiltFilt),
            "lfilter" => Ok(FilterDirection::LFilter),
            other => Err(Error::invalid_arg(
                "way",
                format!("expected one of 'filtfilt', 'lfilter', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for FilterDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalise the band edges `f` (Hz) by the Nyquist frequency `sf / 2`.
///
/// Bandpass and bandstop use both values of `f`; lowpass uses the last one and highpass the
/// first one. Every edge used must lie strictly between 0 and `sf / 2`.
///
/// ```
/// use neurosig::signal::filter::{design::FilterBandType, normalize_band};
///
/// assert_eq!(normalize_band(8., &[1., 3.], FilterBandType::Bandpass).unwrap(), vec![0.25, 0.75]);
/// assert_eq!(normalize_band(8., &[1., 3.], FilterBandType::Lowpass).unwrap(), vec![0.75]);
/// assert_eq!(normalize_band(8., &[1., 3.], FilterBandType::Highpass).unwrap(), vec![0.25]);
/// ```
pub fn normalize_band(sf: f64, f: &[f64], btype: FilterBandType) -> Result<Vec<f64>> {
    if !(sf.is_finite() && sf > 0.) {
        return Err(Error::invalid_arg(
            "sf",
            format!("sampling frequency must be finite and > 0, got {sf}"),
        ));
    }
    let edges: Vec<f64> = match (btype, f) {
        (FilterBandType::Bandpass | FilterBandType::Bandstop, [lo, hi]) => vec![*lo, *hi],
        (FilterBandType::Lowpass, [.., hi]) => vec![*hi],
        (FilterBandType::Highpass, [lo, ..]) => vec![*lo],
        _ => {
            return Err(Error::invalid_arg(
                "f",
                format!("{btype} filtering needs a (low, high) band, got {f:?}"),
            ))
        }
    };
    if f.len() > 2 {
        return Err(Error::invalid_arg(
            "f",
            format!("expected at most two band edges, got {f:?}"),
        ));
    }
    let nyquist = sf / 2.;
    if let Some(edge) = edges.iter().find(|e| !(**e > 0. && **e < nyquist)) {
        return Err(Error::invalid_arg(
            "f",
            format!("band edge {edge} Hz must satisfy 0 < f < sf/2 = {nyquist} Hz"),
        ));
    }
    if let [lo, hi] = edges.as_slice() {
        if lo >= hi {
            return Err(Error::invalid_arg(
                "f",
                format!("band edges must be increasing, got ({lo}, {hi})"),
            ));
        }
    }
    Ok(edges.iter().map(|e| e / nyquist).collect())
}

/// Constructor config for [`FiltKernel`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FiltConfig {
    /// Sampling frequency in Hz.
    pub sf: f64,
    /// Band edges in Hz.
    pub f: Vec<f64>,
    /// Band type.
    pub btype: FilterBandType,
    /// Filter order.
    pub order: usize,
    /// Prototype family.
    pub method: FilterMethod,
    /// Application direction.
    pub way: FilterDirection,
    /// Time axis of the filtered arrays.
    pub axis: Option<isize>,
}

impl Default for FiltConfig {
    fn default() -> Self {
        Self {
            sf: 0.,
            f: Vec::new(),
            btype: FilterBandType::Bandpass,
            order: 3,
            method: FilterMethod::Butterworth,
            way: FilterDirection::FiltFilt,
            axis: Some(0),
        }
    }
}

/// Validated band filter. Coefficients are designed on each run.
#[derive(Debug, Clone, PartialEq)]
pub struct FiltKernel {
    wn: Vec<f64>,
    btype: FilterBandType,
    order: usize,
    method: FilterMethod,
    way: FilterDirection,
    axis: Option<isize>,
}

impl KernelLifecycle for FiltKernel {
    type Config = FiltConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        if config.order == 0 {
            return Err(ConfigError::invalid("order", "must be >= 1, got 0"));
        }
        let wn = normalize_band(config.sf, &config.f, config.btype).map_err(|err| match err {
            Error::InvalidArg { arg, reason } if arg == "sf" => ConfigError::invalid("sf", reason),
            Error::InvalidArg { reason, .. } => ConfigError::invalid("f", reason),
            other => ConfigError::invalid("f", format!("{other}")),
        })?;
        Ok(Self {
            wn,
            btype: config.btype,
            order: config.order,
            method: config.method,
            way: config.way,
            axis: config.axis,
        })
    }
}

impl FiltKernel {
    /// Critical frequencies normalised to Nyquist.
    pub fn wn(&self) -> &[f64] {
        &self.wn
    }

    /// Design the `(b, a)` coefficients of this filter.
    pub fn design(&self) -> Result<BaFormatFilter<f64>> {
        iir_design(self.order, &self.wn, self.btype, self.method)
    }

    /// Filter `x` along the configured axis. The input is not modified.
    pub fn run<S, D>(&self, x: &ArrayBase<S, D>) -> Result<Array<f64, D>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let BaFormatFilter { b, a } = self.design()?;
        match self.way {
            FilterDirection::FiltFilt => {
                filtfilt(&b, &a, x, self.axis, Some(FiltFiltPad::default()))
            }
            FilterDirection::LFilter => lfilter(&b, &a, x, self.axis),
        }
    }
}

/// Filter `x` in the band `f` (Hz) sampled at `sf` Hz.
///
/// # Parameters
/// * `sf`: sampling frequency, must be > 0.
/// * `f`: band edges `(low, high)`. Lowpass only uses `high`, highpass only uses `low`.
/// * `x`: data to filter along `axis` (default `0`).
/// * `btype`, `order`, `method`: the IIR design, see [`iir_design`].
/// * `way`: zero-phase forward-backward or single causal pass.
///
/// # Errors
/// `InvalidArg` when a parameter is out of domain (naming it and its value),
/// `DesignFailure` when the requested design is not stable.
///
/// ```
/// use ndarray::Array1;
/// use neurosig::signal::filter::{design::{FilterBandType, FilterMethod}, filt, FilterDirection};
///
/// let x = Array1::from_iter((0..512).map(|i| (i as f64 * 0.3).sin()));
/// let y = filt(
///     256.,
///     &[8., 12.],
///     &x,
///     FilterBandType::Bandpass,
///     3,
///     FilterMethod::Butterworth,
///     FilterDirection::FiltFilt,
///     None,
/// )
/// .unwrap();
/// assert_eq!(y.len(), x.len());
/// ```
#[allow(clippy::too_many_arguments)]
pub fn filt<S, D>(
    sf: f64,
    f: &[f64],
    x: &ArrayBase<S, D>,
    btype: FilterBandType,
    order: usize,
    method: FilterMethod,
    way: FilterDirection,
    axis: Option<isize>,
) -> Result<Array<f64, D>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let kernel = FiltKernel::try_new(FiltConfig {
        sf,
        f: f.to_vec(),
        btype,
        order,
        method,
        way,
        axis,
    })?;
    log::debug!(
        "filt: sf {sf} Hz, f {f:?} -> wn {:?}, {btype} order {order} {method} {way}, axis {axis:?}",
        kernel.wn()
    );
    kernel.run(x)
}
