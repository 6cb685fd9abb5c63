//! IIR filter design.
//!
//! Digital Butterworth and Bessel filters are designed the way `scipy.signal.iirfilter` does
//! it: an analog lowpass prototype in zero/pole/gain form is pre-warped and moved to the
//! requested band, mapped to the z-plane with the bilinear transform and expanded into
//! transfer-function coefficients. All design arithmetic runs in `f64`.

mod kernels;
mod prototypes;
mod relative_degree;
mod transforms;

pub use kernels::*;
pub use prototypes::*;
pub use transforms::*;

use crate::kernel::KernelLifecycle;
use crate::signal::traits::IirDesign;
use alloc::{format, string::String, vec::Vec};
use core::{f64::consts::PI, fmt, str::FromStr};
use nalgebra::Complex;
use neurosig_core::{Error, Result};

/// Frequency response shape of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FilterBandType {
    /// Pass frequencies below the cutoff.
    Lowpass,
    /// Pass frequencies above the cutoff.
    Highpass,
    /// Pass frequencies between two cutoffs.
    #[default]
    Bandpass,
    /// Reject frequencies between two cutoffs.
    Bandstop,
}

impl FilterBandType {
    /// Lower-case name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterBandType::Lowpass => "lowpass",
            FilterBandType::Highpass => "highpass",
            FilterBandType::Bandpass => "bandpass",
            FilterBandType::Bandstop => "bandstop",
        }
    }

    /// Number of critical frequencies the band needs.
    pub fn n_edges(&self) -> usize {
        match self {
            FilterBandType::Lowpass | FilterBandType::Highpass => 1,
            FilterBandType::Bandpass | FilterBandType::Bandstop => 2,
        }
    }
}

impl FromStr for FilterBandType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lowpass" => Ok(FilterBandType::Lowpass),
            "highpass" => Ok(FilterBandType::Highpass),
            "bandpass" => Ok(FilterBandType::Bandpass),
            "bandstop" => Ok(FilterBandType::Bandstop),
            other => Err(Error::invalid_arg(
                "btype",
                format!(
                    "expected one of 'bandpass', 'bandstop', 'lowpass', 'highpass', got '{other}'"
                ),
            )),
        }
    }
}

impl fmt::Display for FilterBandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analog prototype family used for the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FilterMethod {
    /// Maximally flat magnitude response.
    #[default]
    Butterworth,
    /// Maximally flat group delay, phase normalised.
    Bessel,
}

impl FilterMethod {
    /// Lower-case name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMethod::Butterworth => "butterworth",
            FilterMethod::Bessel => "bessel",
        }
    }

    /// Analog lowpass prototype of the given order.
    pub fn prototype(&self, order: usize) -> Result<ZpkFormatFilter<f64>> {
        match self {
            FilterMethod::Butterworth => buttap(order),
            FilterMethod::Bessel => besselap(order),
        }
    }
}

impl FromStr for FilterMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "butterworth" => Ok(FilterMethod::Butterworth),
            "bessel" => Ok(FilterMethod::Bessel),
            other => Err(Error::invalid_arg(
                "method",
                format!("expected one of 'butterworth', 'bessel', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for FilterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zeros, poles and system gain of a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ZpkFormatFilter<F> {
    /// Zeros
    pub z: Vec<Complex<F>>,
    /// Poles
    pub p: Vec<Complex<F>>,
    /// Gain
    pub k: F,
}

impl<F> ZpkFormatFilter<F> {
    /// Bundle zeros, poles and gain.
    pub fn new(z: Vec<Complex<F>>, p: Vec<Complex<F>>, k: F) -> Self {
        ZpkFormatFilter { z, p, k }
    }
}

/// Numerator `b` and denominator `a` polynomial coefficients, highest power first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaFormatFilter<F> {
    /// Numerator coefficients.
    pub b: Vec<F>,
    /// Denominator coefficients.
    pub a: Vec<F>,
}

/// Design a digital IIR filter.
///
/// `wn` holds the critical frequencies normalised to the Nyquist frequency: one value for
/// lowpass/highpass, two strictly increasing values for bandpass/bandstop, all in `(0, 1)`.
///
/// ```
/// use neurosig::signal::filter::design::{iir_design, FilterBandType, FilterMethod};
///
/// let ba = iir_design(1, &[0.5], FilterBandType::Lowpass, FilterMethod::Butterworth).unwrap();
/// assert!((ba.b[0] - 0.5).abs() < 1e-12);
/// assert!((ba.b[1] - 0.5).abs() < 1e-12);
/// ```
pub fn iir_design(
    order: usize,
    wn: &[f64],
    btype: FilterBandType,
    method: FilterMethod,
) -> Result<BaFormatFilter<f64>> {
    let kernel = IirDesignKernel::try_new(IirDesignConfig {
        order,
        wn: wn.to_vec(),
        btype,
        method,
    })?;
    Ok(kernel.run_alloc()?)
}

/// Butterworth digital filter, see [`iir_design`].
pub fn butter(order: usize, wn: &[f64], btype: FilterBandType) -> Result<BaFormatFilter<f64>> {
    iir_design(order, wn, btype, FilterMethod::Butterworth)
}

/// Phase-normalised Bessel digital filter, see [`iir_design`].
pub fn bessel(order: usize, wn: &[f64], btype: FilterBandType) -> Result<BaFormatFilter<f64>> {
    iir_design(order, wn, btype, FilterMethod::Bessel)
}

/// Design pipeline on already validated arguments.
pub(crate) fn design_ba(
    order: usize,
    wn: &[f64],
    btype: FilterBandType,
    method: FilterMethod,
) -> Result<BaFormatFilter<f64>> {
    const FS: f64 = 2.;
    let prototype = method.prototype(order)?;
    let warped: Vec<f64> = wn.iter().map(|w| 2. * FS * (PI * w / FS).tan()).collect();

    let analog = match (btype, warped.as_slice()) {
        (FilterBandType::Lowpass, [w]) => lp2lp_zpk(prototype, *w)?,
        (FilterBandType::Highpass, [w]) => lp2hp_zpk(prototype, *w)?,
        (FilterBandType::Bandpass, [w1, w2]) => {
            lp2bp_zpk(prototype, (w1 * w2).sqrt(), w2 - w1)?
        }
        (FilterBandType::Bandstop, [w1, w2]) => {
            lp2bs_zpk(prototype, (w1 * w2).sqrt(), w2 - w1)?
        }
        _ => {
            return Err(Error::invalid_arg(
                "wn",
                format!(
                    "{btype} needs {} critical frequencies, got {:?}",
                    btype.n_edges(),
                    wn
                ),
            ))
        }
    };
    let digital = bilinear_zpk(analog, FS)?;
    let ba = zpk2tf(&digital);
    check_stability(&ba)?;
    log::trace!(
        "designed {method} {btype} order {order} wn {wn:?}: b {:?} a {:?}",
        ba.b,
        ba.a
    );
    Ok(ba)
}

/// Reject coefficients that are not finite or whose denominator has a root on or outside
/// the unit circle.
///
/// Stability is decided on the realised `a` by the Schur-Cohn step-down recursion: every
/// reflection coefficient must lie strictly inside `(-1, 1)`. No roots are computed, so poles
/// clustered next to `z = 1` are judged on the coefficients actually used for filtering.
pub fn check_stability(ba: &BaFormatFilter<f64>) -> Result<()> {
    let describe = |what: &str| -> String { format!("{what}: b = {:?}, a = {:?}", ba.b, ba.a) };
    if ba.a.is_empty() || ba.b.is_empty() {
        return Err(Error::design_failure(describe("empty coefficients")));
    }
    if ba.b.iter().chain(ba.a.iter()).any(|c| !c.is_finite()) {
        return Err(Error::design_failure(describe("non-finite coefficients")));
    }
    if ba.a[0] == 0. {
        return Err(Error::design_failure(describe("a[0] is zero")));
    }
    if let Some((stage, k)) = first_unstable_reflection(&ba.a) {
        return Err(Error::design_failure(describe(&format!(
            "denominator has a pole on or outside the unit circle \
             (reflection coefficient {k} at stage {stage})"
        ))));
    }
    Ok(())
}

/// Step `a` down one degree at a time, returning the first reflection coefficient with
/// `|k| >= 1` along with the degree it was found at.
fn first_unstable_reflection(a: &[f64]) -> Option<(usize, f64)> {
    let mut poly: Vec<f64> = a.iter().map(|c| c / a[0]).collect();
    while poly.len() > 1 {
        let n = poly.len() - 1;
        let k = poly[n];
        if !(k.abs() < 1.) {
            return Some((n, k));
        }
        let scale = 1. - k * k;
        poly = (0..n).map(|i| (poly[i] - k * poly[n - i]) / scale).collect();
    }
    None
}
