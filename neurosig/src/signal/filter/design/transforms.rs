//! Frequency transforms and the analog-to-digital mapping for ZPK filters.
//!
//! These mirror the `lp2*_zpk`, `bilinear_zpk` and `zpk2tf` routines of `scipy.signal`.

use super::relative_degree::relative_degree_checked;
use super::{BaFormatFilter, ZpkFormatFilter};
use alloc::{format, vec::Vec};
use core::iter::repeat;
use nalgebra::Complex;
use neurosig_core::{Error, Result};

type C64 = Complex<f64>;

fn check_positive(arg: &'static str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.) {
        return Err(Error::invalid_arg(
            arg,
            format!("must be finite and > 0, got {value}"),
        ));
    }
    Ok(())
}

fn prod(values: impl Iterator<Item = C64>) -> C64 {
    values.fold(C64::new(1., 0.), |acc, v| acc * v)
}

/// `real(prod(-z) / prod(-p))`, the gain correction of the inverting transforms.
fn inversion_gain(zpk: &ZpkFormatFilter<f64>) -> f64 {
    (prod(zpk.z.iter().map(|z| -*z)) / prod(zpk.p.iter().map(|p| -*p))).re
}

/// Both roots `r ± sqrt(r² - wo²)` of each transformed singularity.
fn split_band(roots: &[C64], wo: f64) -> Vec<C64> {
    let wo2 = C64::new(wo * wo, 0.);
    let plus = roots.iter().map(|&r| r + (r * r - wo2).sqrt());
    let minus = roots.iter().map(|&r| r - (r * r - wo2).sqrt());
    plus.chain(minus).collect()
}

/// Lowpass prototype to lowpass with cutoff `wo` (rad/s).
pub fn lp2lp_zpk(zpk: ZpkFormatFilter<f64>, wo: f64) -> Result<ZpkFormatFilter<f64>> {
    check_positive("wo", wo)?;
    let degree = relative_degree_checked(&zpk.z, &zpk.p)?;
    Ok(ZpkFormatFilter::new(
        zpk.z.iter().map(|z| *z * wo).collect(),
        zpk.p.iter().map(|p| *p * wo).collect(),
        zpk.k * wo.powi(degree as i32),
    ))
}

/// Lowpass prototype to highpass with cutoff `wo` (rad/s).
pub fn lp2hp_zpk(zpk: ZpkFormatFilter<f64>, wo: f64) -> Result<ZpkFormatFilter<f64>> {
    check_positive("wo", wo)?;
    let degree = relative_degree_checked(&zpk.z, &zpk.p)?;
    let k = zpk.k * inversion_gain(&zpk);
    let z = zpk
        .z
        .iter()
        .map(|z| wo / *z)
        .chain(repeat(C64::new(0., 0.)).take(degree))
        .collect();
    let p = zpk.p.iter().map(|p| wo / *p).collect();
    Ok(ZpkFormatFilter::new(z, p, k))
}

/// Lowpass prototype to bandpass centred on `wo` with width `bw` (rad/s).
pub fn lp2bp_zpk(zpk: ZpkFormatFilter<f64>, wo: f64, bw: f64) -> Result<ZpkFormatFilter<f64>> {
    check_positive("wo", wo)?;
    check_positive("bw", bw)?;
    let degree = relative_degree_checked(&zpk.z, &zpk.p)?;
    let z_lp: Vec<C64> = zpk.z.iter().map(|z| *z * (bw / 2.)).collect();
    let p_lp: Vec<C64> = zpk.p.iter().map(|p| *p * (bw / 2.)).collect();

    let mut z = split_band(&z_lp, wo);
    z.extend(repeat(C64::new(0., 0.)).take(degree));
    let p = split_band(&p_lp, wo);
    Ok(ZpkFormatFilter::new(z, p, zpk.k * bw.powi(degree as i32)))
}

/// Lowpass prototype to bandstop centred on `wo` with width `bw` (rad/s).
pub fn lp2bs_zpk(zpk: ZpkFormatFilter<f64>, wo: f64, bw: f64) -> Result<ZpkFormatFilter<f64>> {
    check_positive("wo", wo)?;
    check_positive("bw", bw)?;
    let degree = relative_degree_checked(&zpk.z, &zpk.p)?;
    let k = zpk.k * inversion_gain(&zpk);
    let z_hp: Vec<C64> = zpk.z.iter().map(|z| (bw / 2.) / *z).collect();
    let p_hp: Vec<C64> = zpk.p.iter().map(|p| (bw / 2.) / *p).collect();

    let mut z = split_band(&z_hp, wo);
    z.extend(repeat(C64::new(0., wo)).take(degree));
    z.extend(repeat(C64::new(0., -wo)).take(degree));
    let p = split_band(&p_hp, wo);
    Ok(ZpkFormatFilter::new(z, p, k))
}

/// Bilinear transform of an analog ZPK filter to the z-plane at sampling rate `fs`.
///
/// Zeros at infinity are mapped to the Nyquist frequency (`z = -1`).
pub fn bilinear_zpk(zpk: ZpkFormatFilter<f64>, fs: f64) -> Result<ZpkFormatFilter<f64>> {
    check_positive("fs", fs)?;
    let degree = relative_degree_checked(&zpk.z, &zpk.p)?;
    let fs2 = C64::new(2. * fs, 0.);

    let z = zpk
        .z
        .iter()
        .map(|z| (fs2 + *z) / (fs2 - *z))
        .chain(repeat(C64::new(-1., 0.)).take(degree))
        .collect();
    let p = zpk.p.iter().map(|p| (fs2 + *p) / (fs2 - *p)).collect();
    let num = prod(zpk.z.iter().map(|z| fs2 - *z));
    let den = prod(zpk.p.iter().map(|p| fs2 - *p));
    let k = zpk.k * (num / den).re;
    Ok(ZpkFormatFilter::new(z, p, k))
}

/// Coefficients of the monic polynomial with the given roots, highest power first.
pub fn poly(roots: &[C64]) -> Vec<C64> {
    let mut coeffs = Vec::with_capacity(roots.len() + 1);
    coeffs.push(C64::new(1., 0.));
    for r in roots {
        coeffs.push(C64::new(0., 0.));
        for i in (1..coeffs.len()).rev() {
            let prev = coeffs[i - 1];
            coeffs[i] -= *r * prev;
        }
    }
    coeffs
}

/// Expand a ZPK filter into numerator/denominator coefficients.
///
/// Singularities are expected in conjugate pairs; only the real parts of the expanded
/// polynomials are kept.
pub fn zpk2tf(zpk: &ZpkFormatFilter<f64>) -> BaFormatFilter<f64> {
    let b = poly(&zpk.z).into_iter().map(|c| c.re * zpk.k).collect();
    let a = poly(&zpk.p).into_iter().map(|c| c.re).collect();
    BaFormatFilter { b, a }
}
