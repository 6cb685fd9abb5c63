use super::arraytools::{check_and_get_axis_dyn, map_lanes};
use crate::linalg::companion_checked_dyn;
use alloc::{format, vec, vec::Vec};
use nalgebra::{DMatrix, DVector, RealField};
use ndarray::{Array, ArrayBase, Data, Dimension};
use neurosig_core::{Error, Result};

/// `(y, zf)`: filtered samples and, when initial conditions were given, the final state.
pub type LFilterSliceResult<F> = (Vec<F>, Option<Vec<F>>);

/// Normalise `b`/`a` by `a[0]` and zero-pad both to a common length.
fn normalized_coeffs<F>(b: &[F], a: &[F]) -> Result<(Vec<F>, Vec<F>)>
where
    F: RealField + Copy,
{
    if b.is_empty() {
        return Err(Error::invalid_arg("b", "numerator coefficients are empty"));
    }
    let Some(a0) = a.first().copied() else {
        return Err(Error::invalid_arg(
            "a",
            "denominator coefficients are empty; use [1.0] for an FIR filter",
        ));
    };
    if a0 == F::zero() {
        return Err(Error::invalid_arg("a", "first element of a found to be zero"));
    }
    let n = a.len().max(b.len());
    let mut bn = vec![F::zero(); n];
    let mut an = vec![F::zero(); n];
    bn.iter_mut().zip(b).for_each(|(o, v)| *o = *v / a0);
    an.iter_mut().zip(a).for_each(|(o, v)| *o = *v / a0);
    Ok((bn, an))
}

/// Filter a 1D slice with the direct form II transposed difference equation.
///
/// ```text
/// a[0]*y[n] = b[0]*x[n] + b[1]*x[n-1] + ... + b[M]*x[n-M]
///                       - a[1]*y[n-1] - ... - a[N]*y[n-N]
/// ```
///
/// # Parameters
/// * `b`: numerator coefficients.
/// * `a`: denominator coefficients. Both are normalised by `a[0]`, which must be non-zero.
/// * `x`: samples to filter.
/// * `zi`: optional initial delay values of length `max(len(a), len(b)) - 1`. When `None`,
///   initial rest is assumed and no final state is returned.
///
/// # Returns
/// The filtered samples and the final delay values when `zi` was given.
///
/// ```
/// use neurosig::signal::filter::lfilter_checked_slice;
///
/// let (y, zf) = lfilter_checked_slice(&[5., 4., 1., 2.], &[1.], &[1., 2., 3., 4.], None).unwrap();
/// assert_eq!(y, vec![5., 14., 24., 36.]);
/// assert!(zf.is_none());
/// ```
pub fn lfilter_checked_slice<F>(
    b: &[F],
    a: &[F],
    x: &[F],
    zi: Option<&[F]>,
) -> Result<LFilterSliceResult<F>>
where
    F: RealField + Copy,
{
    let (b, a) = normalized_coeffs(b, a)?;
    let order = b.len() - 1;
    let mut z = match zi {
        Some(zi) if zi.len() != order => {
            return Err(Error::ConflictArg {
                reason: format!(
                    "zi holds {} initial conditions but the filter order is {order}",
                    zi.len()
                ),
            })
        }
        Some(zi) => zi.to_vec(),
        None => vec![F::zero(); order],
    };

    let mut y = Vec::with_capacity(x.len());
    for &xn in x {
        let yn = b[0] * xn + z.first().copied().unwrap_or_else(F::zero);
        for k in 0..order {
            let next = if k + 1 < order { z[k + 1] } else { F::zero() };
            z[k] = b[k + 1] * xn + next - a[k + 1] * yn;
        }
        y.push(yn);
    }
    Ok((y, zi.map(|_| z)))
}

/// Filter `x` along `axis` (default `0`) with an IIR or FIR filter, starting at rest.
///
/// Every 1D lane along `axis` is filtered independently with [lfilter_checked_slice]; the
/// input is left untouched and a new array of the same shape is returned.
pub fn lfilter<F, S, D>(
    b: &[F],
    a: &[F],
    x: &ArrayBase<S, D>,
    axis: Option<isize>,
) -> Result<Array<F, D>>
where
    F: RealField + Copy + Default,
    S: Data<Elem = F>,
    D: Dimension,
{
    let axis = check_and_get_axis_dyn(axis, x)?;
    normalized_coeffs(b, a)?;
    log::trace!("lfilter along axis {axis} of an array shaped {:?}", x.shape());
    map_lanes(x, axis, |lane| Ok(lfilter_checked_slice(b, a, lane, None)?.0))
}

/// Initial conditions for [lfilter_checked_slice] that correspond to the steady state of the
/// step response.
///
/// Solves `(I - companion(a).T) zi = b[1:] - a[1:] * b[0]` after normalising by `a[0]`. The
/// result has length `max(len(a), len(b)) - 1`.
///
/// ```
/// use neurosig::signal::filter::lfilter_zi_checked;
///
/// // b, a = butter(2, 0.5)
/// let b: [f64; 3] = [0.29289322, 0.58578644, 0.29289322];
/// let a = [1., 0., 0.17157288];
/// let zi = lfilter_zi_checked(&b, &a).unwrap();
/// assert!((zi[0] - 0.70710678).abs() < 1e-6);
/// assert!((zi[1] - 0.12132034).abs() < 1e-6);
/// ```
pub fn lfilter_zi_checked<F>(b: &[F], a: &[F]) -> Result<Vec<F>>
where
    F: RealField + Copy,
{
    let (b, a) = normalized_coeffs(b, a)?;
    let n = b.len();
    if n == 1 {
        return Ok(Vec::new());
    }

    let companion: DMatrix<F> = companion_checked_dyn(&a)?;
    let i_minus_a = DMatrix::<F>::identity(n - 1, n - 1) - companion.transpose();
    let rhs = DVector::<F>::from_iterator(n - 1, (1..n).map(|i| b[i] - a[i] * b[0]));
    let zi = i_minus_a.lu().solve(&rhs).ok_or_else(|| {
        Error::invalid_arg(
            "a",
            format!("I - A is singular (the filter has a pole at z = 1); a = {a:?}"),
        )
    })?;
    Ok(zi.iter().copied().collect())
}
