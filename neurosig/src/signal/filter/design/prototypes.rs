//! Analog lowpass prototypes with a cutoff of 1 rad/s.

use super::ZpkFormatFilter;
use crate::linalg::polyroots;
use alloc::{format, vec::Vec};
use core::f64::consts::PI;
use nalgebra::Complex;
use neurosig_core::{Error, Result};

/// Butterworth analog prototype of order `n`.
///
/// No zeros, unit gain and `n` poles evenly spaced on the left half of the unit circle,
/// `-exp(jπm/2n)` for `m = -n+1, -n+3, ..., n-1`.
pub fn buttap(n: usize) -> Result<ZpkFormatFilter<f64>> {
    if n == 0 {
        return Err(Error::invalid_arg("order", "must be >= 1, got 0"));
    }
    let n_f = n as f64;
    let p = (0..n)
        .map(|i| {
            let m = -(n_f - 1.) + 2. * i as f64;
            -Complex::from_polar(1., PI * m / (2. * n_f))
        })
        .collect();
    Ok(ZpkFormatFilter::new(Vec::new(), p, 1.))
}

/// Bessel/Thomson analog prototype of order `n`, phase normalised.
///
/// The poles are the roots of the reverse Bessel polynomial scaled so that the phase
/// response reaches its midpoint at 1 rad/s. Gain is unity.
pub fn besselap(n: usize) -> Result<ZpkFormatFilter<f64>> {
    if n == 0 {
        return Err(Error::invalid_arg("order", "must be >= 1, got 0"));
    }
    let coeffs = reverse_bessel_coeffs(n);
    let a0 = coeffs[n];
    if !a0.is_finite() {
        return Err(Error::invalid_arg(
            "order",
            format!("Bessel polynomial of order {n} overflows"),
        ));
    }
    let scale = a0.powf(-1. / n as f64);
    let p = polyroots(&coeffs)?
        .into_iter()
        .map(|r| r * scale)
        .collect::<Vec<_>>();
    if p.len() != n {
        return Err(Error::design_failure(format!(
            "expected {n} Bessel poles, found {}",
            p.len()
        )));
    }
    Ok(ZpkFormatFilter::new(Vec::new(), p, 1.))
}

/// Coefficients of `θ_n(s)`, highest power first.
///
/// `a_k = (2n - k)! / (2^(n-k) k! (n-k)!)` for the `s^k` term.
fn reverse_bessel_coeffs(n: usize) -> Vec<f64> {
    let mut coeffs = Vec::with_capacity(n + 1);
    // a_n = 1, then a_{k-1} = a_k * (2n - k + 1) k / (2 (n - k + 1))
    let mut a = 1.0f64;
    coeffs.push(a);
    for k in (1..=n).rev() {
        a = a * ((2 * n - k + 1) * k) as f64 / (2 * (n - k + 1)) as f64;
        coeffs.push(a);
    }
    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sorted(mut p: Vec<Complex<f64>>) -> Vec<Complex<f64>> {
        p.sort_by(|a, b| a.im.total_cmp(&b.im));
        p
    }

    #[test]
    fn butterworth_poles_lie_on_unit_circle() {
        let zpk = buttap(4).unwrap();
        assert!(zpk.z.is_empty());
        assert_eq!(zpk.k, 1.);
        assert_eq!(zpk.p.len(), 4);
        for p in &zpk.p {
            assert_relative_eq!(p.norm(), 1., epsilon = 1e-12);
            assert!(p.re < 0.);
        }
    }

    #[test]
    fn butterworth_second_order() {
        let p = sorted(buttap(2).unwrap().p);
        let h = core::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(p[0].re, -h, epsilon = 1e-12);
        assert_relative_eq!(p[0].im, -h, epsilon = 1e-12);
        assert_relative_eq!(p[1].re, -h, epsilon = 1e-12);
        assert_relative_eq!(p[1].im, h, epsilon = 1e-12);
    }

    #[test]
    fn reverse_bessel_polynomials() {
        assert_eq!(reverse_bessel_coeffs(1), vec![1., 1.]);
        assert_eq!(reverse_bessel_coeffs(2), vec![1., 3., 3.]);
        assert_eq!(reverse_bessel_coeffs(3), vec![1., 6., 15., 15.]);
        assert_eq!(reverse_bessel_coeffs(4), vec![1., 10., 45., 105., 105.]);
    }

    #[test]
    fn bessel_phase_normalised_poles() {
        let p = sorted(besselap(2).unwrap().p);
        let half_sqrt3 = 3f64.sqrt() / 2.;
        assert_relative_eq!(p[0].re, -half_sqrt3, epsilon = 1e-10);
        assert_relative_eq!(p[0].im, -0.5, epsilon = 1e-10);
        assert_relative_eq!(p[1].re, -half_sqrt3, epsilon = 1e-10);
        assert_relative_eq!(p[1].im, 0.5, epsilon = 1e-10);

        let p1 = besselap(1).unwrap().p;
        assert_relative_eq!(p1[0].re, -1., epsilon = 1e-12);
    }

    #[test]
    fn bessel_poles_are_stable() {
        for n in 1..=10 {
            let zpk = besselap(n).unwrap();
            assert_eq!(zpk.p.len(), n);
            assert!(zpk.p.iter().all(|p| p.re < 0.));
        }
    }

    #[test]
    fn zero_order_is_rejected() {
        assert!(buttap(0).unwrap_err().is_validation());
        assert!(besselap(0).unwrap_err().is_validation());
    }
}
