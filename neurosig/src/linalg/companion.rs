use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D};
use alloc::{format, vec::Vec};
use core::ops::{Div, Neg};
use nalgebra::{allocator::Allocator, Complex, DMatrix, DefaultAllocator, Dyn, OMatrix, Scalar};
use neurosig_core::{Error, Result};
use num_traits::{One, Zero};

/// Newton steps applied to each eigenvalue-derived root.
const ROOT_POLISH_STEPS: usize = 3;

/// 1D companion-matrix construction capability.
pub trait CompanionBuild1D<T> {
    /// Output matrix type.
    type Output;

    /// Build companion matrix from polynomial coefficients.
    fn run<I>(&self, input: &I) -> core::result::Result<Self::Output, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Constructor config for [`CompanionKernel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanionConfig {
    /// Optional expected coefficient length.
    pub expected_len: Option<usize>,
}

/// Companion-matrix kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanionKernel {
    expected_len: Option<usize>,
}

impl KernelLifecycle for CompanionKernel {
    type Config = CompanionConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        if let Some(expected_len) = config.expected_len {
            if expected_len < 2 {
                return Err(ConfigError::invalid(
                    "expected_len",
                    format!("companion requires at least 2 coefficients, got {expected_len}"),
                ));
            }
        }
        Ok(Self {
            expected_len: config.expected_len,
        })
    }
}

impl<T> CompanionBuild1D<T> for CompanionKernel
where
    T: Scalar + One + Zero + Div<Output = T> + Neg<Output = T> + Copy + PartialEq,
    DefaultAllocator: Allocator<Dyn, Dyn>,
{
    type Output = OMatrix<T, Dyn, Dyn>;

    fn run<I>(&self, input: &I) -> core::result::Result<Self::Output, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
    {
        let coeffs = input.read_slice().map_err(ExecInvariantViolation::from)?;
        if coeffs.len() < 2 {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "companion requires at least 2 coefficients",
            });
        }
        if let Some(expected_len) = self.expected_len {
            if coeffs.len() != expected_len {
                return Err(ExecInvariantViolation::LengthMismatch {
                    arg: "coeffs",
                    expected: expected_len,
                    got: coeffs.len(),
                });
            }
        }
        if coeffs[0] == T::zero() {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "leading coefficient must be non-zero",
            });
        }
        Ok(companion_from_slice(coeffs))
    }
}

/// First row holds `-a[1..] / a[0]`, the sub-diagonal holds ones.
fn companion_from_slice<T>(coeffs: &[T]) -> OMatrix<T, Dyn, Dyn>
where
    T: Scalar + One + Zero + Div<Output = T> + Neg<Output = T> + Copy,
    DefaultAllocator: Allocator<Dyn, Dyn>,
{
    let m = coeffs.len() - 1;
    let a0 = coeffs[0];
    let mut matrix = OMatrix::<T, Dyn, Dyn>::zeros_generic(Dyn(m), Dyn(m));
    for (j, aj) in coeffs.iter().skip(1).enumerate() {
        matrix[(0, j)] = -*aj / a0;
    }
    for i in 1..m {
        matrix[(i, i - 1)] = T::one();
    }
    matrix
}

///
/// Checked companion matrix construction.
///
/// `coeffs` are polynomial coefficients ordered from the highest power down.
///
pub fn companion_checked_dyn<T>(coeffs: &[T]) -> Result<OMatrix<T, Dyn, Dyn>>
where
    T: Scalar + One + Zero + Div<Output = T> + Neg<Output = T> + Copy + PartialEq,
    DefaultAllocator: Allocator<Dyn, Dyn>,
{
    let kernel = CompanionKernel::try_new(CompanionConfig {
        expected_len: Some(coeffs.len().max(2)),
    })?;
    kernel.run(coeffs).map_err(|err| match err {
        ExecInvariantViolation::InvalidState { reason } => Error::invalid_arg("coeffs", reason),
        other => other.into(),
    })
}

/// Roots of a real polynomial, highest power first.
///
/// Leading zeros are stripped, trailing zeros contribute roots at the origin and the rest come
/// from the eigenvalues of the companion matrix, refined by a few Newton steps. A constant
/// polynomial has no roots.
pub fn polyroots(coeffs: &[f64]) -> Result<Vec<Complex<f64>>> {
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(Error::invalid_arg(
            "coeffs",
            format!("polynomial coefficients must be finite, got {coeffs:?}"),
        ));
    }
    let start = coeffs.iter().position(|c| *c != 0.).unwrap_or(coeffs.len());
    let end = coeffs.iter().rposition(|c| *c != 0.).map_or(start, |i| i + 1);
    let trimmed = &coeffs[start..end];
    let mut roots = Vec::with_capacity(coeffs.len().saturating_sub(1));
    roots.extend(core::iter::repeat(Complex::new(0., 0.)).take(coeffs.len() - end));
    if trimmed.len() < 2 {
        return Ok(roots);
    }

    let matrix: DMatrix<f64> = companion_checked_dyn(trimmed)?;
    let eig = matrix.complex_eigenvalues();
    roots.extend(eig.iter().map(|r| polish_root(trimmed, *r)));
    Ok(roots)
}

fn polish_root(coeffs: &[f64], mut root: Complex<f64>) -> Complex<f64> {
    for _ in 0..ROOT_POLISH_STEPS {
        let (p, dp) = coeffs.iter().fold(
            (Complex::new(0., 0.), Complex::new(0., 0.)),
            |(p, dp), c| (p * root + *c, dp * root + p),
        );
        if dp.norm() == 0. {
            break;
        }
        let step = p / dp;
        if !step.re.is_finite() || !step.im.is_finite() {
            break;
        }
        root -= step;
    }
    root
}
