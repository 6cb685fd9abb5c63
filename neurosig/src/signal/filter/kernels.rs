//! Kernels over the 1D filter routines.

use super::{filtfilt_checked_slice, lfilter_checked_slice, FiltFiltPad};
use crate::kernel::{
    bind_output, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D,
};
use crate::signal::traits::{FiltFilt1D, LFilter1D};
use alloc::vec::Vec;
use nalgebra::RealField;

fn validate_ba<T>(b: &[T], a: &[T]) -> Result<(), ConfigError>
where
    T: RealField + Copy,
{
    if b.is_empty() {
        return Err(ConfigError::EmptyInput { arg: "b" });
    }
    if a.is_empty() {
        return Err(ConfigError::EmptyInput { arg: "a" });
    }
    if a[0] == T::zero() {
        return Err(ConfigError::invalid("a", "first element of a found to be zero"));
    }
    Ok(())
}

/// Constructor config for [`LFilterKernel`].
#[derive(Debug, Clone)]
pub struct LFilterConfig<T> {
    /// Numerator coefficients.
    pub b: Vec<T>,
    /// Denominator coefficients.
    pub a: Vec<T>,
}

/// Single-pass causal filter over 1D buffers.
#[derive(Debug, Clone)]
pub struct LFilterKernel<T> {
    b: Vec<T>,
    a: Vec<T>,
}

impl<T> KernelLifecycle for LFilterKernel<T>
where
    T: RealField + Copy,
{
    type Config = LFilterConfig<T>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        validate_ba(&config.b, &config.a)?;
        Ok(Self {
            b: config.b,
            a: config.a,
        })
    }
}

impl<T> LFilter1D<T> for LFilterKernel<T>
where
    T: RealField + Copy,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let out = bind_output(out, input.len())?;
        let (y, _) = lfilter_checked_slice(&self.b, &self.a, input, None)?;
        out.copy_from_slice(&y);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let (y, _) = lfilter_checked_slice(&self.b, &self.a, input, None)?;
        Ok(y)
    }
}

/// Constructor config for [`FiltFiltKernel`].
#[derive(Debug, Clone)]
pub struct FiltFiltConfig<T> {
    /// Numerator coefficients.
    pub b: Vec<T>,
    /// Denominator coefficients.
    pub a: Vec<T>,
    /// Optional padding policy. `None` disables padding.
    pub padding: Option<FiltFiltPad>,
}

/// Forward-backward zero-phase filter over 1D buffers.
#[derive(Debug, Clone)]
pub struct FiltFiltKernel<T> {
    b: Vec<T>,
    a: Vec<T>,
    padding: Option<FiltFiltPad>,
}

impl<T> KernelLifecycle for FiltFiltKernel<T>
where
    T: RealField + Copy,
{
    type Config = FiltFiltConfig<T>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        validate_ba(&config.b, &config.a)?;
        Ok(Self {
            b: config.b,
            a: config.a,
            padding: config.padding,
        })
    }
}

impl<T> FiltFiltKernel<T> {
    /// Shortest input accepted: one sample more than the pad length.
    pub fn min_len(&self) -> usize {
        let ntaps = self.a.len().max(self.b.len());
        self.padding.map_or(0, |p| p.edge(ntaps)) + 1
    }
}

impl<T> FiltFilt1D<T> for FiltFiltKernel<T>
where
    T: RealField + Copy,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let out = bind_output(out, input.len())?;
        let y = filtfilt_checked_slice(&self.b, &self.a, input, self.padding)?;
        out.copy_from_slice(&y);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        Ok(filtfilt_checked_slice(&self.b, &self.a, input, self.padding)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    #[test]
    fn lfilter_kernel_matches_free_function() {
        let kernel = LFilterKernel::try_new(LFilterConfig {
            b: vec![0.5f64, 0.25],
            a: vec![1.0, -0.2],
        })
        .expect("kernel should initialize");
        let x = [1.0f64, 0.0, 1.0, 0.0, 1.0];

        let expected = lfilter_checked_slice(&[0.5, 0.25], &[1.0, -0.2], &x, None)
            .unwrap()
            .0;
        assert_eq!(kernel.run_alloc(&x).unwrap(), expected);

        let mut out = Array1::<f64>::zeros(5);
        kernel.run_into(&x, &mut out).expect("run_into");
        assert_eq!(out.to_vec(), expected);
    }

    #[test]
    fn lfilter_kernel_checks_output_length() {
        let kernel = LFilterKernel::try_new(LFilterConfig {
            b: vec![1.0f64],
            a: vec![1.0],
        })
        .unwrap();
        let mut out = vec![0.0f64; 2];
        assert_eq!(
            kernel.run_into(&[1.0, 2.0, 3.0], &mut out),
            Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn kernels_reject_bad_coefficients() {
        assert_eq!(
            LFilterKernel::<f64>::try_new(LFilterConfig {
                b: vec![],
                a: vec![1.0],
            })
            .unwrap_err(),
            ConfigError::EmptyInput { arg: "b" }
        );
        assert!(matches!(
            FiltFiltKernel::<f64>::try_new(FiltFiltConfig {
                b: vec![1.0],
                a: vec![0.0, 1.0],
                padding: None,
            }),
            Err(ConfigError::InvalidArgument { arg: "a", .. })
        ));
    }

    #[test]
    fn filtfilt_kernel_runs_and_reports_short_input() {
        let kernel = FiltFiltKernel::try_new(FiltFiltConfig {
            b: vec![0.5f64, 0.5],
            a: vec![1.0],
            padding: Some(FiltFiltPad::default()),
        })
        .unwrap();
        assert_eq!(kernel.min_len(), 7);

        let x = [0., 0.6389613, 0.890577, 0.9830277, 0.9992535, 0.9756868, 0.9304659, 0.8734051];
        let mut out = [0.0f64; 8];
        kernel.run_into(&x, &mut out).unwrap();
        assert_relative_eq!(out[1], 0.5421249, max_relative = 1e-6);
        assert_relative_eq!(out[7], 0.8734051, max_relative = 1e-6);

        let err = kernel.run_alloc(&x[..6]).unwrap_err();
        assert!(matches!(err, ExecInvariantViolation::Numeric(_)));
    }
}
