use alloc::format;
use nalgebra::Complex;
use neurosig_core::{Error, Result};

/// `len(poles) - len(zeros)`, rejecting improper transfer functions.
pub(crate) fn relative_degree_checked<F>(
    zeros: &[Complex<F>],
    poles: &[Complex<F>],
) -> Result<usize> {
    poles.len().checked_sub(zeros.len()).ok_or_else(|| {
        Error::invalid_arg(
            "zpk",
            format!(
                "improper transfer function; {} poles must be >= {} zeros",
                poles.len(),
                zeros.len()
            ),
        )
    })
}
