use crate::{Error, Result};
use alloc::string::ToString;
use ndarray::{s, Array1, ArrayView1};
use ndarray_conv::{ConvExt, ConvMode, PaddingMode};

/// Convolution mode determines behavior near edges and output size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvolveMode {
    /// Full convolution, output size is `in1.len() + in2.len() - 1`
    Full,
    /// Valid convolution, output size is `max(in1.len(), in2.len()) - min(in1.len(), in2.len()) + 1`
    Valid,
    /// Same convolution, output size is `max(in1.len(), in2.len())`
    Same,
}

/// Best effort parallel behaviour with numpy's convolve method.
///
/// Returns the discrete, linear convolution of two one-dimensional sequences. Works for any
/// element type with the numeric assignment operators, so real and complex sequences are both
/// accepted.
///
/// # Parameters
/// * `a` : (N,) [[array_like]]([ndarray::Array1])
///   Signal to be (linearly) convolved.
/// * `v` : (M,) [[array_like]]([ndarray::Array1])
///   Second one-dimensional input array.
/// * `mode` : [ConvolveMode]
///   [ConvolveMode::Full]:
///   This returns the convolution at each point of overlap, with an output shape of (N+M-1,).
///   At the end-points of the convolution, the signals do not overlap completely, and boundary
///   effects may be seen.
///
///   [ConvolveMode::Same]:
///   Mode 'same' returns output of length ``max(M, N)``.  Boundary effects are still visible.
///
///   [ConvolveMode::Valid]:
///   Mode 'valid' returns output of length ``max(M, N) - min(M, N) + 1``.  The convolution
///   product is only given for points where the signals overlap completely.  Values outside the
///   signal boundary have no effect.
///
/// # Notes
/// As in numpy, the longer sequence is treated as the signal: when `v` is longer than `a` the
/// operands are swapped before convolving. Empty inputs are rejected.
///
/// The back-end correlates, so the kernel is reversed and the full product computed. `Same` and
/// `Valid` are then cut out of it at numpy's offsets, `(min(M, N) - 1) / 2` and
/// `min(M, N) - 1`.
///
/// # Examples
/// With [ConvolveMode::Full]:
/// ```
/// use ndarray::array;
/// use neurosig_core::num_rs::{ConvolveMode, convolve};
///
/// let a = array![1., 2., 3.];
/// let v = array![0., 1., 0.5];
///
/// let expected = array![0., 1., 2.5, 4., 1.5];
/// let result = convolve((&a).into(), (&v).into(), ConvolveMode::Full).unwrap();
/// assert_eq!(result, expected);
/// ```
/// With a kernel longer than the signal:
/// ```
/// use ndarray::array;
/// use neurosig_core::num_rs::{ConvolveMode, convolve};
///
/// let a = array![2.];
/// let v = array![1., 2., 3.];
///
/// let result = convolve((&a).into(), (&v).into(), ConvolveMode::Full).unwrap();
/// assert_eq!(result, array![2., 4., 6.]);
/// ```
pub fn convolve<'a, T>(
    a: ArrayView1<'a, T>,
    v: ArrayView1<'a, T>,
    mode: ConvolveMode,
) -> Result<Array1<T>>
where
    T: num_traits::NumAssign + core::marker::Copy,
{
    if a.is_empty() {
        return Err(Error::invalid_arg("a", "cannot convolve an empty sequence"));
    }
    if v.is_empty() {
        return Err(Error::invalid_arg("v", "cannot convolve an empty sequence"));
    }
    let (a, v) = if v.len() > a.len() { (v, a) } else { (a, v) };
    let flipped = v.slice(s![..;-1]).to_owned();

    let full = a
        .conv(&flipped, ConvMode::Full, PaddingMode::Zeros)
        .map_err(|e| Error::Conv {
            reason: e.to_string(),
        })?;
    let (n, m) = (a.len(), v.len());
    Ok(match mode {
        ConvolveMode::Full => full,
        ConvolveMode::Same => {
            let start = (m - 1) / 2;
            full.slice(s![start..start + n]).to_owned()
        }
        ConvolveMode::Valid => full.slice(s![m - 1..n]).to_owned(),
    })
}
