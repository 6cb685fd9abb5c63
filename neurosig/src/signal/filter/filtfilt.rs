use super::arraytools::{check_and_get_axis_dyn, map_lanes};
use super::lfilter::{lfilter_checked_slice, lfilter_zi_checked};
use alloc::{format, vec::Vec};
use core::ops::{Add, Sub};
use nalgebra::RealField;
use ndarray::{Array, ArrayBase, Data, Dimension};
use neurosig_core::{Error, Result};

/// Edge extension applied before forward-backward filtering.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FiltFiltPadType {
    /// Odd extensions
    #[default]
    Odd,
    /// Even extensions
    Even,
    /// Constant extensions
    Const,
}

impl FiltFiltPadType {
    /// Extend `x` by `n` samples at each end.
    ///
    /// * odd: point-symmetric about each end sample, `2*x[0] - x[n..0]`.
    /// * even: mirror about each end sample, `x[n..0]`.
    /// * const: repeat each end sample.
    ///
    /// `n` must be smaller than `x.len()`.
    pub fn ext<T>(&self, x: &[T], n: usize) -> Result<Vec<T>>
    where
        T: Copy + Add<T, Output = T> + Sub<T, Output = T>,
    {
        if n < 1 {
            return Ok(x.to_vec());
        }
        if n >= x.len() {
            return Err(Error::invalid_arg(
                "n",
                format!(
                    "extension of {n} samples cannot be longer than the {} sample input",
                    x.len()
                ),
            ));
        }
        let len = x.len();
        let (first, last) = (x[0], x[len - 1]);
        let left_mirror = x[1..=n].iter().rev();
        let right_mirror = x[len - 1 - n..len - 1].iter().rev();

        let mut out = Vec::with_capacity(len + 2 * n);
        match self {
            FiltFiltPadType::Odd => {
                out.extend(left_mirror.map(|v| first + first - *v));
                out.extend_from_slice(x);
                out.extend(right_mirror.map(|v| last + last - *v));
            }
            FiltFiltPadType::Even => {
                out.extend(left_mirror.copied());
                out.extend_from_slice(x);
                out.extend(right_mirror.copied());
            }
            FiltFiltPadType::Const => {
                out.extend(core::iter::repeat(first).take(n));
                out.extend_from_slice(x);
                out.extend(core::iter::repeat(last).take(n));
            }
        }
        Ok(out)
    }
}

/// Padding arguments for [filtfilt_checked_slice] and [filtfilt].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FiltFiltPad {
    /// Padding type.
    pub pad_type: FiltFiltPadType,
    /// Length of padding. `None` selects `3 * max(len(a), len(b))`.
    pub len: Option<usize>,
}

impl FiltFiltPad {
    /// Resolved pad length for a filter with `ntaps = max(len(a), len(b))`.
    pub fn edge(&self, ntaps: usize) -> usize {
        self.len.unwrap_or(3 * ntaps)
    }
}

/// Apply a digital filter forward and backward to a 1D signal.
///
/// The combined filter has zero phase and twice the order of `b`/`a`. The edges are
/// handled by extending the signal with `pad` (`None` disables padding) and starting both
/// passes from the steady state given by [lfilter_zi_checked], scaled by the first sample of
/// the sequence being filtered.
///
/// The input must be longer than the pad length.
///
/// ```
/// use neurosig::signal::filter::{filtfilt_checked_slice, FiltFiltPad};
///
/// let x: [f64; 8] = [0., 0.6389613, 0.890577, 0.9830277, 0.9992535, 0.9756868, 0.9304659, 0.8734051];
/// let y = filtfilt_checked_slice(&[0.5, 0.5], &[1.], &x, Some(FiltFiltPad::default())).unwrap();
/// assert_eq!(y.len(), x.len());
/// assert!((y[1] - 0.5421249).abs() < 1e-6);
/// ```
pub fn filtfilt_checked_slice<F>(
    b: &[F],
    a: &[F],
    x: &[F],
    pad: Option<FiltFiltPad>,
) -> Result<Vec<F>>
where
    F: RealField + Copy,
{
    let ntaps = a.len().max(b.len());
    let edge = pad.map_or(0, |p| p.edge(ntaps));
    if x.len() <= edge {
        return Err(Error::invalid_arg(
            "x",
            format!(
                "the length of the input vector x ({}) must be greater than padlen, \
                 which is {edge}",
                x.len()
            ),
        ));
    }
    let ext = match pad {
        Some(p) => p.pad_type.ext(x, edge)?,
        None => x.to_vec(),
    };
    let zi = lfilter_zi_checked(b, a)?;

    let x0 = ext[0];
    let zi_fwd: Vec<F> = zi.iter().map(|z| *z * x0).collect();
    let (mut y, _) = lfilter_checked_slice(b, a, &ext, Some(&zi_fwd))?;

    y.reverse();
    let y0 = y[0];
    let zi_bwd: Vec<F> = zi.iter().map(|z| *z * y0).collect();
    let (mut y, _) = lfilter_checked_slice(b, a, &y, Some(&zi_bwd))?;
    y.reverse();

    Ok(y[edge..y.len() - edge].to_vec())
}

/// Forward-backward filtering of every lane of `x` along `axis` (default `0`).
///
/// See [filtfilt_checked_slice]. The output has the shape of `x`.
///
/// ```
/// use ndarray::array;
/// use neurosig::signal::filter::{filtfilt, FiltFiltPad};
///
/// let x = array![
///     [1., 2., 3., 4., 5., 6., 7., 8., 9., 10.],
///     [0., 1., 4., 9., 16., 25., 36., 49., 64., 81.]
/// ];
/// let y = filtfilt::<f64, _, _>(&[0.5, 0.4, 0.1], &[1.], &x, Some(1), Some(FiltFiltPad::default())).unwrap();
/// let expected = array![
///     [1., 2., 3., 4., 5., 6., 7., 8., 9., 10.],
///     [0., 1.78, 4.88, 9.88, 16.88, 25.88, 36.88, 49.88, 64.78, 81.]
/// ];
/// y.iter().zip(expected.iter()).for_each(|(r, e)| assert!((r - e).abs() < 1e-6));
/// ```
pub fn filtfilt<F, S, D>(
    b: &[F],
    a: &[F],
    x: &ArrayBase<S, D>,
    axis: Option<isize>,
    pad: Option<FiltFiltPad>,
) -> Result<Array<F, D>>
where
    F: RealField + Copy + Default,
    S: Data<Elem = F>,
    D: Dimension,
{
    let axis = check_and_get_axis_dyn(axis, x)?;
    log::trace!("filtfilt along axis {axis} of an array shaped {:?}", x.shape());
    map_lanes(x, axis, |lane| filtfilt_checked_slice(b, a, lane, pad))
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array, Array2};

    /// Test odd_ext as from documentation.
    #[test]
    fn odd_ext_doc() {
        let odd = FiltFiltPadType::Odd;
        assert_eq!(odd.ext(&[1, 2, 3, 4, 5], 2).unwrap(), vec![-1, 0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            odd.ext(&[0, 1, 4, 9, 16], 2).unwrap(),
            vec![-4, -1, 0, 1, 4, 9, 16, 23, 28]
        );
    }

    /// Test even_ext as from documentation.
    #[test]
    fn even_ext_doc() {
        let even = FiltFiltPadType::Even;
        assert_eq!(even.ext(&[1, 2, 3, 4, 5], 2).unwrap(), vec![3, 2, 1, 2, 3, 4, 5, 4, 3]);
        assert_eq!(
            even.ext(&[0, 1, 4, 9, 16], 2).unwrap(),
            vec![4, 1, 0, 1, 4, 9, 16, 9, 4]
        );
    }

    /// Test const_ext as from documentation.
    #[test]
    fn const_ext_doc() {
        let c = FiltFiltPadType::Const;
        assert_eq!(c.ext(&[1, 2, 3, 4, 5], 2).unwrap(), vec![1, 1, 1, 2, 3, 4, 5, 5, 5]);
        assert_eq!(c.ext(&[0, 1, 4, 9], 0).unwrap(), vec![0, 1, 4, 9]);
    }

    /// Extensions must be shorter than the input.
    #[test]
    fn ext_limits() {
        for pad_type in [FiltFiltPadType::Odd, FiltFiltPadType::Even, FiltFiltPadType::Const] {
            assert!(pad_type.ext(&[1, 2, 3, 4], 3).is_ok());
            assert!(pad_type.ext(&[1, 2, 3, 4], 4).is_err());
        }
    }

    /// Tests that filtfilt works with default padding with a FIR filter.
    #[test]
    fn filtfilt_1d_fir_default_pad_small() {
        let x = [0., 0.6389613, 0.890577, 0.9830277, 0.9992535, 0.9756868, 0.9304659, 0.8734051];
        let result =
            filtfilt_checked_slice(&[0.5, 0.5], &[1.], &x, Some(FiltFiltPad::default())).unwrap();
        let expected = [
            0., 0.5421249, 0.8507858, 0.9639715, 0.9893054, 0.9702733, 0.9275059, 0.8734051,
        ];
        result
            .iter()
            .zip(expected)
            .for_each(|(r, e)| assert_relative_eq!(*r, e, max_relative = 1e-6, epsilon = 1e-10));
    }

    /// Tests that filtfilt works with default padding with a longer FIR filter.
    #[test]
    fn filtfilt_1d_fir_default_pad_big() {
        // n_elems = 25
        // x = np.sin(np.log(np.linspace(1., n_elems, n_elems)))
        // b = firwin(8, 0.2)
        // expected = filtfilt(b, [1.], x)
        let x = [
            0., 0.6389613, 0.890577, 0.9830277, 0.9992535, 0.9756868, 0.9304659, 0.8734051,
            0.8101266, 0.7439803, 0.6770137, 0.6104955, 0.5452131, 0.481649, 0.4200881, 0.3606866,
            0.3035148, 0.2485867, 0.1958789, 0.1453437, 0.0969178, 0.0505287, 0.0060984,
            -0.0364531, -0.0772063,
        ];
        let b = [
            0.0087547, 0.0479489, 0.1640244, 0.279272, 0.279272, 0.1640244, 0.0479489, 0.0087547,
        ];
        let result = filtfilt_checked_slice(&b, &[1.], &x, Some(FiltFiltPad::default())).unwrap();
        let expected = [
            0., 0.3503788, 0.6340265, 0.8172474, 0.9055143, 0.9253101, 0.9036955, 0.8594274,
            0.8033733, 0.7414859, 0.6771011, 0.6121664, 0.5478511, 0.4848631, 0.4236259, 0.3643826,
            0.3072603, 0.25231, 0.1995331, 0.1488972, 0.1003401, 0.0537529, 0.0089268, -0.0345238,
            -0.0772063,
        ];
        result
            .iter()
            .zip(expected)
            .for_each(|(r, e)| assert_relative_eq!(*r, e, max_relative = 1e-5, epsilon = 1e-10));
    }

    fn ramp_and_square(rows_n: usize) -> Array2<f64> {
        let mut x = Array::zeros((2, rows_n));
        x.row_mut(0)
            .assign(&Array::linspace(1., rows_n as f64, rows_n));
        x.row_mut(1)
            .assign(&Array::from_iter((0..rows_n).map(|i| (i as f64).powi(2))));
        x
    }

    const B8: [f64; 8] = [0.1, 0.2, 0.1, -0.3, 0.2, 0.4, 0.2, 0.1];

    /// Tests that filtfilt works with no padding with a FIR filter.
    #[test]
    fn filtfilt_2d_fir_none_pad() {
        let result = filtfilt(&B8, &[1.], &ramp_and_square(40), Some(1), None).unwrap();
        let expected = array![
            [
                2.14, 2.84, 3.67, 4.43, 5.2, 6.06, 7.01, 8., 9., 10., 11., 12., 13., 14., 15., 16.,
                17., 18., 19., 20., 21., 22., 23., 24., 25., 26., 27., 28., 29., 30., 31., 32.,
                33., 33.9, 34.6, 34.9, 35., 35.4, 35.7, 35.8
            ],
            [
                5.56, 8.54, 13.05, 19.15, 26.78, 36.04, 47.11, 60.12, 75.12, 92.12, 111.12, 132.12,
                155.12, 180.12, 207.12, 236.12, 267.12, 300.12, 335.12, 372.12, 411.12, 452.12,
                495.12, 540.12, 587.12, 636.12, 687.12, 740.12, 795.12, 852.12, 911.12, 972.12,
                1035.12, 1093.06, 1138.68, 1157.46, 1162.72, 1189.36, 1209.74, 1216.6
            ]
        ];
        result
            .iter()
            .zip(expected.iter())
            .for_each(|(r, e)| assert_relative_eq!(r, e, max_relative = 1e-6));
    }

    /// Tests that filtfilt works with some padding with a FIR filter.
    #[test]
    fn filtfilt_2d_fir_some_pad() {
        let pad = FiltFiltPad {
            pad_type: FiltFiltPadType::default(),
            len: Some(4),
        };
        let result = filtfilt(&B8, &[1.], &ramp_and_square(40), Some(1), Some(pad)).unwrap();
        let expected = array![
            [
                1.2, 2.06, 3.01, 4., 5., 6., 7., 8., 9., 10., 11., 12., 13., 14., 15., 16., 17.,
                18., 19., 20., 21., 22., 23., 24., 25., 26., 27., 28., 29., 30., 31., 32., 33.,
                34., 35., 36., 37., 37.9, 38.6, 38.9
            ],
            [
                1.94, 5.52, 11.07, 18.18, 26.44, 35.96, 47.1, 60.12, 75.12, 92.12, 111.12, 132.12,
                155.12, 180.12, 207.12, 236.12, 267.12, 300.12, 335.12, 372.12, 411.12, 452.12,
                495.12, 540.12, 587.12, 636.12, 687.12, 740.12, 795.12, 852.12, 911.12, 972.12,
                1035.12, 1100.1, 1166.96, 1235.44, 1305.18, 1368.54, 1418.2, 1439.28
            ]
        ];
        result
            .iter()
            .zip(expected.iter())
            .for_each(|(r, e)| assert_relative_eq!(r, e, max_relative = 1e-6));
    }

    /// Tests that filtfilt works with default padding with a FIR filter.
    #[test]
    fn filtfilt_2d_fir_default_pad() {
        let x = ramp_and_square(40);
        let result = filtfilt(&B8, &[1.], &x, Some(1), Some(FiltFiltPad::default())).unwrap();
        let expected = array![
            [
                1., 2., 3., 4., 5., 6., 7., 8., 9., 10., 11., 12., 13., 14., 15., 16., 17., 18.,
                19., 20., 21., 22., 23., 24., 25., 26., 27., 28., 29., 30., 31., 32., 33., 34.,
                35., 36., 37., 38., 39., 40.
            ],
            [
                0., 4.96, 10.98, 18.18, 26.44, 35.96, 47.1, 60.12, 75.12, 92.12, 111.12, 132.12,
                155.12, 180.12, 207.12, 236.12, 267.12, 300.12, 335.12, 372.12, 411.12, 452.12,
                495.12, 540.12, 587.12, 636.12, 687.12, 740.12, 795.12, 852.12, 911.12, 972.12,
                1035.12, 1100.1, 1166.96, 1235.44, 1305.18, 1375.98, 1447.96, 1521.
            ]
        ];
        result
            .iter()
            .zip(expected.iter())
            .for_each(|(r, e)| assert_relative_eq!(r, e, max_relative = 1e-6, epsilon = 1e-10));

        // transposed input along axis 0 gives the transposed result
        let xt = x.t().to_owned();
        let result_t = filtfilt(&B8, &[1.], &xt, None, Some(FiltFiltPad::default())).unwrap();
        result_t
            .t()
            .iter()
            .zip(expected.iter())
            .for_each(|(r, e)| assert_relative_eq!(r, e, max_relative = 1e-6, epsilon = 1e-10));
    }

    /// Tests that is an error if the specified padding is a lot longer than the array.
    #[test]
    fn filtfilt_2d_fir_limit() {
        let x = ramp_and_square(4);
        let result = filtfilt(&B8, &[1.], &x, Some(1), Some(FiltFiltPad::default()));
        assert!(matches!(result, Err(Error::InvalidArg { ref arg, .. }) if arg == "x"));
    }

    /// An IIR low-pass keeps a constant input constant.
    #[test]
    fn filtfilt_iir_preserves_dc() {
        let b = [0.29289322, 0.58578644, 0.29289322];
        let a = [1., 0., 0.17157288];
        let y = filtfilt_checked_slice(&b, &a, &[2.5; 30], Some(FiltFiltPad::default())).unwrap();
        y.iter().for_each(|v| assert_relative_eq!(*v, 2.5, epsilon = 1e-6));
    }
}
