use alloc::{format, vec::Vec};
use ndarray::{Array, ArrayBase, Axis, Data, Dimension};
use neurosig_core::{Error, Result};

/// Resolve a user axis (negative values count from the end) against `x`.
///
/// # Parameters
/// axis: The user-specified axis which the operation is applied on. Defaults to `0`.
/// x: The input-data whose axis object that will be manipulated against.
#[inline]
pub(crate) fn check_and_get_axis_dyn<T, S, D>(
    axis: Option<isize>,
    x: &ArrayBase<S, D>,
) -> Result<usize>
where
    D: Dimension,
    S: Data<Elem = T>,
{
    let ndim = x.ndim();
    let axis_inner = axis.unwrap_or(0);
    let resolved = if axis_inner >= 0 {
        Some(axis_inner.unsigned_abs()).filter(|ax| *ax < ndim)
    } else {
        ndim.checked_add_signed(axis_inner)
    };
    resolved.ok_or_else(|| {
        Error::invalid_arg(
            "axis",
            format!("index {axis_inner} is out of range for an array with {ndim} dimensions"),
        )
    })
}

/// Apply `f` to every 1D lane of `x` along `axis`, building an array of the same shape.
///
/// Each lane is copied into a contiguous buffer before `f` sees it, so strided or
/// non-standard layouts are accepted. `f` must return as many samples as it was given.
pub(crate) fn map_lanes<A, B, S, D, F>(
    x: &ArrayBase<S, D>,
    axis: usize,
    mut f: F,
) -> Result<Array<B, D>>
where
    A: Clone,
    B: Clone + Default,
    S: Data<Elem = A>,
    D: Dimension,
    F: FnMut(&[A]) -> Result<Vec<B>>,
{
    let axis = Axis(axis);
    let mut out = Array::<B, D>::default(x.raw_dim());
    let mut buffer = Vec::with_capacity(x.len_of(axis));
    for (lane, mut out_lane) in x.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        buffer.clear();
        buffer.extend(lane.iter().cloned());
        let y = f(&buffer)?;
        if y.len() != out_lane.len() {
            return Err(Error::ExecInvariantViolation {
                reason: format!(
                    "lane operation returned {} samples for a lane of {}",
                    y.len(),
                    out_lane.len()
                ),
            });
        }
        out_lane.iter_mut().zip(y).for_each(|(o, v)| *o = v);
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn axis_defaults_to_first() {
        let x = Array3::<f64>::zeros((2, 3, 4));
        assert_eq!(check_and_get_axis_dyn(None, &x).unwrap(), 0);
        assert_eq!(check_and_get_axis_dyn(Some(2), &x).unwrap(), 2);
        assert_eq!(check_and_get_axis_dyn(Some(-1), &x).unwrap(), 2);
        assert_eq!(check_and_get_axis_dyn(Some(-3), &x).unwrap(), 0);
    }

    #[test]
    fn axis_out_of_range() {
        let x = array![1., 2., 3.];
        for axis in [1, 2, -2] {
            let err = check_and_get_axis_dyn(Some(axis), &x).unwrap_err();
            assert!(matches!(err, Error::InvalidArg { ref arg, .. } if arg == "axis"));
        }
    }

    #[test]
    fn lanes_follow_axis() {
        let x = array![[1., 2., 3.], [4., 5., 6.]];
        let cumsum = |lane: &[f64]| -> Result<Vec<f64>> {
            Ok(lane
                .iter()
                .scan(0., |acc, v| {
                    *acc += v;
                    Some(*acc)
                })
                .collect())
        };
        let rows = map_lanes(&x, 1, cumsum).unwrap();
        assert_eq!(rows, array![[1., 3., 6.], [4., 9., 15.]]);

        let cols = map_lanes(&x, 0, cumsum).unwrap();
        assert_eq!(cols, array![[1., 2., 3.], [5., 7., 9.]]);

        let t = x.t();
        let strided = map_lanes(&t, 0, cumsum).unwrap();
        assert_eq!(strided, array![[1., 4.], [3., 9.], [6., 15.]]);
    }

    #[test]
    fn lane_length_is_enforced() {
        let x = array![1., 2., 3.];
        let err = map_lanes(&x, 0, |lane: &[f64]| Ok(lane[..1].to_vec())).unwrap_err();
        assert!(matches!(err, Error::ExecInvariantViolation { .. }));
    }
}
