// projeto: lstmsocdata
// file: src/battery/reduce.rs
// Keeps only the last time step of each target window (point prediction)

use ndarray::{Array, Axis, Dimension, Slice};

use crate::battery::utils::DataError;

/// (.., steps, k) -> (.., 1, k). Stateful targets are 4-D, sliding ones 3-D.
pub fn keep_only_y_end<D: Dimension>(y: &Array<f64, D>, is_stateful: bool) -> Result<Array<f64, D>, DataError> {
    let expected = if is_stateful { 4 } else { 3 };
    if y.ndim() != expected {
        return Err(DataError::ShapeMismatch(format!(
            "expected a {}-D target tensor, got shape {:?}",
            expected,
            y.shape()
        )));
    }

    let axis = Axis(expected - 2);
    let steps = y.len_of(axis);
    if steps == 0 {
        return Err(DataError::ShapeMismatch("target windows have no time steps".to_string()));
    }
    Ok(y.slice_axis(axis, Slice::from(steps - 1..)).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, Array4};

    #[test]
    fn test_sliding_targets_keep_last_step() {
        let y = Array3::from_shape_fn((4, 10, 2), |(w, t, k)| (w * 100 + t * 10 + k) as f64);
        let end = keep_only_y_end(&y, false).unwrap();
        assert_eq!(end.dim(), (4, 1, 2));
        assert_eq!(end[[2, 0, 0]], 290.0);
        assert_eq!(end[[3, 0, 1]], 391.0);
    }

    #[test]
    fn test_stateful_targets_keep_last_step() {
        let y = Array4::from_shape_fn((2, 3, 5, 1), |(c, w, t, _)| (c * 100 + w * 10 + t) as f64);
        let end = keep_only_y_end(&y, true).unwrap();
        assert_eq!(end.dim(), (2, 3, 1, 1));
        assert_eq!(end[[1, 2, 0, 0]], 124.0);
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let y = Array3::from_shape_fn((3, 7, 1), |(w, t, _)| (w + t) as f64);
        let once = keep_only_y_end(&y, false).unwrap();
        let twice = keep_only_y_end(&once, false).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.shape()[1], 1);
    }

    #[test]
    fn test_wrong_rank_rejected() {
        let y = Array3::<f64>::zeros((2, 3, 1));
        assert!(matches!(keep_only_y_end(&y, true), Err(DataError::ShapeMismatch(_))));
        let empty = Array3::<f64>::zeros((2, 0, 1));
        assert!(matches!(keep_only_y_end(&empty, false), Err(DataError::ShapeMismatch(_))));
    }
}
