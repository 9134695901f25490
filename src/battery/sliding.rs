// projeto: lstmsocdata
// file: src/battery/sliding.rs
// Multi-step windows: independent, non-overlapping slices flattened into one batch

use log::{debug, info};
use ndarray::{s, Array3, Ix3};
use serde::{Deserialize, Serialize};

use crate::battery::cycle::Cycle;
use crate::battery::utils::DataError;
use crate::battery::WindowedSplit;

/// Loop bound used when stepping through a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowBoundary {
    /// `start < len - steps`: the last full window is dropped when
    /// `len` is an exact multiple of `steps`.
    #[default]
    Exclusive,
    /// `start + steps <= len`: every full window is kept.
    Inclusive,
}

/// Start indices of the windows taken from a sequence of `len` rows.
pub fn window_starts(len: usize, steps: usize, boundary: WindowBoundary) -> impl Iterator<Item = usize> {
    let end = match boundary {
        WindowBoundary::Exclusive => len.saturating_sub(steps),
        WindowBoundary::Inclusive if len >= steps => len - steps + 1,
        WindowBoundary::Inclusive => 0,
    };
    (0..end).step_by(steps.max(1))
}

pub fn window_count(len: usize, steps: usize, boundary: WindowBoundary) -> usize {
    window_starts(len, steps, boundary).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidingWindower {
    pub steps: usize,
    pub boundary: WindowBoundary,
}

impl SlidingWindower {
    pub fn new(steps: usize) -> Self {
        SlidingWindower {
            steps,
            boundary: WindowBoundary::default(),
        }
    }

    pub fn with_boundary(mut self, boundary: WindowBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn build(&self, train: &[Cycle], test: &[Cycle]) -> Result<WindowedSplit<Ix3>, DataError> {
        if self.steps == 0 {
            return Err(DataError::InvalidParameter("steps must be positive".to_string()));
        }
        let (n_x, n_y) = super::shared_widths(train, test)?;

        let (train_x, train_y) = self.split_to_multiple_step(train, n_x, n_y);
        let (test_x, test_y) = self.split_to_multiple_step(test, n_x, n_y);

        let split = WindowedSplit { train_x, train_y, test_x, test_y };
        info!("{}", split.shape_summary());
        Ok(split)
    }

    fn split_to_multiple_step(&self, cycles: &[Cycle], n_x: usize, n_y: usize) -> (Array3<f64>, Array3<f64>) {
        let steps = self.steps;
        let total: usize = cycles.iter().map(|c| window_count(c.len(), steps, self.boundary)).sum();

        let mut x = Array3::zeros((total, steps, n_x));
        let mut y = Array3::zeros((total, steps, n_y));
        let mut w = 0;
        for cycle in cycles {
            let mut taken = 0;
            for start in window_starts(cycle.len(), steps, self.boundary) {
                x.slice_mut(s![w, .., ..]).assign(&cycle.x.slice(s![start..start + steps, ..]));
                y.slice_mut(s![w, .., ..]).assign(&cycle.y.slice(s![start..start + steps, ..]));
                w += 1;
                taken += 1;
            }
            debug!(
                "Cycle {}: {} windows of {} steps, {} of {} rows unused",
                cycle.name,
                taken,
                steps,
                cycle.len() - taken * steps,
                cycle.len()
            );
        }
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn ramp(name: &str, len: usize) -> Cycle {
        let x = Array2::from_shape_fn((len, 3), |(i, j)| (i * 10 + j) as f64);
        let y = Array2::from_shape_fn((len, 1), |(i, _)| i as f64);
        Cycle::new(name, x, y).unwrap()
    }

    #[test]
    fn test_exclusive_boundary_counts() {
        assert_eq!(window_count(1000, 300, WindowBoundary::Exclusive), 3);
        assert_eq!(window_count(900, 300, WindowBoundary::Exclusive), 2);
        assert_eq!(window_count(300, 300, WindowBoundary::Exclusive), 0);
        assert_eq!(window_count(301, 300, WindowBoundary::Exclusive), 1);
        assert_eq!(window_count(10, 300, WindowBoundary::Exclusive), 0);
    }

    #[test]
    fn test_inclusive_boundary_counts() {
        assert_eq!(window_count(1000, 300, WindowBoundary::Inclusive), 3);
        assert_eq!(window_count(900, 300, WindowBoundary::Inclusive), 3);
        assert_eq!(window_count(300, 300, WindowBoundary::Inclusive), 1);
        assert_eq!(window_count(299, 300, WindowBoundary::Inclusive), 0);
    }

    #[test]
    fn test_windows_are_flattened_in_cycle_order() {
        let train = vec![ramp("a", 1000), ramp("b", 700)];
        let test = vec![ramp("t", 650)];
        let split = SlidingWindower::new(300).build(&train, &test).unwrap();

        // a: starts 0,300,600 ; b: starts 0,300
        assert_eq!(split.train_x.dim(), (5, 300, 3));
        assert_eq!(split.train_y.dim(), (5, 300, 1));
        assert_eq!(split.test_x.dim(), (2, 300, 3));

        assert_eq!(split.train_y[[2, 0, 0]], 600.0);
        assert_eq!(split.train_y[[2, 299, 0]], 899.0);
        assert_eq!(split.train_y[[3, 0, 0]], 0.0);
        assert_eq!(split.train_x[[4, 1, 2]], 3012.0);
    }

    #[test]
    fn test_inclusive_keeps_last_full_window() {
        let train = vec![ramp("a", 900)];
        let exclusive = SlidingWindower::new(300).build(&train, &[]).unwrap();
        let inclusive = SlidingWindower::new(300)
            .with_boundary(WindowBoundary::Inclusive)
            .build(&train, &[])
            .unwrap();
        assert_eq!(exclusive.train_x.dim().0, 2);
        assert_eq!(inclusive.train_x.dim().0, 3);
        assert_eq!(inclusive.train_y[[2, 299, 0]], 899.0);
        assert_eq!(inclusive.test_x.dim(), (0, 300, 3));
    }

    #[test]
    fn test_zero_steps_rejected() {
        let result = SlidingWindower::new(0).build(&[ramp("a", 10)], &[]);
        assert!(matches!(result, Err(DataError::InvalidParameter(_))));
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let other = Cycle::new("t", Array2::zeros((400, 2)), Array2::zeros((400, 1))).unwrap();
        let result = SlidingWindower::new(100).build(&[ramp("a", 400)], &[other]);
        assert!(matches!(result, Err(DataError::ShapeMismatch(_))));
    }
}
