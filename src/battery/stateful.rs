// projeto: lstmsocdata
// file: src/battery/stateful.rs
// Padded whole-cycle batches split into ordered windows for stateful models

use log::{info, warn};
use ndarray::{s, Array3, Array4, Ix4};

use crate::battery::cycle::Cycle;
use crate::battery::utils::DataError;
use crate::battery::WindowedSplit;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatefulWindower {
    pub pad_value: f64,
    pub steps: usize,
}

impl Default for StatefulWindower {
    fn default() -> Self {
        StatefulWindower { pad_value: 0.0, steps: 100 }
    }
}

impl StatefulWindower {
    pub fn new(pad_value: f64, steps: usize) -> Self {
        StatefulWindower { pad_value, steps }
    }

    /// Pads every cycle to the longest cycle of train and test together and
    /// cuts it into `max_length / steps` consecutive windows. Rows past the
    /// last full window are truncated.
    pub fn build(&self, train: &[Cycle], test: &[Cycle]) -> Result<WindowedSplit<Ix4>, DataError> {
        if self.steps == 0 {
            return Err(DataError::InvalidParameter("steps must be positive".to_string()));
        }
        let (n_x, n_y) = super::shared_widths(train, test)?;

        let max_length = train.iter().chain(test).map(Cycle::len).max().unwrap_or(0);
        let windows = max_length / self.steps;
        if windows == 0 {
            return Err(DataError::InvalidParameter(format!(
                "steps ({}) is longer than the longest cycle ({})",
                self.steps, max_length
            )));
        }
        let truncated = max_length - windows * self.steps;
        if truncated > 0 {
            warn!(
                "Padded length {} is not a multiple of {}, dropping the last {} rows of every cycle",
                max_length, self.steps, truncated
            );
        }
        info!("Padding {} train and {} test cycles to {} rows, {} windows each", train.len(), test.len(), max_length, windows);

        let (train_x, train_y) = self.to_padded_cycle(train, max_length, n_x, n_y);
        let (test_x, test_y) = self.to_padded_cycle(test, max_length, n_x, n_y);

        let split = WindowedSplit {
            train_x: self.split_cycle(train_x, windows)?,
            train_y: self.split_cycle(train_y, windows)?,
            test_x: self.split_cycle(test_x, windows)?,
            test_y: self.split_cycle(test_y, windows)?,
        };
        info!("{}", split.shape_summary());
        Ok(split)
    }

    fn to_padded_cycle(&self, cycles: &[Cycle], max_length: usize, n_x: usize, n_y: usize) -> (Array3<f64>, Array3<f64>) {
        let mut x = Array3::from_elem((cycles.len(), max_length, n_x), self.pad_value);
        let mut y = Array3::from_elem((cycles.len(), max_length, n_y), self.pad_value);
        for (i, cycle) in cycles.iter().enumerate() {
            let len = cycle.len();
            x.slice_mut(s![i, ..len, ..]).assign(&cycle.x);
            y.slice_mut(s![i, ..len, ..]).assign(&cycle.y);
        }
        (x, y)
    }

    /// (cycles, max_length, f) -> (cycles, windows, steps, f), keeping time order.
    fn split_cycle(&self, padded: Array3<f64>, windows: usize) -> Result<Array4<f64>, DataError> {
        let (n, _, features) = padded.dim();
        let kept = padded.slice(s![.., ..windows * self.steps, ..]).to_owned();
        Ok(kept.into_shape_with_order((n, windows, self.steps, features))?)
    }
}
