// projeto: lstmsocdata
// file: src/battery/cycle.rs
// Per-cycle feature/target extraction from raw discharge rows

use log::{debug, info, warn};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::battery::source::{CycleSource, RawRow};
use crate::battery::utils::{time_string_to_seconds, DataError};

/// Status codes of the rows that belong to the drive cycle.
pub const DISCHARGE_STATUSES: [&str; 2] = ["TABLE", "DCH"];

pub const FEATURE_NAMES: [&str; 3] = ["voltage", "current", "temperature"];

/// What to do with a cycle whose SoC maximum is zero when the
/// percentage target is requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    #[default]
    Error,
    Zero,
}

/// One discharge run: features `x` (len, 3) and targets `y` (len, k).
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    pub name: String,
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

impl Cycle {
    pub fn new(name: impl Into<String>, x: Array2<f64>, y: Array2<f64>) -> Result<Self, DataError> {
        let name = name.into();
        if x.nrows() != y.nrows() {
            return Err(DataError::ShapeMismatch(format!(
                "cycle '{}' has {} feature rows but {} target rows",
                name,
                x.nrows(),
                y.nrows()
            )));
        }
        Ok(Cycle { name, x, y })
    }

    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn n_targets(&self) -> usize {
        self.y.ncols()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleExtractor {
    /// Absolute SoC capacity (Ah) instead of the normalized percentage.
    pub output_capacity: bool,
    /// Append elapsed seconds as a second target column.
    pub output_time: bool,
    pub degenerate_policy: DegeneratePolicy,
}

impl CycleExtractor {
    pub fn new(output_capacity: bool, output_time: bool) -> Self {
        CycleExtractor {
            output_capacity,
            output_time,
            degenerate_policy: DegeneratePolicy::default(),
        }
    }

    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    pub fn target_columns(&self) -> usize {
        if self.output_time { 2 } else { 1 }
    }

    pub fn extract<S: CycleSource + ?Sized>(&self, source: &S, name: &str) -> Result<Cycle, DataError> {
        let rows = source.read_rows(name)?;
        self.extract_rows(name, &rows)
    }

    pub fn extract_rows(&self, name: &str, rows: &[RawRow]) -> Result<Cycle, DataError> {
        let selected: Vec<&RawRow> = rows
            .iter()
            .filter(|r| DISCHARGE_STATUSES.contains(&r.status.as_str()))
            .collect();
        debug!("Cycle {}: {} of {} rows are discharge rows", name, selected.len(), rows.len());

        let min_capacity = selected
            .iter()
            .filter_map(|r| r.capacity)
            .fold(f64::INFINITY, f64::min);
        if !min_capacity.is_finite() {
            return Err(DataError::EmptyCycle { name: name.to_string() });
        }

        let max_discharge = min_capacity.abs();
        let soc_capacity: Vec<Option<f64>> = selected
            .iter()
            .map(|r| r.capacity.map(|c| max_discharge + c))
            .collect();

        let primary = if self.output_capacity {
            soc_capacity
        } else {
            self.soc_percentage(name, &soc_capacity)?
        };

        let elapsed = if self.output_time {
            Some(elapsed_seconds(&selected)?)
        } else {
            None
        };

        // one mask for both tensors so x and y rows stay aligned
        let valid_rows: Vec<bool> = selected
            .iter()
            .enumerate()
            .map(|(i, r)| {
                r.voltage.is_some()
                    && r.current.is_some()
                    && r.temperature.is_some()
                    && primary[i].is_some()
                    && elapsed.as_ref().is_none_or(|t| t[i].is_some())
            })
            .collect();

        let kept = valid_rows.iter().filter(|&&v| v).count();
        let dropped = selected.len() - kept;
        if dropped > 0 {
            info!("There is a missing value in cycle {}, removing {} rows", name, dropped);
        }
        if kept == 0 {
            return Err(DataError::EmptyCycle { name: name.to_string() });
        }

        let k = self.target_columns();
        let mut x_flat = Vec::with_capacity(kept * FEATURE_NAMES.len());
        let mut y_flat = Vec::with_capacity(kept * k);
        for (i, row) in selected.iter().enumerate() {
            if !valid_rows[i] {
                continue;
            }
            for value in [row.voltage, row.current, row.temperature].into_iter().flatten() {
                x_flat.push(value);
            }
            y_flat.extend(primary[i]);
            if let Some(t) = &elapsed {
                y_flat.extend(t[i]);
            }
        }

        let x = Array2::from_shape_vec((kept, FEATURE_NAMES.len()), x_flat)?;
        let y = Array2::from_shape_vec((kept, k), y_flat)?;
        Cycle::new(name, x, y)
    }

    fn soc_percentage(&self, name: &str, soc_capacity: &[Option<f64>]) -> Result<Vec<Option<f64>>, DataError> {
        let soc_max = soc_capacity
            .iter()
            .flatten()
            .fold(f64::NEG_INFINITY, |a, &b| a.max(b));

        if soc_max == 0.0 {
            return match self.degenerate_policy {
                DegeneratePolicy::Error => Err(DataError::DegenerateCycle { name: name.to_string() }),
                DegeneratePolicy::Zero => {
                    warn!("Cycle {} has a zero SoC maximum, percentage set to 0", name);
                    Ok(soc_capacity.iter().map(|c| c.map(|_| 0.0)).collect())
                }
            };
        }

        Ok(soc_capacity.iter().map(|c| c.map(|v| v / soc_max)).collect())
    }
}

/// Seconds since the first discharge row with a readable program time.
/// Empty time cells count as missing values.
fn elapsed_seconds(selected: &[&RawRow]) -> Result<Vec<Option<f64>>, DataError> {
    let absolute = selected
        .iter()
        .map(|r| {
            if r.prog_time.trim().is_empty() {
                Ok(None)
            } else {
                time_string_to_seconds(&r.prog_time).map(Some)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let start = absolute.iter().flatten().next().copied().unwrap_or(0.0);
    Ok(absolute.into_iter().map(|t| t.map(|s| s - start)).collect())
}
