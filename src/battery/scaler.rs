// projeto: lstmsocdata
// file: src/battery/scaler.rs
// Min-max feature scaling fitted on the training cycles only

use log::{debug, info, warn};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::battery::cycle::Cycle;
use crate::battery::utils::DataError;

/// Per-feature (min, max) computed over every training cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    min: Array1<f64>,
    max: Array1<f64>,
}

impl ScaleRange {
    pub fn fit(cycles: &[Cycle]) -> Result<Self, DataError> {
        let first = cycles
            .first()
            .ok_or_else(|| DataError::EmptySet("cannot fit a scale range without training cycles".to_string()))?;
        let n_features = first.n_features();
        check_feature_count(cycles, n_features, "train")?;

        let mut min = Array1::from_elem(n_features, f64::INFINITY);
        let mut max = Array1::from_elem(n_features, f64::NEG_INFINITY);
        for cycle in cycles {
            for (j, column) in cycle.x.axis_iter(Axis(1)).enumerate() {
                for &v in column {
                    min[j] = min[j].min(v);
                    max[j] = max[j].max(v);
                }
            }
        }

        if min.iter().any(|v| !v.is_finite()) {
            return Err(DataError::EmptySet("training cycles contain no feature rows".to_string()));
        }
        for j in 0..n_features {
            if min[j] == max[j] {
                warn!("Feature {} is constant ({}) across the training set", j, min[j]);
            }
        }

        debug!("Scale range fitted: min={:?} max={:?}", min.to_vec(), max.to_vec());
        Ok(ScaleRange { min, max })
    }

    pub fn n_features(&self) -> usize {
        self.min.len()
    }

    pub fn min(&self) -> &Array1<f64> {
        &self.min
    }

    pub fn max(&self) -> &Array1<f64> {
        &self.max
    }

    /// max - min, with 1.0 standing in for a constant feature.
    fn span(&self) -> Array1<f64> {
        (&self.max - &self.min).mapv(|s| if s == 0.0 { 1.0 } else { s })
    }

    fn check(&self, x: &Array2<f64>) -> Result<(), DataError> {
        if x.ncols() != self.n_features() {
            return Err(DataError::ShapeMismatch(format!(
                "scale range has {} features, tensor has {}",
                self.n_features(),
                x.ncols()
            )));
        }
        Ok(())
    }

    /// `(v - min) / (max - min)`, without clipping.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, DataError> {
        self.check(x)?;
        Ok((x - &self.min) / &self.span())
    }

    pub fn inverse(&self, x: &Array2<f64>) -> Result<Array2<f64>, DataError> {
        self.check(x)?;
        Ok(x * &self.span() + &self.min)
    }

    /// A scaled copy of the cycle; targets are left untouched.
    pub fn apply(&self, cycle: &Cycle) -> Result<Cycle, DataError> {
        Cycle::new(cycle.name.clone(), self.transform(&cycle.x)?, cycle.y.clone())
    }
}

fn check_feature_count(cycles: &[Cycle], expected: usize, set: &str) -> Result<(), DataError> {
    match cycles.iter().find(|c| c.n_features() != expected) {
        Some(c) => Err(DataError::ShapeMismatch(format!(
            "{} cycle '{}' has {} features, expected {}",
            set,
            c.name,
            c.n_features(),
            expected
        ))),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureScaler {
    /// Apply the train-fitted range to the test cycles as well.
    pub scale_test: bool,
}

impl FeatureScaler {
    pub fn new(scale_test: bool) -> Self {
        FeatureScaler { scale_test }
    }

    /// Fits on `train` and returns scaled copies plus the fitted range.
    /// Test cycles never contribute to the range.
    pub fn fit_transform(
        &self,
        train: &[Cycle],
        test: &[Cycle],
    ) -> Result<(Vec<Cycle>, Vec<Cycle>, ScaleRange), DataError> {
        let range = ScaleRange::fit(train)?;
        check_feature_count(test, range.n_features(), "test")?;

        let train_scaled = train.iter().map(|c| range.apply(c)).collect::<Result<Vec<_>, _>>()?;
        let test_out = if self.scale_test {
            test.iter().map(|c| range.apply(c)).collect::<Result<Vec<_>, _>>()?
        } else {
            test.to_vec()
        };

        info!(
            "Scaled {} train cycles{}",
            train_scaled.len(),
            if self.scale_test { format!(" and {} test cycles", test_out.len()) } else { String::new() }
        );
        Ok((train_scaled, test_out, range))
    }
}
