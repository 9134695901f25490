// projeto: lstmsocdata
// file: src/battery/pipeline.rs
// Extraction -> scaling -> windowing -> (optional) target reduction

use log::{debug, info};
use ndarray::{Ix3, Ix4};
use rayon::prelude::*;
use serde::Serialize;

use crate::battery::config::PipelineConfig;
use crate::battery::cycle::{Cycle, CycleExtractor};
use crate::battery::scaler::{FeatureScaler, ScaleRange};
use crate::battery::sliding::SlidingWindower;
use crate::battery::source::CycleSource;
use crate::battery::stateful::StatefulWindower;
use crate::battery::utils::DataError;
use crate::battery::WindowedSplit;

/// Scaled train/test cycles and the range fitted on the train set.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSplit {
    pub train: Vec<Cycle>,
    pub test: Vec<Cycle>,
    pub range: ScaleRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Windowed {
    Stateful(WindowedSplit<Ix4>),
    Sliding(WindowedSplit<Ix3>),
}

impl Windowed {
    pub fn shape_summary(&self) -> String {
        match self {
            Windowed::Stateful(split) => split.shape_summary(),
            Windowed::Sliding(split) => split.shape_summary(),
        }
    }

    fn shapes(&self) -> [Vec<usize>; 4] {
        fn of<D: ndarray::Dimension>(s: &WindowedSplit<D>) -> [Vec<usize>; 4] {
            [
                s.train_x.shape().to_vec(),
                s.train_y.shape().to_vec(),
                s.test_x.shape().to_vec(),
                s.test_y.shape().to_vec(),
            ]
        }
        match self {
            Windowed::Stateful(split) => of(split),
            Windowed::Sliding(split) => of(split),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub cycles: CycleSplit,
    pub windowed: Windowed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub train_cycles: usize,
    pub test_cycles: usize,
    pub train_lengths: Vec<usize>,
    pub test_lengths: Vec<usize>,
    pub feature_min: Vec<f64>,
    pub feature_max: Vec<f64>,
    pub is_stateful: bool,
    pub steps: usize,
    pub train_x: Vec<usize>,
    pub train_y: Vec<usize>,
    pub test_x: Vec<usize>,
    pub test_y: Vec<usize>,
}

pub struct DischargePipeline<S: CycleSource> {
    source: S,
    config: PipelineConfig,
}

impl<S: CycleSource> DischargePipeline<S> {
    pub fn new(source: S, config: PipelineConfig) -> Self {
        DischargePipeline { source, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn extractor(&self) -> CycleExtractor {
        let extraction = &self.config.extraction;
        CycleExtractor::new(extraction.output_capacity, extraction.output_time)
            .with_degenerate_policy(extraction.degenerate_policy)
    }

    pub fn load_cycles(&self, names: &[String]) -> Result<Vec<Cycle>, DataError> {
        let extractor = self.extractor();
        let cycles = if self.config.extraction.parallel {
            names
                .par_iter()
                .map(|name| extractor.extract(&self.source, name))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            names
                .iter()
                .map(|name| extractor.extract(&self.source, name))
                .collect::<Result<Vec<_>, _>>()?
        };
        for cycle in &cycles {
            debug!("Cycle {}: x {:?}, y {:?}", cycle.name, cycle.x.dim(), cycle.y.dim());
        }
        Ok(cycles)
    }

    /// Loads and extracts both sets, then scales features with the train range.
    pub fn get_discharge_whole_cycle(&self) -> Result<CycleSplit, DataError> {
        let train = self.load_cycles(&self.config.data.train_names)?;
        let test = self.load_cycles(&self.config.data.test_names)?;
        info!("Extracted {} train and {} test cycles", train.len(), test.len());

        let (train, test, range) = FeatureScaler::new(self.config.scaling.scale_test).fit_transform(&train, &test)?;
        Ok(CycleSplit { train, test, range })
    }

    pub fn get_stateful_cycle(&self, cycles: &CycleSplit) -> Result<WindowedSplit<Ix4>, DataError> {
        let windowing = &self.config.windowing;
        StatefulWindower::new(windowing.pad_value, windowing.steps).build(&cycles.train, &cycles.test)
    }

    pub fn get_discharge_multiple_step(&self, cycles: &CycleSplit) -> Result<WindowedSplit<Ix3>, DataError> {
        let windowing = &self.config.windowing;
        SlidingWindower::new(windowing.steps)
            .with_boundary(windowing.boundary)
            .build(&cycles.train, &cycles.test)
    }

    pub fn run(&self) -> Result<PipelineOutput, DataError> {
        self.config.validate()?;
        let cycles = self.get_discharge_whole_cycle()?;
        let windowing = &self.config.windowing;

        let windowed = if windowing.is_stateful {
            let split = self.get_stateful_cycle(&cycles)?;
            Windowed::Stateful(if windowing.keep_only_y_end { split.keep_only_y_end(true)? } else { split })
        } else {
            let split = self.get_discharge_multiple_step(&cycles)?;
            Windowed::Sliding(if windowing.keep_only_y_end { split.keep_only_y_end(false)? } else { split })
        };

        info!("{}", windowed.shape_summary());
        Ok(PipelineOutput { cycles, windowed })
    }
}

impl PipelineOutput {
    pub fn summary(&self, config: &PipelineConfig) -> RunSummary {
        let [train_x, train_y, test_x, test_y] = self.windowed.shapes();
        RunSummary {
            train_cycles: self.cycles.train.len(),
            test_cycles: self.cycles.test.len(),
            train_lengths: self.cycles.train.iter().map(Cycle::len).collect(),
            test_lengths: self.cycles.test.iter().map(Cycle::len).collect(),
            feature_min: self.cycles.range.min().to_vec(),
            feature_max: self.cycles.range.max().to_vec(),
            is_stateful: matches!(self.windowed, Windowed::Stateful(_)),
            steps: config.windowing.steps,
            train_x,
            train_y,
            test_x,
            test_y,
        }
    }
}
