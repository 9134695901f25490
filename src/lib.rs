// projeto: lstmsocdata
// file: src/lib.rs
// Turns LG HG2 discharge logs into fixed-shape tensors for SoC sequence models

pub mod battery;

pub use battery::config::PipelineConfig;
pub use battery::cycle::{Cycle, CycleExtractor, DegeneratePolicy};
pub use battery::pipeline::{CycleSplit, DischargePipeline, PipelineOutput, Windowed};
pub use battery::reduce::keep_only_y_end;
pub use battery::scaler::{FeatureScaler, ScaleRange};
pub use battery::sliding::{SlidingWindower, WindowBoundary};
pub use battery::source::{CsvCycleSource, CycleSource, MemoryCycleSource, RawRow};
pub use battery::stateful::StatefulWindower;
pub use battery::utils::DataError;
pub use battery::WindowedSplit;
