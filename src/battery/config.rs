// projeto: lstmsocdata
// file: src/battery/config.rs
// Configuração do pipeline (arquivo TOML + valores padrão)

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::battery::cycle::DegeneratePolicy;
use crate::battery::sliding::WindowBoundary;
use crate::battery::utils::DataError;

pub const DEFAULT_CONFIG_FILE: &str = "socdata.toml";
pub const DATA_PATH: &str =
    "./data/LG 18650HG2 Li-ion Battery Data/LG_HG2_Original_Dataset_McMasterUniversity_Jan_2020/";
/// Metadata lines written by the cycler before the column header.
pub const HEADER_LINES: usize = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub extraction: ExtractionConfig,
    pub scaling: ScalingConfig,
    pub windowing: WindowingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub base_path: PathBuf,
    pub header_lines: usize,
    pub train_names: Vec<String>,
    pub test_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub output_capacity: bool,
    pub output_time: bool,
    pub degenerate_policy: DegeneratePolicy,
    pub parallel: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    pub scale_test: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowingConfig {
    pub is_stateful: bool,
    pub steps: usize,
    pub pad_value: f64,
    pub boundary: WindowBoundary,
    pub keep_only_y_end: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(DATA_PATH),
            header_lines: HEADER_LINES,
            train_names: ["25degC/551_LA92", "25degC/551_Mixed1", "25degC/551_Mixed2", "25degC/551_UDDS"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            test_names: ["25degC/552_Mixed4", "25degC/552_Mixed5", "25degC/552_Mixed6"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            is_stateful: true,
            steps: 300,
            pad_value: 0.0,
            boundary: WindowBoundary::Exclusive,
            keep_only_y_end: false,
        }
    }
}

impl PipelineConfig {
    /// Reads `path`, or `socdata.toml` when present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, DataError> {
        match path {
            Some(p) => Self::from_file(p),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(Path::new(DEFAULT_CONFIG_FILE)),
            None => {
                info!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, DataError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.windowing.steps == 0 {
            return Err(DataError::InvalidParameter("windowing.steps must be positive".to_string()));
        }
        if !self.windowing.pad_value.is_finite() {
            return Err(DataError::InvalidParameter("windowing.pad_value must be finite".to_string()));
        }
        if self.data.train_names.is_empty() {
            return Err(DataError::EmptySet("data.train_names is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.data.header_lines, 30);
        assert_eq!(config.data.train_names.len(), 4);
        assert_eq!(config.data.test_names.len(), 3);
        assert!(config.windowing.is_stateful);
        assert_eq!(config.windowing.steps, 300);
        assert_eq!(config.windowing.pad_value, 0.0);
        assert!(!config.scaling.scale_test);
        assert_eq!(config.extraction.degenerate_policy, DegeneratePolicy::Error);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
            [extraction]
            output_time = true
            degenerate_policy = "zero"

            [windowing]
            is_stateful = false
            steps = 50
            boundary = "inclusive"
            "#,
        )
        .unwrap();

        assert!(config.extraction.output_time);
        assert!(!config.extraction.output_capacity);
        assert_eq!(config.extraction.degenerate_policy, DegeneratePolicy::Zero);
        assert!(!config.windowing.is_stateful);
        assert_eq!(config.windowing.steps, 50);
        assert_eq!(config.windowing.boundary, WindowBoundary::Inclusive);
        assert_eq!(config.data, DataConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = PipelineConfig::from_toml("[windowing]\nsteps = 0\n");
        assert!(matches!(result, Err(DataError::InvalidParameter(_))));

        let result = PipelineConfig::from_toml("[data]\ntrain_names = []\n");
        assert!(matches!(result, Err(DataError::EmptySet(_))));

        let result = PipelineConfig::from_toml("[windowing]\nsteps = \"many\"\n");
        assert!(matches!(result, Err(DataError::Config(_))));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = PipelineConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(PipelineConfig::from_toml(&text).unwrap(), config);
    }
}
