// projeto: lstmsocdata
// file: src/battery/mod.rs

pub mod utils;     // Erros e conversão de tempo
pub mod source;    // Leitura das linhas brutas (CSV ou memória)
pub mod cycle;     // Extração de features/targets por ciclo
pub mod scaler;    // Escala min-max ajustada no treino
pub mod stateful;  // Janelas com padding para modelos stateful
pub mod sliding;   // Janelas independentes (multi-step)
pub mod reduce;    // Último passo de cada janela de target
pub mod config;    // Configuração TOML
pub mod pipeline;  // Orquestração do fluxo completo

use ndarray::{Array, Dimension};

use crate::battery::cycle::Cycle;
use crate::battery::utils::DataError;

/// Train/test feature and target tensors produced by a windower.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedSplit<D: Dimension> {
    pub train_x: Array<f64, D>,
    pub train_y: Array<f64, D>,
    pub test_x: Array<f64, D>,
    pub test_y: Array<f64, D>,
}

impl<D: Dimension> WindowedSplit<D> {
    pub fn shape_summary(&self) -> String {
        format!(
            "Train x: {:?}, train y: {:?} | Test x: {:?}, test y: {:?}",
            self.train_x.shape(),
            self.train_y.shape(),
            self.test_x.shape(),
            self.test_y.shape()
        )
    }

    /// Replaces both target tensors with their last time step per window.
    pub fn keep_only_y_end(self, is_stateful: bool) -> Result<Self, DataError> {
        Ok(WindowedSplit {
            train_y: reduce::keep_only_y_end(&self.train_y, is_stateful)?,
            test_y: reduce::keep_only_y_end(&self.test_y, is_stateful)?,
            ..self
        })
    }
}

/// Feature and target widths shared by every train and test cycle.
fn shared_widths(train: &[Cycle], test: &[Cycle]) -> Result<(usize, usize), DataError> {
    let first = train
        .iter()
        .chain(test)
        .next()
        .ok_or_else(|| DataError::EmptySet("no train or test cycles to window".to_string()))?;
    let (n_x, n_y) = (first.n_features(), first.n_targets());

    for cycle in train.iter().chain(test) {
        if cycle.n_features() != n_x || cycle.n_targets() != n_y {
            return Err(DataError::ShapeMismatch(format!(
                "cycle '{}' is ({} features, {} targets), expected ({}, {})",
                cycle.name,
                cycle.n_features(),
                cycle.n_targets(),
                n_x,
                n_y
            )));
        }
    }
    Ok((n_x, n_y))
}
