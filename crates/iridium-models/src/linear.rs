//! The linear placeholder model.
//!
//! A single dense layer (`W·x + b`) is the only architecture shipped with the
//! serving core. It exists so that a freshly bootstrapped registry has
//! something to serve; real deployments upload their own artifacts.

use iridium_abstraction::{InferenceError, ModelHandle};
use serde::{Deserialize, Serialize};

/// A dense linear model: `output = W·x + b`.
///
/// `weights` is row-major with one row per output component, so the matrix
/// shape is `output_dim x input_dim` and `bias.len() == weights.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl LinearModel {
    /// Builds a model with the given weights and bias.
    ///
    /// # Errors
    /// Returns a description of the structural problem if the matrix is
    /// empty, ragged, mismatched with the bias, or contains non-finite
    /// values.
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>) -> Result<Self, String> {
        let model = Self { weights, bias };
        model.validate()?;
        Ok(model)
    }

    /// The trivially-initialized instance persisted by registry bootstrap.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::placeholder_with_dims(10, 1)
    }

    /// A trivially-initialized model of arbitrary shape.
    ///
    /// Weights are a small constant so that the output is a deterministic
    /// function of the input rather than all zeros.
    #[must_use]
    pub fn placeholder_with_dims(input_dim: usize, output_dim: usize) -> Self {
        Self {
            weights: vec![vec![0.1; input_dim]; output_dim],
            bias: vec![0.0; output_dim],
        }
    }

    /// Checks structural consistency of the weight matrix and bias vector.
    pub fn validate(&self) -> Result<(), String> {
        if self.weights.is_empty() {
            return Err("weight matrix has no rows".to_string());
        }
        let width = self.weights[0].len();
        if width == 0 {
            return Err("weight matrix has no columns".to_string());
        }
        if self.weights.iter().any(|row| row.len() != width) {
            return Err("weight matrix rows have inconsistent widths".to_string());
        }
        if self.bias.len() != self.weights.len() {
            return Err(format!(
                "bias length {} does not match {} output rows",
                self.bias.len(),
                self.weights.len()
            ));
        }
        let finite = self.weights.iter().flatten().chain(self.bias.iter()).all(|v| v.is_finite());
        if !finite {
            return Err("model contains non-finite values".to_string());
        }
        Ok(())
    }
}

impl ModelHandle for LinearModel {
    fn input_dim(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    fn output_dim(&self) -> usize {
        self.weights.len()
    }

    fn infer(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if features.len() != self.input_dim() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.input_dim(),
                actual: features.len(),
            });
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::Failed("feature vector contains non-finite values".to_string()));
        }

        let output = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();
        Ok(output)
    }

    fn describe(&self) -> String {
        format!("linear {}x{}", self.output_dim(), self.input_dim())
    }
}
