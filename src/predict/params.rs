/// Preprocessing parameters exported by the model training pipeline
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{OddsError, Result};

/// Scaler and encoder state frozen at training time. The feature builder
/// must reproduce exactly this ordering and scaling or the model sees
/// garbage.
#[derive(Debug, Clone, Deserialize)]
pub struct PreprocessingParams {
    pub numerical_features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub scaler_mean: Vec<f64>,
    pub scaler_scale: Vec<f64>,
    pub ohe_categories: HashMap<String, Vec<String>>,
}

impl PreprocessingParams {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let params: PreprocessingParams = serde_json::from_str(&raw)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.numerical_features.len();
        if self.scaler_mean.len() != n || self.scaler_scale.len() != n {
            return Err(OddsError::ModelError(format!(
                "scaler arrays must match {} numerical features (mean: {}, scale: {})",
                n,
                self.scaler_mean.len(),
                self.scaler_scale.len()
            )));
        }
        if self.scaler_scale.iter().any(|s| *s == 0.0) {
            return Err(OddsError::ModelError(
                "scaler scale contains a zero entry".to_string(),
            ));
        }
        for feature in &self.categorical_features {
            if !self.ohe_categories.contains_key(feature) {
                return Err(OddsError::ModelError(format!(
                    "no category list for feature '{feature}'"
                )));
            }
        }
        Ok(())
    }

    /// Width of the assembled feature vector.
    pub fn feature_len(&self) -> usize {
        self.numerical_features.len()
            + self
                .categorical_features
                .iter()
                .filter_map(|f| self.ohe_categories.get(f))
                .map(|cats| cats.len())
                .sum::<usize>()
    }
}
