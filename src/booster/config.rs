//! Booster Configuration
//!
//! Defines the configuration bundle accepted by the booster, its eager
//! validation, and the model IO helpers.
use crate::errors::PinboostError;
use crate::objective::Objective;
use crate::utils::validate_not_below_usize_parameter;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// A NaN survives a JSON round trip as `null`; map it back on the way in.
pub(crate) fn parse_nan_float<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(d).map(|x: Option<_>| x.unwrap_or(f64::NAN))
}

/// Method to calculate variable importance.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub enum ImportanceMethod {
    /// The number of times a feature is used to split the data across all trees.
    Weight,
    /// The average split gain across all splits the feature is used in.
    Gain,
    /// The average coverage across all splits the feature is used in.
    Cover,
    /// The total gain across all splits the feature is used in.
    TotalGain,
    /// The total coverage across all splits the feature is used in.
    TotalCover,
}

fn default_alpha() -> Option<f64> {
    None
}
fn default_learning_rate() -> f64 {
    0.1
}
fn default_n_estimators() -> usize {
    100
}
fn default_max_depth() -> usize {
    3
}
fn default_min_samples_split() -> usize {
    2
}
fn default_min_samples_leaf() -> usize {
    1
}
fn default_subsample() -> f64 {
    1.0
}
fn default_validation_fraction() -> f64 {
    0.1
}
fn default_stopping_rounds() -> Option<usize> {
    None
}
fn default_num_threads() -> Option<usize> {
    None
}
fn default_log_iterations() -> usize {
    0
}
fn default_seed() -> u64 {
    0
}

/// Configuration for the `GradientBooster`.
#[derive(Clone, Serialize, Deserialize)]
pub struct BoosterConfig {
    /// Learning objective.
    pub objective: Objective,
    /// Quantile level, required for, and only used by, quantile regression.
    #[serde(default = "default_alpha")]
    pub alpha: Option<f64>,
    /// Shrinkage applied to each tree's contribution.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Number of boosting rounds.
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    /// Maximum depth of each tree.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Minimum number of samples a node needs to be considered for splitting.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    /// Minimum number of samples each leaf must keep.
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    /// Fraction of rows drawn for each boosting round.
    #[serde(default = "default_subsample")]
    pub subsample: f64,
    /// Fraction of rows held out to monitor early stopping.
    #[serde(default = "default_validation_fraction")]
    pub validation_fraction: f64,
    /// Number of non-improving rounds tolerated before stopping early.
    /// Early stopping is disabled when unset.
    #[serde(default = "default_stopping_rounds")]
    pub stopping_rounds: Option<usize>,
    /// Number of threads to use during training.
    #[serde(default = "default_num_threads")]
    pub num_threads: Option<usize>,
    /// Logging frequency (every N iterations).
    #[serde(default = "default_log_iterations")]
    pub log_iterations: usize,
    /// Seed for random number generation.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        BoosterConfig {
            objective: Objective::SquaredLoss,
            alpha: None,
            learning_rate: 0.1,
            n_estimators: 100,
            max_depth: 3,
            min_samples_split: 2,
            min_samples_leaf: 1,
            subsample: 1.0,
            validation_fraction: 0.1,
            stopping_rounds: None,
            num_threads: None,
            log_iterations: 0,
            seed: 0,
        }
    }
}

impl BoosterConfig {
    /// Validate the whole configuration bundle, before any data is touched.
    pub fn validate(&self) -> Result<(), PinboostError> {
        if !(self.learning_rate > 0.0) || !self.learning_rate.is_finite() {
            return Err(PinboostError::InvalidParameter(
                "learning_rate".to_string(),
                "positive real value".to_string(),
                self.learning_rate.to_string(),
            ));
        }
        validate_not_below_usize_parameter(self.n_estimators, 1, "n_estimators")?;
        validate_not_below_usize_parameter(self.max_depth, 1, "max_depth")?;
        validate_not_below_usize_parameter(self.min_samples_split, 2, "min_samples_split")?;
        validate_not_below_usize_parameter(self.min_samples_leaf, 1, "min_samples_leaf")?;

        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(PinboostError::InvalidParameter(
                "subsample".to_string(),
                "real value in (0, 1]".to_string(),
                self.subsample.to_string(),
            ));
        }

        if self.objective == Objective::QuantileLoss {
            match self.alpha {
                Some(alpha) if alpha > 0.0 && alpha < 1.0 => (),
                Some(alpha) => {
                    return Err(PinboostError::InvalidParameter(
                        "alpha".to_string(),
                        "real value strictly between 0 and 1".to_string(),
                        alpha.to_string(),
                    ))
                }
                None => {
                    return Err(PinboostError::InvalidParameter(
                        "alpha".to_string(),
                        "a quantile level for the QuantileLoss objective".to_string(),
                        "None".to_string(),
                    ))
                }
            }
        }

        if let Some(stopping_rounds) = self.stopping_rounds {
            validate_not_below_usize_parameter(stopping_rounds, 1, "stopping_rounds")?;
            if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
                return Err(PinboostError::InvalidParameter(
                    "validation_fraction".to_string(),
                    "real value strictly between 0 and 1".to_string(),
                    self.validation_fraction.to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// IO
pub trait BoosterIO: Serialize + DeserializeOwned + Sized {
    /// Save a booster as a json object to a file.
    ///
    /// * `path` - Path to save booster.
    fn save_booster<P: AsRef<Path>>(&self, path: P) -> Result<(), PinboostError> {
        fs::write(path, self.json_dump()?).map_err(|e| PinboostError::UnableToWrite(e.to_string()))
    }

    /// Dump a booster as a json object
    fn json_dump(&self) -> Result<String, PinboostError> {
        serde_json::to_string(self).map_err(|e| PinboostError::UnableToWrite(e.to_string()))
    }

    /// Load a booster from Json string
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, PinboostError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| PinboostError::UnableToRead(e.to_string()))
    }

    /// Load a booster from a path to a json booster object.
    ///
    /// * `path` - Path to load booster from.
    fn load_booster<P: AsRef<Path>>(path: P) -> Result<Self, PinboostError> {
        let json_str = fs::read_to_string(path).map_err(|e| PinboostError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl BoosterIO for BoosterConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booster_config_default_is_valid() {
        let config = BoosterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.learning_rate, 0.1);
        assert_eq!(config.n_estimators, 100);
    }

    #[test]
    fn test_invalid_learning_rate() {
        let config = BoosterConfig {
            learning_rate: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = BoosterConfig {
            learning_rate: -0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_n_estimators() {
        let config = BoosterConfig {
            n_estimators: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PinboostError::InvalidParameter(p, _, _)) if p == "n_estimators"
        ));
    }

    #[test]
    fn test_invalid_max_depth() {
        let config = BoosterConfig {
            max_depth: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quantile_needs_alpha_in_open_interval() {
        let mut config = BoosterConfig {
            objective: Objective::QuantileLoss,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.alpha = Some(1.5);
        assert!(config.validate().is_err());
        config.alpha = Some(0.0);
        assert!(config.validate().is_err());
        config.alpha = Some(1.0);
        assert!(config.validate().is_err());
        config.alpha = Some(0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_squared_loss_ignores_alpha() {
        let config = BoosterConfig {
            objective: Objective::SquaredLoss,
            alpha: Some(1.5),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_stopping_rounds_requires_validation_fraction() {
        let config = BoosterConfig {
            stopping_rounds: Some(5),
            validation_fraction: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = BoosterConfig {
            stopping_rounds: Some(5),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_booster_io_json() {
        let config = BoosterConfig::default();
        let json = config.json_dump().unwrap();
        let config2 = BoosterConfig::from_json(&json).unwrap();
        assert_eq!(config.learning_rate, config2.learning_rate);
        assert_eq!(config.n_estimators, config2.n_estimators);
    }

    #[test]
    fn test_parse_nan_float() {
        #[derive(Deserialize)]
        struct TestStruct {
            #[serde(deserialize_with = "parse_nan_float")]
            val: f64,
        }
        let json = r#"{"val": null}"#;
        let s: TestStruct = serde_json::from_str(json).unwrap();
        assert!(s.val.is_nan());

        let json2 = r#"{"val": 0.5}"#;
        let s2: TestStruct = serde_json::from_str(json2).unwrap();
        assert_eq!(s2.val, 0.5);
    }

    #[test]
    fn test_booster_io_partial_json_uses_defaults() {
        let json = r#"{"objective": "QuantileLoss", "alpha": 0.95}"#;
        let config: BoosterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.alpha, Some(0.95));
        assert_eq!(config.max_depth, 3);
        assert!(config.validate().is_ok());
    }
}
