//! Boosting Engine
//!
//! Iterative construction of the additive tree ensemble: a loss-optimal
//! constant baseline, then one shallow tree per round fit to the current
//! pseudo-residuals, with leaf values corrected through the objective and
//! the learning-rate-scaled contribution folded into the running prediction.

// public modules
pub mod config;
pub mod predict;

// private modules
mod setters;

use crate::booster::config::{BoosterConfig, BoosterIO, ImportanceMethod};
use crate::data::Matrix;
use crate::errors::PinboostError;
use crate::metric::{is_comparison_better, metric_callables};
use crate::objective::{calc_init_callables, default_metric, gradient_callables, leaf_value_callables, loss_callables, Objective};
use crate::sampler::{RandomSampler, Sampler};
use crate::splitter::Splitter;
use crate::tree::Tree;
use crate::utils::fast_sum;
use hashbrown::HashMap;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

type ImportanceFn = fn(&Tree, &mut HashMap<usize, (f64, usize)>);

/// Gradient boosting regressor.
///
/// A fitted booster is a self-contained ensemble: the baseline constant, the
/// learning rate, and the ordered sequence of trees. It is never mutated by
/// prediction, so a fitted booster can be shared freely across prediction
/// callers.
#[derive(Clone, Serialize, Deserialize)]
pub struct GradientBooster {
    pub cfg: BoosterConfig,
    #[serde(deserialize_with = "config::parse_nan_float")]
    pub base_score: f64,
    pub trees: Vec<Tree>,
    pub n_features: usize,
    /// Round with the best validation metric, when early stopping ran.
    pub best_iteration: Option<usize>,
    pub metadata: HashMap<String, String>,
}

impl Default for GradientBooster {
    fn default() -> Self {
        GradientBooster {
            cfg: BoosterConfig::default(),
            base_score: f64::NAN,
            trees: Vec::new(),
            n_features: 0,
            best_iteration: None,
            metadata: HashMap::new(),
        }
    }
}

impl BoosterIO for GradientBooster {}

impl GradientBooster {
    /// Create a booster from a configuration bundle, rejecting any invalid
    /// combination before it can be fit.
    pub fn new(cfg: BoosterConfig) -> Result<Self, PinboostError> {
        let booster = GradientBooster {
            cfg,
            ..Default::default()
        };
        booster.validate_parameters()?;
        Ok(booster)
    }

    pub fn validate_parameters(&self) -> Result<(), PinboostError> {
        self.cfg.validate()
    }

    /// Drop any previously fitted state.
    pub fn reset(&mut self) {
        self.trees = Vec::new();
        self.base_score = f64::NAN;
        self.best_iteration = None;
    }

    /// Fit the gradient booster on a provided dataset.
    ///
    /// Either returns a fully fitted booster, or fails with a named error
    /// before any boosting round has run.
    ///
    /// * `data` - The feature matrix.
    /// * `y` - The training targets.
    pub fn fit(&mut self, data: &Matrix<f64>, y: &[f64]) -> Result<(), PinboostError> {
        self.validate_parameters()?;
        validate_data(data, y)?;
        self.reset();
        self.n_features = data.cols;

        let n_threads_available = std::thread::available_parallelism().unwrap().get();
        let num_threads = self.cfg.num_threads.unwrap_or(n_threads_available);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .unwrap();

        pool.install(|| self.fit_trees(data, y))
    }

    fn fit_trees(&mut self, data: &Matrix<f64>, y: &[f64]) -> Result<(), PinboostError> {
        let start = Instant::now();
        let mut rng = StdRng::seed_from_u64(self.cfg.seed);

        // Alpha only reaches the loss machinery for the quantile objective;
        // a value supplied alongside squared error is ignored.
        let alpha = match self.cfg.objective {
            Objective::QuantileLoss => self.cfg.alpha,
            Objective::SquaredLoss => None,
        };
        let gradient_fn = gradient_callables(&self.cfg.objective);
        let leaf_value_fn = leaf_value_callables(&self.cfg.objective);
        let loss_fn = loss_callables(&self.cfg.objective);

        // Hold out a validation slice when early stopping is configured.
        let mut all_index: Vec<usize> = (0..data.rows).collect();
        let (train_index, valid_index) = match self.cfg.stopping_rounds {
            Some(_) => {
                all_index.shuffle(&mut rng);
                let n_valid = ((data.rows as f64) * self.cfg.validation_fraction).floor().max(1.0) as usize;
                if n_valid >= data.rows {
                    return Err(PinboostError::DataError(format!(
                        "not enough samples to hold out a validation slice of {} from {} rows",
                        n_valid, data.rows
                    )));
                }
                let (valid, train) = all_index.split_at(n_valid);
                (train.to_vec(), valid.to_vec())
            }
            None => (all_index, Vec::new()),
        };

        let y_train: Vec<f64> = train_index.iter().map(|i| y[*i]).collect();
        self.base_score = calc_init_callables(&self.cfg.objective)(&y_train, alpha);
        let mut yhat = vec![self.base_score; data.rows];

        let splitter = Splitter::new(self.cfg.min_samples_split, self.cfg.min_samples_leaf);
        let mut sampler = RandomSampler::new(self.cfg.subsample);

        let y_valid: Vec<f64> = valid_index.iter().map(|i| y[*i]).collect();
        let (metric_fn, maximize) = metric_callables(&default_metric(&self.cfg.objective));
        let mut best_metric = f64::NAN;
        let mut n_rounds_no_improvement = 0;

        for i in 0..self.cfg.n_estimators {
            let verbose = if self.cfg.log_iterations == 0 {
                false
            } else {
                i % self.cfg.log_iterations == 0
            };

            let grad = gradient_fn(y, &yhat, alpha);

            let chosen_index = if self.cfg.subsample < 1.0 {
                let (chosen, _excluded) = sampler.sample(&mut rng, &train_index);
                // A pathological draw can come back empty.
                if chosen.is_empty() {
                    train_index.clone()
                } else {
                    chosen
                }
            } else {
                train_index.clone()
            };

            let mut tree = Tree::new();
            tree.fit(
                data,
                chosen_index,
                &grad,
                y,
                &yhat,
                leaf_value_fn,
                alpha,
                &splitter,
                self.cfg.max_depth,
            );

            self.update_predictions_inplace(&mut yhat, &tree, data);

            if verbose {
                let loss = loss_fn(y, &yhat, alpha);
                info!(
                    "round {:0?}, tree.nodes: {:1?}, tree.depth: {:2?}, loss: {:3?}",
                    i,
                    tree.nodes.len(),
                    tree.depth,
                    fast_sum(&loss) / loss.len() as f64,
                );
            }

            self.trees.push(tree);

            if let Some(stopping_rounds) = self.cfg.stopping_rounds {
                let yhat_valid: Vec<f64> = valid_index.iter().map(|i| yhat[*i]).collect();
                let metric_value = metric_fn(&y_valid, &yhat_valid, alpha);
                if is_comparison_better(best_metric, metric_value, maximize) {
                    best_metric = metric_value;
                    self.best_iteration = Some(i);
                    n_rounds_no_improvement = 0;
                } else {
                    n_rounds_no_improvement += 1;
                }
                if n_rounds_no_improvement >= stopping_rounds {
                    info!(
                        "Early stopping at round {:0?}, best validation metric {:1?} at round {:2?}.",
                        i,
                        best_metric,
                        self.best_iteration.unwrap_or(0),
                    );
                    break;
                }
            }
        }

        // Roll the ensemble back to its best length.
        if let Some(best_iteration) = self.best_iteration {
            self.trees.truncate(best_iteration + 1);
        }

        if self.cfg.log_iterations > 0 {
            info!(
                "Finished training a booster with {0} trees in {1} seconds.",
                self.trees.len(),
                start.elapsed().as_secs()
            );
        }

        Ok(())
    }

    fn update_predictions_inplace(&self, yhat: &mut [f64], tree: &Tree, data: &Matrix<f64>) {
        let preds = tree.predict(data, true);
        yhat.iter_mut()
            .zip(preds)
            .for_each(|(i, j)| *i += self.cfg.learning_rate * j);
    }

    /// Get reference to the trees
    pub fn get_prediction_trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Calculate feature importance measure for the features
    /// in the model.
    /// - `method`: variable importance method to use.
    /// - `normalize`: whether to normalize the importance values with the sum.
    pub fn calculate_feature_importance(&self, method: ImportanceMethod, normalize: bool) -> HashMap<usize, f64> {
        let (average, importance_fn): (bool, ImportanceFn) = match method {
            ImportanceMethod::Weight => (false, Tree::calculate_importance_weight),
            ImportanceMethod::Gain => (true, Tree::calculate_importance_gain),
            ImportanceMethod::TotalGain => (false, Tree::calculate_importance_gain),
            ImportanceMethod::Cover => (true, Tree::calculate_importance_cover),
            ImportanceMethod::TotalCover => (false, Tree::calculate_importance_cover),
        };
        let mut stats = HashMap::new();
        for tree in self.trees.iter() {
            importance_fn(tree, &mut stats)
        }

        let importance = stats
            .iter()
            .map(|(k, (v, c))| if average { (*k, v / (*c as f64)) } else { (*k, *v) })
            .collect::<HashMap<usize, f64>>();

        if normalize {
            // To make deterministic, sort values and then sum.
            // Otherwise we were getting them in different orders, and
            // floating point error was creeping in.
            let mut values: Vec<f64> = importance.values().copied().collect();
            // We are OK to unwrap because we know we will never have missing.
            values.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let total: f64 = values.iter().sum();
            importance.iter().map(|(k, v)| (*k, v / total)).collect()
        } else {
            importance
        }
    }

    /// Insert metadata
    /// * `key` - String value for the metadata key.
    /// * `value` - value to assign to the metadata key.
    pub fn insert_metadata(&mut self, key: String, value: String) {
        self.metadata.insert(key, value);
    }

    /// Get Metadata
    /// * `key` - Get the associated value for the metadata key.
    pub fn get_metadata(&self, key: &String) -> Option<String> {
        self.metadata.get(key).cloned()
    }
}

fn validate_data(data: &Matrix<f64>, y: &[f64]) -> Result<(), PinboostError> {
    if data.rows == 0 || data.cols == 0 {
        return Err(PinboostError::DataError("the training set is empty".to_string()));
    }
    if data.data.len() != data.rows * data.cols {
        return Err(PinboostError::DataError(format!(
            "expected {} values for a {} by {} matrix, got {}",
            data.rows * data.cols,
            data.rows,
            data.cols,
            data.data.len()
        )));
    }
    if y.len() != data.rows {
        return Err(PinboostError::DataError(format!(
            "{} rows of features, but {} targets",
            data.rows,
            y.len()
        )));
    }
    if data.data.iter().any(|v| !v.is_finite()) {
        return Err(PinboostError::DataError(
            "non-finite value found in the features".to_string(),
        ));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(PinboostError::DataError(
            "non-finite value found in the targets".to_string(),
        ));
    }
    Ok(())
}
