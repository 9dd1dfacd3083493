use crate::booster::GradientBooster;
use crate::objective::Objective;

impl GradientBooster {
    // Set methods for parameters

    /// Set the objective on the booster.
    /// * `objective` - The objective type of the booster.
    pub fn set_objective(mut self, objective: Objective) -> Self {
        self.cfg.objective = objective;
        self
    }

    /// Set the quantile level on the booster.
    /// * `alpha` - The quantile level the booster approximates, required
    ///   for the quantile objective.
    pub fn set_alpha(mut self, alpha: Option<f64>) -> Self {
        self.cfg.alpha = alpha;
        self
    }

    /// Set the learning rate on the booster.
    /// * `learning_rate` - Shrinkage applied to each tree's contribution.
    pub fn set_learning_rate(mut self, learning_rate: f64) -> Self {
        self.cfg.learning_rate = learning_rate;
        self
    }

    /// Set the number of boosting rounds on the booster.
    /// * `n_estimators` - Number of trees to fit.
    pub fn set_n_estimators(mut self, n_estimators: usize) -> Self {
        self.cfg.n_estimators = n_estimators;
        self
    }

    /// Set the maximum tree depth on the booster.
    /// * `max_depth` - Maximum depth of each fitted tree.
    pub fn set_max_depth(mut self, max_depth: usize) -> Self {
        self.cfg.max_depth = max_depth;
        self
    }

    /// Set the minimum node size considered for splitting.
    /// * `min_samples_split` - Minimum number of samples a node needs to be
    ///   considered for splitting.
    pub fn set_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.cfg.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum leaf size.
    /// * `min_samples_leaf` - Minimum number of samples each leaf must keep.
    pub fn set_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.cfg.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the row subsampling fraction on the booster.
    /// * `subsample` - Fraction of rows drawn for each boosting round.
    pub fn set_subsample(mut self, subsample: f64) -> Self {
        self.cfg.subsample = subsample;
        self
    }

    /// Set the validation holdout fraction on the booster.
    /// * `validation_fraction` - Fraction of rows held out to monitor early
    ///   stopping.
    pub fn set_validation_fraction(mut self, validation_fraction: f64) -> Self {
        self.cfg.validation_fraction = validation_fraction;
        self
    }

    /// Set the early stopping patience on the booster.
    /// * `stopping_rounds` - Number of non-improving rounds tolerated before
    ///   stopping early, disabled when `None`.
    pub fn set_stopping_rounds(mut self, stopping_rounds: Option<usize>) -> Self {
        self.cfg.stopping_rounds = stopping_rounds;
        self
    }

    /// Set the number of threads on the booster.
    /// * `num_threads` - Set the number of threads to be used during training.
    pub fn set_num_threads(mut self, num_threads: Option<usize>) -> Self {
        self.cfg.num_threads = num_threads;
        self
    }

    /// Set the logging frequency on the booster.
    /// * `log_iterations` - Log progress every N iterations, disabled at zero.
    pub fn set_log_iterations(mut self, log_iterations: usize) -> Self {
        self.cfg.log_iterations = log_iterations;
        self
    }

    /// Set the seed on the booster.
    /// * `seed` - Integer value used to seed any randomness used in the algorithm.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.cfg.seed = seed;
        self
    }
}
