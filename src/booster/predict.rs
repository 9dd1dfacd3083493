//! Prediction Methods
//!
//! Inference over a fitted booster. Prediction is a pure function of the
//! ensemble and the inputs: the baseline plus the learning-rate-scaled sum
//! of every tree's leaf constant.
use crate::booster::GradientBooster;
use crate::data::Matrix;
use crate::errors::PinboostError;

impl GradientBooster {
    /// Generate predictions for the given data.
    ///
    /// * `data` - The feature matrix.
    /// * `parallel` - If `true`, predictions are computed in parallel using Rayon.
    pub fn predict(&self, data: &Matrix<f64>, parallel: bool) -> Result<Vec<f64>, PinboostError> {
        if data.cols != self.n_features {
            return Err(PinboostError::DataError(format!(
                "the model was fit on {} features, but {} were provided",
                self.n_features, data.cols
            )));
        }
        let mut init_preds = vec![self.base_score; data.rows];
        self.get_prediction_trees().iter().for_each(|tree| {
            for (p_, val) in init_preds.iter_mut().zip(tree.predict(data, parallel)) {
                *p_ += self.cfg.learning_rate * val;
            }
        });
        Ok(init_preds)
    }

    /// Generate a prediction for a single row of data.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, PinboostError> {
        if row.len() != self.n_features {
            return Err(PinboostError::DataError(format!(
                "the model was fit on {} features, but {} were provided",
                self.n_features,
                row.len()
            )));
        }
        let mut pred = self.base_score;
        for tree in self.get_prediction_trees() {
            pred += self.cfg.learning_rate * tree.predict_row_from_row_slice(row);
        }
        Ok(pred)
    }
}
