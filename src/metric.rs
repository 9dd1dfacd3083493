use crate::errors::PinboostError;
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type MetricFn = fn(&[f64], &[f64], Option<f64>) -> f64;

/// Compare two metric values, determining if b is better.
/// If one of them is NaN favor the non NaN value.
/// If both are NaN, consider the first value to be better.
pub fn is_comparison_better(value: f64, comparison: f64, maximize: bool) -> bool {
    match (value.is_nan(), comparison.is_nan()) {
        // Both nan, comparison is not better,
        // Or comparison is nan, also not better
        (true, true) | (false, true) => false,
        // comparison is not Nan, it's better
        (true, false) => true,
        // Perform numerical comparison.
        (false, false) => {
            if maximize {
                value < comparison
            } else {
                value > comparison
            }
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub enum Metric {
    QuantileLoss,
    MeanSquaredError,
    RootMeanSquaredError,
}

impl FromStr for Metric {
    type Err = PinboostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QuantileLoss" => Ok(Metric::QuantileLoss),
            "MeanSquaredError" => Ok(Metric::MeanSquaredError),
            "RootMeanSquaredError" => Ok(Metric::RootMeanSquaredError),
            _ => Err(PinboostError::ParseString(
                s.to_string(),
                "Metric".to_string(),
                items_to_strings(vec!["QuantileLoss", "MeanSquaredError", "RootMeanSquaredError"]),
            )),
        }
    }
}

pub fn metric_callables(metric_type: &Metric) -> (MetricFn, bool) {
    match metric_type {
        Metric::QuantileLoss => (QuantileLossMetric::calculate_metric, QuantileLossMetric::maximize()),
        Metric::MeanSquaredError => (MeanSquaredErrorMetric::calculate_metric, MeanSquaredErrorMetric::maximize()),
        Metric::RootMeanSquaredError => (
            RootMeanSquaredErrorMetric::calculate_metric,
            RootMeanSquaredErrorMetric::maximize(),
        ),
    }
}

pub trait EvaluationMetric {
    fn calculate_metric(y: &[f64], yhat: &[f64], alpha: Option<f64>) -> f64;
    fn maximize() -> bool;
}

pub struct QuantileLossMetric {}
impl EvaluationMetric for QuantileLossMetric {
    fn calculate_metric(y: &[f64], yhat: &[f64], alpha: Option<f64>) -> f64 {
        quantile_loss(y, yhat, alpha)
    }
    fn maximize() -> bool {
        false
    }
}

pub struct MeanSquaredErrorMetric {}
impl EvaluationMetric for MeanSquaredErrorMetric {
    fn calculate_metric(y: &[f64], yhat: &[f64], _alpha: Option<f64>) -> f64 {
        mean_squared_error(y, yhat)
    }
    fn maximize() -> bool {
        false
    }
}

pub struct RootMeanSquaredErrorMetric {}
impl EvaluationMetric for RootMeanSquaredErrorMetric {
    fn calculate_metric(y: &[f64], yhat: &[f64], _alpha: Option<f64>) -> f64 {
        root_mean_squared_error(y, yhat)
    }
    fn maximize() -> bool {
        false
    }
}

/// Average pinball loss at the given quantile level.
pub fn quantile_loss(y: &[f64], yhat: &[f64], alpha: Option<f64>) -> f64 {
    let _alpha = alpha.unwrap();
    let res = y
        .iter()
        .zip(yhat)
        .map(|(y_, yhat_)| {
            let s = *y_ - *yhat_;
            if s >= 0.0 {
                _alpha * s
            } else {
                (_alpha - 1.0) * s
            }
        })
        .sum::<f64>();
    res / y.len() as f64
}

pub fn mean_squared_error(y: &[f64], yhat: &[f64]) -> f64 {
    let res = y.iter().zip(yhat).map(|(y_, yhat_)| (y_ - yhat_).powi(2)).sum::<f64>();
    res / y.len() as f64
}

pub fn root_mean_squared_error(y: &[f64], yhat: &[f64]) -> f64 {
    mean_squared_error(y, yhat).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::precision_round;

    #[test]
    fn test_mean_squared_error() {
        let y = vec![1., 3., 4., 5., 2., 4., 6.];
        let yhat = vec![3., 2., 3., 4., 4., 4., 4.];
        let res = mean_squared_error(&y, &yhat);
        // Squared errors sum to 15 over 7 samples.
        assert_eq!(precision_round(res, 6), precision_round(15.0 / 7.0, 6));
    }

    #[test]
    fn test_root_mean_squared_error() {
        let y = vec![1., 3., 4., 5., 2., 4., 6.];
        let yhat = vec![3., 2., 3., 4., 4., 4., 4.];
        let res = root_mean_squared_error(&y, &yhat);
        assert_eq!(precision_round(res, 6), precision_round((15.0_f64 / 7.0).sqrt(), 6));
    }

    #[test]
    fn test_quantile_loss_median_is_half_mae() {
        let y = vec![1., 3., 4., 5.];
        let yhat = vec![2., 2., 2., 2.];
        let res = quantile_loss(&y, &yhat, Some(0.5));
        // |e| = [1, 1, 2, 3], mean 1.75, halved by the median pinball.
        assert_eq!(precision_round(res, 6), 0.875);
    }

    #[test]
    fn test_quantile_loss_asymmetric() {
        let y = vec![2.0];
        let yhat = vec![1.0];
        assert!(quantile_loss(&y, &yhat, Some(0.95)) > quantile_loss(&y, &yhat, Some(0.05)));
    }

    #[test]
    fn test_is_comparison_better() {
        assert!(is_comparison_better(1.0, 0.5, false));
        assert!(!is_comparison_better(0.5, 1.0, false));
        assert!(is_comparison_better(0.5, 1.0, true));
        assert!(is_comparison_better(f64::NAN, 1.0, false));
        assert!(!is_comparison_better(1.0, f64::NAN, false));
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!(Metric::from_str("QuantileLoss").unwrap(), Metric::QuantileLoss);
        assert!(Metric::from_str("AUC").is_err());
    }
}
