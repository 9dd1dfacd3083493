//! Objective Functions
//!
//! The loss functions the booster can minimize. Each objective knows how to
//! compute the elementwise loss, the negative gradient used as the regression
//! target of the next tree, the loss-optimal constant used to initialize the
//! ensemble, and the loss-optimal constant for a single leaf.
use crate::errors::PinboostError;
use crate::metric::Metric;
use crate::utils::{fast_sum, items_to_strings, sample_quantile};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

type LossFn = fn(&[f64], &[f64], Option<f64>) -> Vec<f64>;
type GradFn = fn(&[f64], &[f64], Option<f64>) -> Vec<f64>;
type InitFn = fn(&[f64], Option<f64>) -> f64;
type LeafFn = fn(&[f64], &[f64], Option<f64>) -> f64;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub enum Objective {
    SquaredLoss,
    QuantileLoss,
}

impl FromStr for Objective {
    type Err = PinboostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SquaredLoss" => Ok(Objective::SquaredLoss),
            "QuantileLoss" => Ok(Objective::QuantileLoss),
            _ => Err(PinboostError::ParseString(
                s.to_string(),
                "Objective".to_string(),
                items_to_strings(vec!["SquaredLoss", "QuantileLoss"]),
            )),
        }
    }
}

pub fn loss_callables(objective: &Objective) -> LossFn {
    match objective {
        Objective::SquaredLoss => SquaredLoss::calc_loss,
        Objective::QuantileLoss => QuantileLoss::calc_loss,
    }
}

pub fn gradient_callables(objective: &Objective) -> GradFn {
    match objective {
        Objective::SquaredLoss => SquaredLoss::calc_grad,
        Objective::QuantileLoss => QuantileLoss::calc_grad,
    }
}

pub fn calc_init_callables(objective: &Objective) -> InitFn {
    match objective {
        Objective::SquaredLoss => SquaredLoss::calc_init,
        Objective::QuantileLoss => QuantileLoss::calc_init,
    }
}

pub fn leaf_value_callables(objective: &Objective) -> LeafFn {
    match objective {
        Objective::SquaredLoss => SquaredLoss::calc_leaf_value,
        Objective::QuantileLoss => QuantileLoss::calc_leaf_value,
    }
}

pub fn default_metric(objective: &Objective) -> Metric {
    match objective {
        Objective::SquaredLoss => SquaredLoss::default_metric(),
        Objective::QuantileLoss => QuantileLoss::default_metric(),
    }
}

pub trait ObjectiveFunction {
    /// Elementwise loss of the predictions.
    fn calc_loss(y: &[f64], yhat: &[f64], alpha: Option<f64>) -> Vec<f64>;
    /// Negative gradient of the loss with respect to the current
    /// predictions, the pseudo-residuals the next tree is fit on.
    fn calc_grad(y: &[f64], yhat: &[f64], alpha: Option<f64>) -> Vec<f64>;
    /// Loss-optimal constant over the full training set, used as the
    /// ensemble's initial prediction.
    fn calc_init(y: &[f64], alpha: Option<f64>) -> f64;
    /// Loss-optimal constant for the samples routed to a single leaf, given
    /// their true targets and current predictions.
    fn calc_leaf_value(y: &[f64], yhat: &[f64], alpha: Option<f64>) -> f64;
    fn default_metric() -> Metric;
}

#[derive(Default)]
pub struct SquaredLoss {}

impl ObjectiveFunction for SquaredLoss {
    #[inline]
    fn calc_loss(y: &[f64], yhat: &[f64], _alpha: Option<f64>) -> Vec<f64> {
        y.iter()
            .zip(yhat)
            .map(|(y_, yhat_)| {
                let s = *y_ - *yhat_;
                s * s
            })
            .collect()
    }

    #[inline]
    fn calc_grad(y: &[f64], yhat: &[f64], _alpha: Option<f64>) -> Vec<f64> {
        y.iter().zip(yhat).map(|(y_, yhat_)| *y_ - *yhat_).collect()
    }

    fn calc_init(y: &[f64], _alpha: Option<f64>) -> f64 {
        fast_sum(y) / y.len() as f64
    }

    fn calc_leaf_value(y: &[f64], yhat: &[f64], _alpha: Option<f64>) -> f64 {
        let res = y.iter().zip(yhat).map(|(y_, yhat_)| *y_ - *yhat_).sum::<f64>();
        res / y.len() as f64
    }

    fn default_metric() -> Metric {
        Metric::RootMeanSquaredError
    }
}

#[derive(Default)]
pub struct QuantileLoss {}

impl ObjectiveFunction for QuantileLoss {
    #[inline]
    fn calc_loss(y: &[f64], yhat: &[f64], alpha: Option<f64>) -> Vec<f64> {
        let _alpha = alpha.unwrap();
        y.iter()
            .zip(yhat)
            .map(|(y_, yhat_)| {
                let s = *y_ - *yhat_;
                if s >= 0.0 {
                    _alpha * s
                } else {
                    (_alpha - 1.0) * s
                }
            })
            .collect()
    }

    /// The negative gradient is a step function: `alpha` where the target is
    /// above the prediction, `alpha - 1` where it is at or below it. Ties are
    /// always counted on the at-or-below side.
    #[inline]
    fn calc_grad(y: &[f64], yhat: &[f64], alpha: Option<f64>) -> Vec<f64> {
        let _alpha = alpha.unwrap();
        y.iter()
            .zip(yhat)
            .map(|(y_, yhat_)| if *y_ > *yhat_ { _alpha } else { _alpha - 1.0 })
            .collect()
    }

    fn calc_init(y: &[f64], alpha: Option<f64>) -> f64 {
        sample_quantile(y, alpha.unwrap())
    }

    /// The loss-optimal leaf constant is the alpha-quantile of the leftover
    /// errors `y - yhat` of the samples routed to the leaf, never their mean,
    /// and never a statistic of the step-function pseudo-residuals.
    fn calc_leaf_value(y: &[f64], yhat: &[f64], alpha: Option<f64>) -> f64 {
        let diff: Vec<f64> = y.iter().zip(yhat).map(|(y_, yhat_)| *y_ - *yhat_).collect();
        sample_quantile(&diff, alpha.unwrap())
    }

    fn default_metric() -> Metric {
        Metric::QuantileLoss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_loss_init() {
        let y = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let l1 = SquaredLoss::calc_init(&y, None);
        assert!(l1 == 0.5);

        let y = vec![-1.0, -1.0, -1.0, 1., 1., 1.];
        let l2 = SquaredLoss::calc_init(&y, None);
        assert!(l2 == 0.);
    }

    #[test]
    fn test_squared_loss_grad() {
        let y = vec![1.0, 3.0, 5.0];
        let yhat = vec![2.0, 2.0, 2.0];
        let g = SquaredLoss::calc_grad(&y, &yhat, None);
        assert_eq!(g, vec![-1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_quantile_init() {
        let y = vec![1.0, 2.0, 9.0, 3.2, 4.0];
        let l1 = QuantileLoss::calc_init(&y, Some(0.5));
        assert_eq!(l1, 3.2);

        let l2 = QuantileLoss::calc_init(&y, Some(1.0));
        assert_eq!(l2, 9.0);
    }

    #[test]
    fn test_quantile_grad_step() {
        let y = vec![2.0, 0.0, 1.0];
        let yhat = vec![1.0, 1.0, 1.0];
        let g = QuantileLoss::calc_grad(&y, &yhat, Some(0.9));
        assert!((g[0] - 0.9).abs() < 1e-12);
        assert!((g[1] + 0.1).abs() < 1e-12);
        // Tie counts on the at-or-below side.
        assert!((g[2] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_loss_asymmetry() {
        let y = vec![1.0, 1.0];
        let yhat = vec![0.0, 2.0];
        let l = QuantileLoss::calc_loss(&y, &yhat, Some(0.9));
        // Under-prediction is penalized 9 times harder at alpha=0.9.
        assert!((l[0] - 0.9).abs() < 1e-12);
        assert!((l[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_leaf_value_is_quantile_not_mean() {
        let y = vec![1.0, 2.0, 3.0, 4.0, 100.0];
        let yhat = vec![0.0; 5];
        let v = QuantileLoss::calc_leaf_value(&y, &yhat, Some(0.9));
        // 0.9-quantile of the set under linear interpolation.
        assert!((v - 61.6).abs() < 1e-9);
        // Far away from the mean (22.0), which would be the squared-error rule.
        assert!((v - 22.0).abs() > 10.0);
    }

    #[test]
    fn test_quantile_leaf_value_shifts_with_predictions() {
        let y = vec![1.0, 2.0, 3.0];
        let yhat = vec![1.0, 1.0, 1.0];
        let v = QuantileLoss::calc_leaf_value(&y, &yhat, Some(0.5));
        // Median of the leftover errors [0, 1, 2].
        assert_eq!(v, 1.0);
    }

    #[test]
    fn test_squared_leaf_value_is_residual_mean() {
        let y = vec![1.0, 2.0, 3.0, 4.0, 100.0];
        let yhat = vec![0.0; 5];
        let v = SquaredLoss::calc_leaf_value(&y, &yhat, None);
        assert_eq!(v, 22.0);
    }

    #[test]
    fn test_objective_from_str() {
        assert_eq!(Objective::from_str("SquaredLoss").unwrap(), Objective::SquaredLoss);
        assert_eq!(Objective::from_str("QuantileLoss").unwrap(), Objective::QuantileLoss);
        assert!(Objective::from_str("LogLoss").is_err());
    }
}
