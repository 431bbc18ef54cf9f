//! Action distributions for stochastic policies.

use crate::{PolicyError, Result};
use tch::{Kind, Tensor};

/// Action distribution produced by a policy forward pass.
///
/// `Categorical` keeps the raw scores; probabilities are only ever derived
/// through `log_softmax`. `Gaussian` is independent per action dimension and
/// `std` has the same shape as `mean`.
pub enum Distribution {
    Categorical { logits: Tensor },
    Gaussian { mean: Tensor, std: Tensor },
}

impl Distribution {
    /// Draw actions without a gradient path.
    ///
    /// Categorical samples are int64 indices with the batch shape of the
    /// logits; Gaussian samples have the shape of `mean`. Non-finite
    /// categorical probabilities are reported as `TensorError`.
    pub fn sample(&self) -> Result<Tensor> {
        tch::no_grad(|| -> Result<Tensor> {
            match self {
                Distribution::Categorical { logits } => {
                    let probs = logits.log_softmax(-1, Kind::Float).exp();
                    Ok(probs.f_multinomial(1, true)?.squeeze_dim(-1))
                }
                Distribution::Gaussian { mean, std } => {
                    let noise = Tensor::randn_like(mean);
                    Ok(mean + noise * std)
                }
            }
        })
    }

    /// Draw a reparameterized sample, `mean + std * noise`.
    ///
    /// Gradients flow back into `mean` and `std`. Only defined for the
    /// Gaussian case.
    pub fn rsample(&self) -> Result<Tensor> {
        match self {
            Distribution::Gaussian { mean, std } => {
                let noise = Tensor::randn_like(mean);
                Ok(mean + noise * std)
            }
            Distribution::Categorical { .. } => Err(PolicyError::Unimplemented(
                "rsample is not defined for a categorical distribution".to_string(),
            )),
        }
    }

    /// Log-probability of `actions`.
    ///
    /// Categorical returns one value per index. Gaussian returns the
    /// per-dimension log-density; sum over the last axis for the joint.
    pub fn log_prob(&self, actions: &Tensor) -> Tensor {
        match self {
            Distribution::Categorical { logits } => {
                let log_probs = logits.log_softmax(-1, Kind::Float);
                let indices = actions.to_kind(Kind::Int64).unsqueeze(-1);
                log_probs.gather(-1, &indices, false).squeeze_dim(-1)
            }
            Distribution::Gaussian { mean, std } => {
                let half_log_2pi = 0.5 * (2.0 * std::f64::consts::PI).ln();
                let z = (actions - mean) / std;
                z.pow_tensor_scalar(2.0) * -0.5 - std.log() - half_log_2pi
            }
        }
    }

    /// Compute entropy of the distribution
    pub fn entropy(&self) -> Tensor {
        match self {
            Distribution::Categorical { logits } => {
                let log_probs = logits.log_softmax(-1, Kind::Float);
                -(log_probs.exp() * &log_probs).sum_dim_intlist(
                    Some(&[-1_i64][..]),
                    false,
                    Kind::Float,
                )
            }
            Distribution::Gaussian { std, .. } => {
                std.log() + 0.5 + 0.5 * (2.0 * std::f64::consts::PI).ln()
            }
        }
    }

    /// Action probabilities, `None` for a Gaussian
    pub fn probs(&self) -> Option<Tensor> {
        match self {
            Distribution::Categorical { logits } => {
                Some(logits.log_softmax(-1, Kind::Float).exp())
            }
            Distribution::Gaussian { .. } => None,
        }
    }

    /// Action probabilities (categorical) or the mean (Gaussian)
    pub fn mean(&self) -> Tensor {
        match self {
            Distribution::Categorical { logits } => logits.log_softmax(-1, Kind::Float).exp(),
            Distribution::Gaussian { mean, .. } => mean.shallow_clone(),
        }
    }

    /// Per-dimension standard deviation, `None` for a categorical
    pub fn stddev(&self) -> Option<Tensor> {
        match self {
            Distribution::Categorical { .. } => None,
            Distribution::Gaussian { std, .. } => Some(std.shallow_clone()),
        }
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self, Distribution::Categorical { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind, Tensor};

    #[test]
    fn test_categorical_sample() {
        let logits = Tensor::from_slice(&[1.0f32, 2.0, 10.0]).reshape([1, 3]);
        let dist = Distribution::Categorical { logits };
        let sample = dist.sample().unwrap();
        assert_eq!(sample.size(), [1]);
        let val = sample.int64_value(&[0]);
        assert!((0..3).contains(&val));
    }

    #[test]
    fn test_categorical_sample_unbatched() {
        let logits = Tensor::from_slice(&[0.0f32, 0.0]);
        let dist = Distribution::Categorical { logits };
        let sample = dist.sample().unwrap();
        assert_eq!(sample.dim(), 0);
        assert!((0..2).contains(&sample.int64_value(&[])));
    }

    #[test]
    fn test_categorical_log_prob_matches_softmax() {
        let scores = [0.3f64, -1.2, 2.0, 0.0];
        let logits = Tensor::from_slice(&scores.map(|s| s as f32)).reshape([1, 4]);
        let dist = Distribution::Categorical { logits };

        let norm: f64 = scores.iter().map(|s| s.exp()).sum();
        for action in 0..4i64 {
            let lp = dist
                .log_prob(&Tensor::from_slice(&[action]))
                .double_value(&[0]);
            let expected = (scores[action as usize].exp() / norm).ln();
            assert!((lp - expected).abs() < 1e-5, "{} vs {}", lp, expected);
        }
    }

    #[test]
    fn test_categorical_large_scores_stay_finite() {
        let logits = Tensor::from_slice(&[1000.0f32, 0.0]).reshape([1, 2]);
        let dist = Distribution::Categorical { logits };
        let lp = dist.log_prob(&Tensor::from_slice(&[1i64])).double_value(&[0]);
        assert!(lp.is_finite());
        assert!((lp + 1000.0).abs() < 1e-2);
        assert_eq!(dist.sample().unwrap().int64_value(&[0]), 0);
    }

    #[test]
    fn test_categorical_rsample_unimplemented() {
        let dist = Distribution::Categorical {
            logits: Tensor::zeros([2], (Kind::Float, Device::Cpu)),
        };
        assert!(matches!(dist.rsample(), Err(PolicyError::Unimplemented(_))));
        assert!(dist.stddev().is_none());
        assert!(dist.is_discrete());
    }

    #[test]
    fn test_categorical_nan_sample_is_error() {
        let logits = Tensor::from_slice(&[f32::NAN, 0.0]).reshape([1, 2]);
        let dist = Distribution::Categorical { logits };
        assert!(matches!(dist.sample(), Err(PolicyError::TensorError(_))));
    }

    #[test]
    fn test_probs_sum_to_one() {
        let logits = Tensor::from_slice(&[0.0f32, 2f32.ln(), 3f32.ln()]).reshape([1, 3]);
        let dist = Distribution::Categorical { logits };
        let probs = Vec::<f32>::try_from(dist.probs().unwrap().flatten(0, -1)).unwrap();
        for (p, expected) in probs.iter().zip([1.0 / 6.0, 2.0 / 6.0, 3.0 / 6.0]) {
            assert!((p - expected).abs() < 1e-6);
        }

        let gaussian = Distribution::Gaussian {
            mean: Tensor::zeros([1, 2], (Kind::Float, Device::Cpu)),
            std: Tensor::ones([1, 2], (Kind::Float, Device::Cpu)),
        };
        assert!(gaussian.probs().is_none());
        assert!(!gaussian.is_discrete());
    }

    #[test]
    fn test_gaussian_sample() {
        let mean = Tensor::zeros([1, 2], (Kind::Float, Device::Cpu));
        let std = Tensor::from_slice(&[1.0f32, 2.0]).reshape([1, 2]);
        let dist = Distribution::Gaussian { mean, std };
        assert_eq!(dist.sample().unwrap().size(), [1, 2]);
        assert_eq!(dist.rsample().unwrap().size(), [1, 2]);
    }

    #[test]
    fn test_gaussian_rsample_is_differentiable() {
        let mean = Tensor::zeros([3], (Kind::Float, Device::Cpu)).set_requires_grad(true);
        let std = Tensor::ones([3], (Kind::Float, Device::Cpu));
        let dist = Distribution::Gaussian {
            mean: mean.shallow_clone(),
            std,
        };
        let sample = dist.rsample().unwrap();
        assert!(sample.requires_grad());
        sample.sum(Kind::Float).backward();
        assert_eq!(mean.grad().double_value(&[0]), 1.0);

        assert!(!dist.sample().unwrap().requires_grad());
    }

    #[test]
    fn test_gaussian_log_prob() {
        let mean = Tensor::zeros([1, 1], (Kind::Float, Device::Cpu));
        let std = Tensor::ones([1, 1], (Kind::Float, Device::Cpu));
        let dist = Distribution::Gaussian { mean, std };
        let x = Tensor::zeros([1, 1], (Kind::Float, Device::Cpu));
        let val = dist.log_prob(&x).double_value(&[0, 0]);
        assert!((val + 0.9189).abs() < 1e-4);
    }

    #[test]
    fn test_gaussian_log_prob_closed_form() {
        let mu = [0.5f64, -1.0, 2.0];
        let sigma = [0.5f64, 1.0, 3.0];
        let x = [0.0f64, 0.25, 4.0];
        let to_t = |v: &[f64; 3]| Tensor::from_slice(&v.map(|e| e as f32)).reshape([1, 3]);

        let dist = Distribution::Gaussian {
            mean: to_t(&mu),
            std: to_t(&sigma),
        };
        let joint = dist
            .log_prob(&to_t(&x))
            .sum_dim_intlist(Some(&[-1_i64][..]), false, Kind::Float)
            .double_value(&[0]);

        let expected: f64 = (0..3)
            .map(|i| {
                -((x[i] - mu[i]).powi(2)) / (2.0 * sigma[i].powi(2))
                    - sigma[i].ln()
                    - 0.5 * (2.0 * std::f64::consts::PI).ln()
            })
            .sum();
        assert!((joint - expected).abs() < 1e-4, "{} vs {}", joint, expected);
    }

    #[test]
    fn test_gaussian_entropy() {
        let mean = Tensor::zeros([1, 1], (Kind::Float, Device::Cpu));
        let std = Tensor::ones([1, 1], (Kind::Float, Device::Cpu));
        let dist = Distribution::Gaussian { mean, std };
        let val = dist.entropy().double_value(&[0, 0]);
        assert!((val - 1.4189).abs() < 1e-4);
    }

    #[test]
    fn test_categorical_entropy_uniform() {
        let logits = Tensor::zeros([1, 4], (Kind::Float, Device::Cpu));
        let dist = Distribution::Categorical { logits };
        let val = dist.entropy().double_value(&[0]);
        assert!((val - 4f64.ln()).abs() < 1e-5);
    }
}
