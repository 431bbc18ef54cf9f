//! Policy-gradient actor update.

use super::{ActionBatch, Distribution, MlpPolicy, PolicyMetrics, TrainablePolicy, ACTOR_LOSS};
use crate::config::PolicyConfig;
use crate::utils::{from_array1, from_array2, from_index_array};
use crate::{PolicyError, Result};
use ndarray::{ArrayView1, ArrayView2};
use tch::{Kind, Tensor};

/// MLP policy trained with the vanilla policy-gradient rule
///
/// Minimizes `-mean(log_prob(action) * advantage)`, which ascends the
/// advantage-weighted log-likelihood of the taken actions.
pub struct MlpPolicyPG {
    policy: MlpPolicy,
}

impl MlpPolicyPG {
    pub fn new(config: PolicyConfig) -> Result<Self> {
        Ok(Self {
            policy: MlpPolicy::new(config)?,
        })
    }

    pub fn policy_mut(&mut self) -> &mut MlpPolicy {
        &mut self.policy
    }

    /// Differentiable actor loss for a batch, without taking a step
    pub fn actor_loss(
        &self,
        observations: ArrayView2<f32>,
        actions: ActionBatch<'_>,
        advantages: ArrayView1<f32>,
    ) -> Result<Tensor> {
        let batch = observations.nrows();
        if batch == 0 {
            return Err(PolicyError::InvalidArgument("empty batch".to_string()));
        }
        if actions.len() != batch {
            return Err(PolicyError::ShapeMismatch {
                expected: vec![batch],
                actual: vec![actions.len()],
            });
        }
        if advantages.len() != batch {
            return Err(PolicyError::ShapeMismatch {
                expected: vec![batch],
                actual: vec![advantages.len()],
            });
        }

        let device = self.policy.device();
        let action_dim = self.policy.action_dim();
        let actions = match actions {
            ActionBatch::Discrete(indices) if self.policy.is_discrete() => {
                if let Some(bad) = indices.iter().find(|&&a| a < 0 || a >= action_dim) {
                    return Err(PolicyError::InvalidArgument(format!(
                        "action index {} outside [0, {})",
                        bad, action_dim
                    )));
                }
                from_index_array(indices, device)
            }
            ActionBatch::Continuous(values) if !self.policy.is_discrete() => {
                if values.ncols() as i64 != action_dim {
                    return Err(PolicyError::ShapeMismatch {
                        expected: vec![batch, action_dim as usize],
                        actual: values.shape().to_vec(),
                    });
                }
                from_array2(values, device)
            }
            ActionBatch::Discrete(_) => {
                return Err(PolicyError::InvalidArgument(
                    "discrete actions passed to a continuous policy".to_string(),
                ))
            }
            ActionBatch::Continuous(_) => {
                return Err(PolicyError::InvalidArgument(
                    "continuous actions passed to a discrete policy".to_string(),
                ))
            }
        };

        let obs = self.policy.observations_to_tensor(observations)?;
        let advantages = from_array1(advantages, device);

        let dist = self.policy.forward(&obs);
        let log_p = match &dist {
            Distribution::Categorical { .. } => dist.log_prob(&actions),
            // action dimensions are independent, so the joint is the sum
            Distribution::Gaussian { .. } => dist.log_prob(&actions).sum_dim_intlist(
                Some(&[-1_i64][..]),
                false,
                Kind::Float,
            ),
        };

        Ok(-(log_p * advantages).mean(Kind::Float))
    }
}

impl TrainablePolicy for MlpPolicyPG {
    fn policy(&self) -> &MlpPolicy {
        &self.policy
    }

    fn update(
        &mut self,
        observations: ArrayView2<f32>,
        actions: ActionBatch<'_>,
        advantages: ArrayView1<f32>,
    ) -> Result<PolicyMetrics> {
        let batch = observations.nrows();
        let loss = self.actor_loss(observations, actions, advantages)?;

        let optimizer = self.policy.optimizer_mut();
        optimizer.zero_grad();
        loss.backward();
        optimizer.step();

        let value = loss.detach().double_value(&[]);
        if value.is_finite() {
            tracing::debug!(loss = value, batch, "Actor update");
        } else {
            tracing::warn!(loss = value, batch, "Actor loss is not finite");
        }

        let mut metrics = PolicyMetrics::new();
        metrics.insert(ACTOR_LOSS.to_string(), value);
        Ok(metrics)
    }
}
