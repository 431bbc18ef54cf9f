//! Stochastic MLP policies.
//!
//! Provides:
//! - `MlpPolicy` - shared forward pass and action sampling for both action-space kinds
//! - `MlpPolicyPG` - policy-gradient variant implementing `TrainablePolicy::update`
//! - `Distribution` - categorical / diagonal Gaussian action distributions

mod distribution;
mod mlp;
mod pg;

pub use distribution::Distribution;
pub use mlp::MlpPolicy;
pub use pg::MlpPolicyPG;

use crate::Result;
use ndarray::{Array1, ArrayView1, ArrayView2};
use std::collections::HashMap;
use tch::Tensor;

/// Metric key reported by every actor update
pub const ACTOR_LOSS: &str = "Actor Loss";

/// Scalar training metrics keyed by name
pub type PolicyMetrics = HashMap<String, f64>;

/// A single action returned by `get_action`
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Index in `[0, action_dim)`
    Discrete(i64),
    /// Vector of length `action_dim`
    Continuous(Array1<f32>),
}

impl Action {
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Action::Discrete(i) => Some(*i),
            Action::Continuous(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<&Array1<f32>> {
        match self {
            Action::Discrete(_) => None,
            Action::Continuous(v) => Some(v),
        }
    }
}

/// A batch of taken actions passed to `update`
#[derive(Clone, Debug)]
pub enum ActionBatch<'a> {
    /// `[batch]` action indices
    Discrete(ArrayView1<'a, i64>),
    /// `[batch, action_dim]` action vectors
    Continuous(ArrayView2<'a, f32>),
}

impl ActionBatch<'_> {
    pub fn len(&self) -> usize {
        match self {
            ActionBatch::Discrete(a) => a.len(),
            ActionBatch::Continuous(a) => a.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait for policies that can be trained.
///
/// Variants share the forward pass and sampling of `MlpPolicy` and differ
/// only in their update rule.
pub trait TrainablePolicy: Send {
    /// The shared policy this variant trains
    fn policy(&self) -> &MlpPolicy;

    /// Perform one gradient step on a batch and report its metrics.
    ///
    /// `observations`, `actions` and `advantages` must agree on the batch size.
    fn update(
        &mut self,
        observations: ArrayView2<f32>,
        actions: ActionBatch<'_>,
        advantages: ArrayView1<f32>,
    ) -> Result<PolicyMetrics>;

    /// Differentiable forward pass; panics on a width other than `obs_dim`
    fn forward(&self, observations: &Tensor) -> Distribution {
        self.policy().forward(observations)
    }

    /// Sample one action for one observation without tracking gradients
    fn get_action(&self, observation: ArrayView1<f32>) -> Result<Action> {
        self.policy().get_action(observation)
    }
}
