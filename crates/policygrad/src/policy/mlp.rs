//! Multi-layer perceptron policy.

use super::{Action, Distribution};
use crate::config::PolicyConfig;
use crate::network::build_mlp;
use crate::training::{PolicyOptimizer, TorchOptimizer};
use crate::utils::{from_array1, from_array2, to_array1};
use crate::{PolicyError, Result};
use ndarray::{ArrayView1, ArrayView2};
use tch::{nn, nn::Module, Device, Kind, Tensor};

/// Output head, fixed by the action-space kind at construction
enum PolicyHead {
    /// Scores per action, read as unnormalized log-probabilities
    Discrete { logits_net: nn::Sequential },
    /// Mean per action dimension plus a free log standard deviation
    Continuous {
        mean_net: nn::Sequential,
        log_std: Tensor,
    },
}

/// Multi-layer perceptron policy
///
/// Owns every trainable tensor in one `VarStore` and one optimizer built over
/// it. This type only evaluates the policy; training goes through a
/// `TrainablePolicy` variant such as `MlpPolicyPG`.
pub struct MlpPolicy {
    /// Variable store for parameters
    vs: nn::VarStore,
    /// Approximator and, for continuous actions, the log std
    head: PolicyHead,
    /// Joint optimizer over all of `vs`
    optimizer: TorchOptimizer,
    /// Number of actions or action dimensions
    action_dim: i64,
    /// Observation size
    obs_dim: i64,
    /// Device
    device: Device,
}

impl MlpPolicy {
    /// Create a new MLP policy
    pub fn new(config: PolicyConfig) -> Result<Self> {
        config.validate()?;

        let vs = nn::VarStore::new(config.device);
        let mlp = config.mlp();
        let head = {
            let root = vs.root();
            if config.discrete {
                PolicyHead::Discrete {
                    logits_net: build_mlp(
                        &(&root / "logits_net"),
                        config.obs_dim,
                        config.action_dim,
                        &mlp,
                    ),
                }
            } else {
                let mean_net = build_mlp(
                    &(&root / "mean_net"),
                    config.obs_dim,
                    config.action_dim,
                    &mlp,
                );
                let log_std = root.var("log_std", &[config.action_dim], nn::Init::Const(0.0));
                PolicyHead::Continuous { mean_net, log_std }
            }
        };

        let optimizer = TorchOptimizer::new(&vs, config.optimizer, config.learning_rate)?;

        let policy = Self {
            vs,
            head,
            optimizer,
            action_dim: config.action_dim,
            obs_dim: config.obs_dim,
            device: config.device,
        };

        tracing::info!(
            discrete = config.discrete,
            obs_dim = config.obs_dim,
            action_dim = config.action_dim,
            params = policy.num_parameters(),
            optimizer = ?config.optimizer,
            "Created MLP policy"
        );

        Ok(policy)
    }

    /// Build the action distribution for a batch of observations.
    ///
    /// Accepts `[batch, obs_dim]` or a single `[obs_dim]` observation.
    /// Gradients flow to every parameter.
    ///
    /// # Panics
    ///
    /// Panics if the last dimension of `observations` is not `obs_dim`. The
    /// array entry points `get_action` and `update` check widths and return
    /// `ShapeMismatch` instead.
    pub fn forward(&self, observations: &Tensor) -> Distribution {
        let obs = observations.to_device(self.device).to_kind(Kind::Float);
        match &self.head {
            PolicyHead::Discrete { logits_net } => Distribution::Categorical {
                logits: logits_net.forward(&obs),
            },
            PolicyHead::Continuous { mean_net, log_std } => {
                let mean = mean_net.forward(&obs);
                let std = log_std.exp().expand_as(&mean);
                Distribution::Gaussian { mean, std }
            }
        }
    }

    /// Same as `forward` with gradient tracking disabled
    pub fn evaluate(&self, observations: &Tensor) -> Distribution {
        tch::no_grad(|| self.forward(observations))
    }

    /// Sample a single action for a single observation.
    ///
    /// Discrete policies draw a plain sample, continuous ones a
    /// reparameterized one. No gradients are recorded either way.
    pub fn get_action(&self, observation: ArrayView1<f32>) -> Result<Action> {
        if observation.len() as i64 != self.obs_dim {
            return Err(PolicyError::ShapeMismatch {
                expected: vec![self.obs_dim as usize],
                actual: vec![observation.len()],
            });
        }

        let obs = from_array1(observation, self.device);
        let dist = self.evaluate(&obs);
        match &dist {
            Distribution::Categorical { .. } => {
                Ok(Action::Discrete(dist.sample()?.int64_value(&[])))
            }
            Distribution::Gaussian { .. } => {
                let action = tch::no_grad(|| dist.rsample())?;
                Ok(Action::Continuous(to_array1(&action)?))
            }
        }
    }

    /// Convert a `[batch, obs_dim]` observation matrix to a tensor
    pub fn observations_to_tensor(&self, observations: ArrayView2<f32>) -> Result<Tensor> {
        if observations.ncols() as i64 != self.obs_dim {
            return Err(PolicyError::ShapeMismatch {
                expected: vec![observations.nrows(), self.obs_dim as usize],
                actual: observations.shape().to_vec(),
            });
        }
        Ok(from_array2(observations, self.device))
    }

    pub fn action_dim(&self) -> i64 {
        self.action_dim
    }

    pub fn obs_dim(&self) -> i64 {
        self.obs_dim
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self.head, PolicyHead::Discrete { .. })
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Trainable log standard deviation, continuous policies only
    pub fn log_std(&self) -> Option<&Tensor> {
        match &self.head {
            PolicyHead::Discrete { .. } => None,
            PolicyHead::Continuous { log_std, .. } => Some(log_std),
        }
    }

    /// Get the variable store
    pub fn var_store(&self) -> &nn::VarStore {
        &self.vs
    }

    /// Get mutable variable store
    pub fn var_store_mut(&mut self) -> &mut nn::VarStore {
        &mut self.vs
    }

    pub fn optimizer(&self) -> &dyn PolicyOptimizer {
        &self.optimizer
    }

    pub(crate) fn optimizer_mut(&mut self) -> &mut dyn PolicyOptimizer {
        &mut self.optimizer
    }

    /// Get the number of parameters
    pub fn num_parameters(&self) -> i64 {
        self.vs.variables().values().map(|v| v.numel() as i64).sum()
    }
}
