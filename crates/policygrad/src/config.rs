//! Policy configuration.

use crate::network::{Activation, MlpConfig};
use crate::{PolicyError, Result};
use serde::{Deserialize, Serialize};
use tch::Device;

/// Optimizer used for the joint parameter set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    #[default]
    Adam,
    Sgd,
}

/// Configuration for an MLP policy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyConfig {
    // Dimensions
    /// Number of discrete actions, or length of a continuous action vector
    pub action_dim: i64,
    /// Length of an observation vector
    pub obs_dim: i64,
    /// Categorical (true) or diagonal Gaussian (false) action distribution
    pub discrete: bool,

    // Approximator
    /// Number of hidden layers
    pub n_layers: usize,
    /// Hidden layer size
    pub layer_size: i64,
    /// Hidden activation
    pub activation: Activation,
    /// Output activation
    pub output_activation: Activation,

    // Optimization
    /// Learning rate
    pub learning_rate: f64,
    /// Optimizer algorithm
    pub optimizer: OptimizerKind,

    // Device
    /// Device to place parameters on ("cpu" or "cuda")
    #[serde(skip, default = "default_device")]
    pub device: Device,
}

fn default_device() -> Device {
    Device::Cpu
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let mlp = MlpConfig::default();
        Self {
            action_dim: 1,
            obs_dim: 1,
            discrete: true,

            n_layers: mlp.n_layers,
            layer_size: mlp.layer_size,
            activation: mlp.activation,
            output_activation: mlp.output_activation,

            learning_rate: 5e-3,
            optimizer: OptimizerKind::Adam,

            device: Device::Cpu,
        }
    }
}

impl PolicyConfig {
    /// Create a config with the given dimensions and default capacity
    pub fn new(action_dim: i64, obs_dim: i64, discrete: bool) -> Self {
        Self {
            action_dim,
            obs_dim,
            discrete,
            ..Default::default()
        }
    }

    /// Set approximator depth and width
    pub fn with_layers(mut self, n_layers: usize, layer_size: i64) -> Self {
        self.n_layers = n_layers;
        self.layer_size = layer_size;
        self
    }

    /// Set learning rate
    pub fn with_lr(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Set hidden activation
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Set optimizer algorithm
    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Set device
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Approximator settings
    pub fn mlp(&self) -> MlpConfig {
        MlpConfig {
            n_layers: self.n_layers,
            layer_size: self.layer_size,
            activation: self.activation,
            output_activation: self.output_activation,
        }
    }

    /// Reject dimensions and rates the policy cannot be built with
    pub fn validate(&self) -> Result<()> {
        if self.action_dim <= 0 {
            return Err(PolicyError::InvalidArgument(format!(
                "action_dim must be positive, got {}",
                self.action_dim
            )));
        }
        if self.obs_dim <= 0 {
            return Err(PolicyError::InvalidArgument(format!(
                "obs_dim must be positive, got {}",
                self.obs_dim
            )));
        }
        if self.n_layers > 0 && self.layer_size <= 0 {
            return Err(PolicyError::InvalidArgument(format!(
                "layer_size must be positive, got {}",
                self.layer_size
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(PolicyError::InvalidArgument(format!(
                "learning_rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
