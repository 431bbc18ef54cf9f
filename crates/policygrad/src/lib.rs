//! # policygrad
//!
//! Stochastic MLP policies for reinforcement learning, trainable with a
//! vanilla policy-gradient actor update.
//!
//! ## Overview
//!
//! policygrad provides:
//! - `MlpPolicy` - an MLP mapping observations to a categorical (discrete) or
//!   diagonal Gaussian (continuous) action distribution
//! - `MlpPolicyPG` - the policy-gradient variant implementing `TrainablePolicy::update`
//! - `build_mlp` - the feed-forward network builder used by the policy
//! - Tensor/array conversion helpers and device selection
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ndarray::{array, Array2};
//! use policygrad::prelude::*;
//!
//! let config = PolicyConfig::new(2, 4, true).with_layers(2, 64).with_lr(5e-3);
//! let mut policy = MlpPolicyPG::new(config)?;
//!
//! let action = policy.get_action(array![0.1f32, -0.2, 0.0, 0.3].view())?;
//!
//! let obs = Array2::<f32>::zeros((3, 4));
//! let actions = array![0i64, 1, 1];
//! let advantages = array![1.0f32, -0.5, 0.2];
//! let metrics = policy.update(obs.view(), ActionBatch::Discrete(actions.view()), advantages.view())?;
//! println!("{}", metrics[ACTOR_LOSS]);
//! ```

pub mod config;
pub mod network;
pub mod policy;
pub mod training;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{OptimizerKind, PolicyConfig};
    pub use crate::network::{build_mlp, Activation, MlpConfig};
    pub use crate::policy::{
        Action, ActionBatch, Distribution, MlpPolicy, MlpPolicyPG, PolicyMetrics,
        TrainablePolicy, ACTOR_LOSS,
    };
    pub use crate::training::{PolicyOptimizer, TorchOptimizer};
    pub use crate::{PolicyError, Result};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    #[error("Tensor error: {0}")]
    TensorError(#[from] tch::TchError),
}

pub type Result<T> = core::result::Result<T, PolicyError>;
