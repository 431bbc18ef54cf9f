//! Abstract optimizer interface and its torch implementation.

use crate::config::OptimizerKind;
use crate::Result;
use tch::{nn, nn::OptimizerConfig, Tensor};

/// Trait for back-end agnostic optimizers.
pub trait PolicyOptimizer: Send {
    /// Zero out gradients.
    fn zero_grad(&mut self);

    /// Perform an optimization step.
    fn step(&mut self);

    /// Get the variables managed by this optimizer.
    fn variables(&self) -> &[Tensor];

    /// Step size applied on every `step`.
    fn learning_rate(&self) -> f64;
}

/// Wrapper for Torch's nn::Optimizer.
///
/// Built over a whole `VarStore`, so every trainable tensor registered in it
/// (network weights and any free-standing vectors) shares one optimizer state.
pub struct TorchOptimizer {
    inner: nn::Optimizer,
    variables: Vec<Tensor>,
    learning_rate: f64,
}

impl TorchOptimizer {
    pub fn new(vs: &nn::VarStore, kind: OptimizerKind, learning_rate: f64) -> Result<Self> {
        let inner = match kind {
            OptimizerKind::Adam => nn::Adam::default().build(vs, learning_rate)?,
            OptimizerKind::Sgd => nn::Sgd::default().build(vs, learning_rate)?,
        };
        Ok(Self {
            inner,
            variables: vs.trainable_variables(),
            learning_rate,
        })
    }
}

impl PolicyOptimizer for TorchOptimizer {
    fn zero_grad(&mut self) {
        self.inner.zero_grad();
    }

    fn step(&mut self) {
        self.inner.step();
    }

    fn variables(&self) -> &[Tensor] {
        &self.variables
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}
