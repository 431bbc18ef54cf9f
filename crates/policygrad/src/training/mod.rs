//! Optimization primitives for policy training.
//!
//! Provides:
//! - `PolicyOptimizer` - backend-agnostic zero-grad / step interface
//! - `TorchOptimizer` - wrapper over `tch::nn::Optimizer` for a policy's `VarStore`

mod optimizer;

pub use optimizer::{PolicyOptimizer, TorchOptimizer};
