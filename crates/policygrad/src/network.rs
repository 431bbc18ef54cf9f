//! Feed-forward network builder.

use serde::{Deserialize, Serialize};
use tch::nn;

/// Configuration for an MLP approximator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Number of hidden layers
    pub n_layers: usize,
    /// Hidden layer size
    pub layer_size: i64,
    /// Activation after each hidden layer
    pub activation: Activation,
    /// Activation applied to the output layer
    pub output_activation: Activation,
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[serde(rename = "relu")]
    ReLU,
    Tanh,
    #[serde(rename = "leaky_relu")]
    LeakyReLU,
    Sigmoid,
    Selu,
    Softplus,
    Gelu,
    Identity,
}

impl Activation {
    fn append(self, seq: nn::Sequential) -> nn::Sequential {
        match self {
            Activation::ReLU => seq.add_fn(|x| x.relu()),
            Activation::Tanh => seq.add_fn(|x| x.tanh()),
            Activation::LeakyReLU => seq.add_fn(|x| x.leaky_relu()),
            Activation::Sigmoid => seq.add_fn(|x| x.sigmoid()),
            Activation::Selu => seq.add_fn(|x| x.selu()),
            Activation::Softplus => seq.add_fn(|x| x.softplus()),
            Activation::Gelu => seq.add_fn(|x| x.gelu("none")),
            Activation::Identity => seq,
        }
    }
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            n_layers: 2,
            layer_size: 64,
            activation: Activation::Tanh,
            output_activation: Activation::Identity,
        }
    }
}

/// Build an MLP under `path`.
///
/// Hidden layers are registered as `layer_{i}` and the output projection as
/// `out`, so every parameter ends up in the `VarStore` that owns `path`.
/// With `n_layers == 0` the network is a single linear map.
pub fn build_mlp(
    path: &nn::Path,
    input_size: i64,
    output_size: i64,
    config: &MlpConfig,
) -> nn::Sequential {
    let mut seq = nn::seq();
    let mut in_size = input_size;

    for i in 0..config.n_layers {
        let layer = nn::linear(
            path / format!("layer_{}", i),
            in_size,
            config.layer_size,
            Default::default(),
        );
        seq = config.activation.append(seq.add(layer));
        in_size = config.layer_size;
    }

    let out = nn::linear(path / "out", in_size, output_size, Default::default());
    config.output_activation.append(seq.add(out))
}
