use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{RbmErr, Result};

/// The hyperparameters of a spike and slab RBM, fixed for the lifetime of the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeSlabSpec {
    /// The amount of visible units, `D`.
    pub visible_size: NonZeroUsize,
    /// The amount of hidden (spike) units, `N`.
    pub hidden_size: NonZeroUsize,
    /// The amount of slab units per hidden unit, `K`.
    pub pool_size: NonZeroUsize,
    /// The precision `λ_s` of the slab units. Not a learned parameter.
    pub slab_precision: f32,
    /// The norm bound a visible sample must stay under.
    pub radius: f32,
    /// The amount of persistent negative chains, also the largest accepted batch.
    pub batch_size: NonZeroUsize,
}

impl SpikeSlabSpec {
    /// Checks the real valued hyperparameters.
    ///
    /// # Returns
    /// An error if `slab_precision` or `radius` aren't finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("slab_precision", self.slab_precision),
            ("radius", self.radius),
        ] {
            if !value.is_finite() || value <= 0. {
                return Err(RbmErr::InvalidHyperparameter { name, value });
            }
        }

        Ok(())
    }
}

/// The specification for the `Optimizer` trait.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    GradientDescent { learning_rate: f32 },
    GradientDescentWithMomentum { learning_rate: f32, momentum: f32 },
}

/// The specification for the weights' initialization rule.
///
/// The spike biases always start at zero and the visible precision at one. The fan in of
/// every weight block is the visible size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitSpec {
    Normal { std_dev: f32 },
    XavierUniform,
    LecunNormal,
}

impl Default for InitSpec {
    fn default() -> Self {
        Self::Normal { std_dev: 0.01 }
    }
}

fn default_gibbs_steps() -> usize {
    1
}

/// The specification for the `Trainer` struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerSpec {
    pub model: SpikeSlabSpec,
    pub optimizer: OptimizerSpec,
    #[serde(default)]
    pub init: InitSpec,
    pub epochs: NonZeroUsize,
    #[serde(default = "default_gibbs_steps")]
    pub gibbs_steps: usize,
    #[serde(default)]
    pub persistent: bool,
    pub seed: Option<u64>,
}

impl TrainerSpec {
    /// Parses a `TrainerSpec` from a JSON document and validates the model's hyperparameters.
    ///
    /// # Arguments
    /// * `json` - The JSON document.
    ///
    /// # Returns
    /// The parsed spec or an error if the document is malformed or holds invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: Self = serde_json::from_str(json)?;
        spec.model.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRAINER: &str = r#"{
        "model": {
            "visible_size": 4,
            "hidden_size": 2,
            "pool_size": 2,
            "slab_precision": 1.0,
            "radius": 10.0,
            "batch_size": 8
        },
        "optimizer": { "gradient_descent": { "learning_rate": 0.01 } },
        "epochs": 3,
        "seed": 7
    }"#;

    #[test]
    fn parses_with_defaults() {
        let spec = TrainerSpec::from_json(TRAINER).unwrap();

        assert_eq!(spec.model.visible_size.get(), 4);
        assert_eq!(spec.gibbs_steps, 1);
        assert!(!spec.persistent);
        assert!(matches!(spec.init, InitSpec::Normal { .. }));
        assert!(matches!(
            spec.optimizer,
            OptimizerSpec::GradientDescent { learning_rate } if learning_rate == 0.01
        ));
    }

    #[test]
    fn rejects_non_positive_slab_precision() {
        let json = TRAINER.replace("\"slab_precision\": 1.0", "\"slab_precision\": 0.0");

        let err = TrainerSpec::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            RbmErr::InvalidHyperparameter {
                name: "slab_precision",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_sizes() {
        let json = TRAINER.replace("\"hidden_size\": 2", "\"hidden_size\": 0");
        assert!(matches!(
            TrainerSpec::from_json(&json),
            Err(RbmErr::Config(_))
        ));
    }
}
