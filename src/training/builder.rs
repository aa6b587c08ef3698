use rand::{SeedableRng, rngs::StdRng};

use super::Trainer;
use crate::{
    Result,
    arch::{EnergyModel, ParameterLayout, SpikeSlab},
    config::{InitSpec, OptimizerSpec, TrainerSpec},
    initialization::{self, ChainedParamGen, ConstParamGen, ParamGen, RandParamGen},
    optimization::{GradientDescent, GradientDescentWithMomentum, Optimizer},
};

/// The trainer produced by `TrainerBuilder`.
pub type SpikeSlabTrainer = Trainer<SpikeSlab, Box<dyn Optimizer + Send>, StdRng>;

/// Builds `Trainer`s given a specification.
#[derive(Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `Trainer` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification for the trainer.
    ///
    /// # Returns
    /// The trainer, or an error if the model can't be built or initialized.
    pub fn build(&self, spec: &TrainerSpec) -> Result<SpikeSlabTrainer> {
        let mut rng = self.generate_rng(spec.seed);

        let model = self.resolve_model(spec, StdRng::from_rng(&mut rng))?;
        let optimizer = self.resolve_optimizer(spec.optimizer, model.layout().len());

        Ok(Trainer::new(
            model,
            optimizer,
            spec.epochs.get(),
            spec.model.batch_size,
            spec.gibbs_steps,
            spec.persistent,
            rng,
        ))
    }

    fn resolve_model(&self, spec: &TrainerSpec, rng: StdRng) -> Result<SpikeSlab> {
        spec.model.validate()?;

        let (d, n, k) = (
            spec.model.visible_size.get(),
            spec.model.hidden_size.get(),
            spec.model.pool_size.get(),
        );
        let layout = ParameterLayout::new(d, n, k);

        let weights = layout.weights.len();
        let mut param_gen: Box<dyn ParamGen> = match spec.init {
            InitSpec::Normal { std_dev } => Box::new(initialization::spike_slab_default(
                rng, &layout, std_dev,
            )?),
            InitSpec::XavierUniform => {
                let weight_gen = RandParamGen::xavier_uniform(rng, weights, d, k)?;
                Box::new(self.chain_biases(weight_gen, n))
            }
            InitSpec::LecunNormal => {
                let weight_gen = RandParamGen::lecun(rng, weights, d)?;
                Box::new(self.chain_biases(weight_gen, n))
            }
        };

        SpikeSlab::new(spec.model.clone(), &mut *param_gen)
    }

    /// Follows `weight_gen` with zeroed spike biases and a unit visible precision.
    fn chain_biases<G>(&self, weight_gen: G, hidden_size: usize) -> ChainedParamGen<'static>
    where
        G: ParamGen + 'static,
    {
        let gens: Vec<Box<dyn ParamGen>> = vec![
            Box::new(weight_gen),
            Box::new(ConstParamGen::new(0., hidden_size)),
            Box::new(ConstParamGen::new(1., 1)),
        ];

        ChainedParamGen::new(gens)
    }

    fn resolve_optimizer(&self, spec: OptimizerSpec, len: usize) -> Box<dyn Optimizer + Send> {
        match spec {
            OptimizerSpec::GradientDescent { learning_rate } => {
                Box::new(GradientDescent::new(learning_rate))
            }
            OptimizerSpec::GradientDescentWithMomentum {
                learning_rate,
                momentum,
            } => Box::new(GradientDescentWithMomentum::new(len, learning_rate, momentum)),
        }
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(init: &str, optimizer: &str) -> TrainerSpec {
        let json = format!(
            r#"{{
                "model": {{
                    "visible_size": 3,
                    "hidden_size": 2,
                    "pool_size": 2,
                    "slab_precision": 1.0,
                    "radius": 50.0,
                    "batch_size": 2
                }},
                "optimizer": {optimizer},
                "init": {init},
                "epochs": 1,
                "seed": 42
            }}"#
        );

        TrainerSpec::from_json(&json).unwrap()
    }

    #[test]
    fn builds_the_default_initialization() {
        let spec = spec(
            r#"{ "normal": { "std_dev": 0.1 } }"#,
            r#"{ "gradient_descent": { "learning_rate": 0.1 } }"#,
        );
        let trainer = TrainerBuilder::new().build(&spec).unwrap();
        let model = trainer.model();

        let view = model.view().unwrap();
        assert_eq!(model.params().len(), 3 * 2 * 2 + 2 + 1);
        assert!(view.spike_bias().iter().all(|&b| b == 0.));
        assert_eq!(view.visible_precision(), 1.);
    }

    #[test]
    fn builds_xavier_uniform_with_momentum() {
        let spec = spec(
            r#""xavier_uniform""#,
            r#"{ "gradient_descent_with_momentum": { "learning_rate": 0.1, "momentum": 0.9 } }"#,
        );
        let trainer = TrainerBuilder::new().build(&spec).unwrap();

        let limit = (6f32 / 5.).sqrt();
        let view = trainer.model().view().unwrap();
        assert!(view.weights().iter().all(|w| w.abs() <= limit));
        assert_eq!(view.visible_precision(), 1.);
    }

    #[test]
    fn builds_lecun_normal() {
        let spec = spec(
            r#""lecun_normal""#,
            r#"{ "gradient_descent": { "learning_rate": 0.1 } }"#,
        );
        let trainer = TrainerBuilder::new().build(&spec).unwrap();

        let view = trainer.model().view().unwrap();
        assert!(view.weights().iter().any(|&w| w != 0.));
        assert!(view.spike_bias().iter().all(|&b| b == 0.));
        assert_eq!(view.visible_precision(), 1.);
    }

    #[test]
    fn same_seed_builds_the_same_model() {
        let spec = spec(
            r#"{ "normal": { "std_dev": 0.1 } }"#,
            r#"{ "gradient_descent": { "learning_rate": 0.1 } }"#,
        );

        let a = TrainerBuilder::new().build(&spec).unwrap();
        let b = TrainerBuilder::new().build(&spec).unwrap();
        assert_eq!(a.model().params(), b.model().params());
    }

    #[test]
    fn rejects_an_invalid_std_dev() {
        let spec = spec(
            r#"{ "normal": { "std_dev": -1.0 } }"#,
            r#"{ "gradient_descent": { "learning_rate": 0.1 } }"#,
        );

        assert!(matches!(
            TrainerBuilder::new().build(&spec),
            Err(crate::RbmErr::InvalidDistribution(_))
        ));
    }
}
