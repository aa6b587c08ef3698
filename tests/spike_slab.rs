use std::num::NonZeroUsize;

use ndarray::{array, prelude::*};
use ndarray_rand::{RandomExt, rand_distr::StandardNormal};
use rand::{Rng, SeedableRng, rngs::StdRng};

use spike_slab_rbm::{
    RbmErr,
    arch::{EnergyModel, Hidden, SpikeSlab, spike_slab::MAX_VISIBLE_TRIALS},
    config::{SpikeSlabSpec, TrainerSpec},
    initialization::{ChainedParamGen, ConstParamGen, ParamGen},
    training::TrainerBuilder,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn spec(d: usize, n: usize, k: usize, radius: f32) -> SpikeSlabSpec {
    SpikeSlabSpec {
        visible_size: NonZeroUsize::new(d).unwrap(),
        hidden_size: NonZeroUsize::new(n).unwrap(),
        pool_size: NonZeroUsize::new(k).unwrap(),
        slab_precision: 1.,
        radius,
        batch_size: NonZeroUsize::new(4).unwrap(),
    }
}

fn constant(spec: SpikeSlabSpec, weight: f32) -> SpikeSlab {
    let (d, n, k) = (
        spec.visible_size.get(),
        spec.hidden_size.get(),
        spec.pool_size.get(),
    );
    let gens: Vec<Box<dyn ParamGen>> = vec![
        Box::new(ConstParamGen::new(weight, d * n * k)),
        Box::new(ConstParamGen::new(0., n)),
        Box::new(ConstParamGen::new(1., 1)),
    ];

    SpikeSlab::new(spec, &mut ChainedParamGen::new(gens)).unwrap()
}

#[test]
fn zero_model_is_indifferent_to_its_input() {
    init_logger();
    let model = constant(spec(4, 2, 2, 10.), 0.);
    let mut rng = StdRng::seed_from_u64(0);

    let v = array![1., 2., 3., 4.];
    let hidden = model.hidden_mean(v.view(), &mut rng).unwrap();

    assert_eq!(hidden.spike, array![0.5, 0.5]);
    assert!(hidden.slab.iter().all(|&s| s == 0.));
}

#[test]
fn active_units_explain_the_visible_mean() {
    init_logger();
    let model = constant(spec(3, 2, 1, 10.), 1.);

    let hidden = Hidden {
        spike: array![1., 0.],
        slab: array![[2., 5.]],
    };

    // only unit 0 contributes, W₀ · 2 with every weight at 1
    let mean = model.visible_mean(&hidden).unwrap();
    assert_eq!(mean, array![2., 2., 2.]);
}

#[test]
fn sampling_outside_the_radius_is_reported() {
    init_logger();
    let mut model = constant(spec(3, 2, 2, 1e-6), 0.);
    let mut rng = StdRng::seed_from_u64(1);
    let mut replay = rng.clone();

    let hidden = Hidden::zeros(2, 2);
    let mut out = Array1::zeros(3);
    let err = model
        .sample_visible(&hidden, out.view_mut(), &mut rng)
        .unwrap_err();

    assert!(matches!(
        err,
        RbmErr::SamplingFailed { trials, .. } if trials == MAX_VISIBLE_TRIALS
    ));

    // The zero model has a zero mean and unit variance, so the output is the last raw draw.
    let last = (0..MAX_VISIBLE_TRIALS)
        .map(|_| Array1::<f32>::random_using(3, StandardNormal, &mut replay))
        .last()
        .unwrap();
    assert_eq!(out, last);
    assert_eq!(rng.random::<u64>(), replay.random::<u64>());
}

#[test]
fn gibbs_chain_stays_within_the_radius() {
    init_logger();
    let mut model = constant(spec(3, 2, 2, 20.), 0.05);
    let mut rng = StdRng::seed_from_u64(2);

    let mut out = Array1::zeros(3);
    model
        .gibbs(array![0.1, 0.2, 0.3].view(), 5, out.view_mut(), &mut rng)
        .unwrap();

    assert!(out.dot(&out).sqrt() < 20.);
}

#[test]
fn trains_from_a_json_spec() {
    init_logger();
    let json = r#"{
        "model": {
            "visible_size": 4,
            "hidden_size": 3,
            "pool_size": 2,
            "slab_precision": 2.0,
            "radius": 100.0,
            "batch_size": 4
        },
        "optimizer": {
            "gradient_descent_with_momentum": { "learning_rate": 0.001, "momentum": 0.5 }
        },
        "epochs": 3,
        "gibbs_steps": 2,
        "persistent": true,
        "seed": 11
    }"#;

    let spec = TrainerSpec::from_json(json).unwrap();
    let mut trainer = TrainerBuilder::new().build(&spec).unwrap();

    let data = Array2::from_shape_fn((10, 4), |(i, j)| ((i * 4 + j) as f32 * 0.37).sin());
    let history = trainer.train(data.view()).unwrap();

    assert_eq!(history.len(), 3);
    for stats in &history {
        assert_eq!(stats.batches() + stats.skipped(), 3);
        assert!(stats.free_energy().is_finite());
    }

    let model = trainer.into_model();
    assert_eq!(model.negative_samples().dim(), (4, 4));
    assert!(model.params().iter().all(|p| p.is_finite()));
}
