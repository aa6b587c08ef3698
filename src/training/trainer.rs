use std::num::NonZeroUsize;

use log::{info, warn};
use ndarray::prelude::*;
use rand::{Rng, seq::SliceRandom};

use super::EpochStats;
use crate::{RbmErr, Result, arch::EnergyModel, optimization::Optimizer};

/// A contrastive divergence `Trainer`. Contains the relevant components needed for fitting an
/// energy model, including the model itself.
pub struct Trainer<M, O, R>
where
    M: EnergyModel,
    O: Optimizer,
    R: Rng,
{
    model: M,
    optimizer: O,
    grad: Vec<f32>,

    epochs: usize,
    batch_size: NonZeroUsize,
    gibbs_steps: usize,
    persistent: bool,
    rng: R,
}

impl<M, O, R> Trainer<M, O, R>
where
    M: EnergyModel,
    O: Optimizer,
    R: Rng,
{
    /// Returns a new `Trainer`.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained.
    /// * `optimizer` - The optimizer applying each batch gradient onto the model's parameters.
    /// * `epochs` - The amount of passes over the data per `train` call.
    /// * `batch_size` - The amount of rows per gradient computation.
    /// * `gibbs_steps` - The length of the negative chains.
    /// * `persistent` - Whether the negative chains persist across batches.
    /// * `rng` - A random number generator.
    pub fn new(
        model: M,
        optimizer: O,
        epochs: usize,
        batch_size: NonZeroUsize,
        gibbs_steps: usize,
        persistent: bool,
        rng: R,
    ) -> Self {
        Self {
            grad: vec![0.; model.layout().len()],
            model,
            optimizer,
            epochs,
            batch_size,
            gibbs_steps,
            persistent,
            rng,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }
}

impl<M, O, R> Trainer<M, O, R>
where
    M: EnergyModel + Sync,
    O: Optimizer,
    R: Rng,
{
    /// Performs `epochs` epochs of training over `data`, one sample per row.
    ///
    /// Batches whose negative chain can't produce a contained visible sample are skipped.
    ///
    /// # Returns
    /// The statistics of every epoch, or the first non recoverable error.
    pub fn train(&mut self, data: ArrayView2<f32>) -> Result<Vec<EpochStats>> {
        let mut indices: Vec<usize> = (0..data.nrows()).collect();
        let mut history = Vec::with_capacity(self.epochs);

        for epoch in 0..self.epochs {
            indices.shuffle(&mut self.rng);

            let mut batches = 0;
            let mut skipped = 0;

            for chunk in indices.chunks(self.batch_size.get()) {
                let batch = data.select(Axis(0), chunk);
                let res = self.model.gradient(
                    batch.view(),
                    self.gibbs_steps,
                    self.persistent,
                    &mut self.rng,
                    &mut self.grad,
                );

                match res {
                    Ok(()) => {}
                    Err(RbmErr::SamplingFailed { trials, norm }) => {
                        warn!(epoch = epoch, trials = trials, norm = norm; "skipping batch");
                        skipped += 1;
                        continue;
                    }
                    Err(e) => return Err(e),
                }

                self.optimizer
                    .update_params(&self.grad, self.model.params_mut())?;
                batches += 1;
            }

            let free_energy = self
                .model
                .free_energy_batch(data)?
                .mean()
                .unwrap_or_default();

            info!(
                epoch = epoch,
                batches = batches,
                skipped = skipped,
                free_energy = free_energy;
                "epoch finished"
            );

            history.push(EpochStats::new(batches, skipped, free_energy));
        }

        Ok(history)
    }
}
