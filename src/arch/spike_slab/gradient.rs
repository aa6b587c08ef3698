use ndarray::prelude::*;
use rand::Rng;

use super::SpikeSlab;
use crate::{RbmErr, Result, arch::EnergyModel};

fn accumulate(acc: &mut [f32], grad: &[f32]) {
    for (a, g) in acc.iter_mut().zip(grad) {
        *a += *g;
    }
}

impl SpikeSlab {
    /// Computes the contrastive divergence gradient of `batch` into `out`.
    ///
    /// For every row the positive phase is computed on the data and the negative phase on the
    /// end of a `gibbs_steps` long chain. Chains start at the data row unless `persistent` is
    /// set, in which case they continue from the previous call's negative samples. The result
    /// is `(negative - positive) / batch_len`, a descent direction for the optimizer.
    pub(super) fn contrastive_divergence<R: Rng + ?Sized>(
        &mut self,
        batch: ArrayView2<f32>,
        gibbs_steps: usize,
        persistent: bool,
        rng: &mut R,
        out: &mut [f32],
    ) -> Result<()> {
        let len = self.layout.len();
        let chains = self.negative_samples.nrows();

        if out.len() != len {
            return Err(RbmErr::SizeMismatch {
                what: "gradient",
                got: out.len(),
                expected: len,
            });
        }

        if batch.ncols() != self.layout.visible_size {
            return Err(RbmErr::SizeMismatch {
                what: "batch columns",
                got: batch.ncols(),
                expected: self.layout.visible_size,
            });
        }

        if batch.nrows() == 0 || batch.nrows() > chains {
            return Err(RbmErr::SizeMismatch {
                what: "batch rows",
                got: batch.nrows(),
                expected: chains,
            });
        }

        if persistent && !self.chains_seeded {
            for (b, mut chain) in self.negative_samples.rows_mut().into_iter().enumerate() {
                chain.assign(&batch.row(b % batch.nrows()));
            }

            self.chains_seeded = true;
        }

        self.positive_grad.fill(0.);
        self.negative_grad.fill(0.);

        let mut temp = std::mem::take(&mut self.temp_negative_grad);
        let res = self.accumulate_phases(batch, gibbs_steps, persistent, &mut temp, rng);
        self.temp_negative_grad = temp;
        res?;

        let scale = (batch.nrows() as f32).recip();
        for ((o, n), p) in out
            .iter_mut()
            .zip(&self.negative_grad)
            .zip(&self.positive_grad)
        {
            *o = (n - p) * scale;
        }

        Ok(())
    }

    fn accumulate_phases<R: Rng + ?Sized>(
        &mut self,
        batch: ArrayView2<f32>,
        gibbs_steps: usize,
        persistent: bool,
        temp: &mut [f32],
        rng: &mut R,
    ) -> Result<()> {
        let mut chain = Array1::zeros(self.layout.visible_size);

        for (b, visible) in batch.rows().into_iter().enumerate() {
            self.phase(visible, temp, rng)?;
            accumulate(&mut self.positive_grad, temp);

            let start = if persistent {
                self.negative_samples.row(b).to_owned()
            } else {
                visible.to_owned()
            };

            self.gibbs(start.view(), gibbs_steps, chain.view_mut(), rng)?;
            self.negative_samples.row_mut(b).assign(&chain);

            self.phase(chain.view(), temp, rng)?;
            accumulate(&mut self.negative_grad, temp);
        }

        Ok(())
    }
}
