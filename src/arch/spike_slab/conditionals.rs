use std::f32::consts::PI;

use log::warn;
use ndarray::{Zip, linalg, prelude::*};
use ndarray_rand::{RandomExt, rand_distr::StandardNormal};
use rand::Rng;

use super::Hidden;
use crate::{
    RbmErr, Result,
    arch::{
        ParamsView, ParamsViewMut,
        activations::{sigmoid, softplus},
    },
    config::SpikeSlabSpec,
};

/// The maximum amount of draws `sample_visible_into` makes before giving up.
pub const MAX_VISIBLE_TRIALS: usize = 10;

fn check(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(RbmErr::SizeMismatch {
            what,
            got,
            expected,
        });
    }

    Ok(())
}

/// The energy and conditional distributions of a spike and slab RBM, evaluated over a
/// borrowed parameter buffer.
///
/// Every method writes into caller provided buffers so the model can reuse its scratch space.
pub struct Conditionals<'a> {
    params: ParamsView<'a>,
    slab_precision: f32,
    radius: f32,
    visible_size: usize,
    hidden_size: usize,
    pool_size: usize,
}

impl<'a> Conditionals<'a> {
    /// Creates new `Conditionals`.
    ///
    /// # Arguments
    /// * `params` - A view over the model's parameters.
    /// * `spec` - The model's hyperparameters.
    pub fn new(params: ParamsView<'a>, spec: &SpikeSlabSpec) -> Self {
        Self {
            params,
            slab_precision: spec.slab_precision,
            radius: spec.radius,
            visible_size: spec.visible_size.get(),
            hidden_size: spec.hidden_size.get(),
            pool_size: spec.pool_size.get(),
        }
    }

    /// Computes `Wᵢᵗ v` for every hidden unit, one column per unit.
    fn projections(&self, visible: ArrayView1<f32>) -> Array2<f32> {
        let mut proj = Array2::zeros((self.pool_size, self.hidden_size));

        for (i, mut col) in proj.columns_mut().into_iter().enumerate() {
            col.assign(&self.params.weight_block(i).t().dot(&visible));
        }

        proj
    }

    /// Computes the free energy of `visible`:
    ///
    /// `F(v) = ½λ_v vᵗv − ½NK ln(2π/λ_s) − Σᵢ softplus(bᵢ − ‖Wᵢᵗv‖² / 2λ_s)`
    pub fn free_energy(&self, visible: ArrayView1<f32>) -> Result<f32> {
        check("visible", visible.len(), self.visible_size)?;

        let ls = self.slab_precision;
        let nk = (self.hidden_size * self.pool_size) as f32;
        let proj = self.projections(visible);

        let mut energy = 0.5 * self.params.visible_precision() * visible.dot(&visible);
        energy -= 0.5 * nk * (2. * PI / ls).ln();

        for (h, &b) in proj.columns().into_iter().zip(self.params.spike_bias()) {
            energy -= softplus(b - h.dot(&h) / (2. * ls));
        }

        Ok(energy)
    }

    /// Writes the probability of each spike being active given `visible` into `out`.
    pub fn spike_mean_into(
        &self,
        visible: ArrayView1<f32>,
        mut out: ArrayViewMut1<f32>,
    ) -> Result<()> {
        check("visible", visible.len(), self.visible_size)?;
        check("spike mean", out.len(), self.hidden_size)?;

        let ls = self.slab_precision;
        let proj = self.projections(visible);

        Zip::from(&mut out)
            .and(proj.columns())
            .and(&self.params.spike_bias())
            .for_each(|m, h, &b| *m = sigmoid(0.5 / ls * h.dot(&h) + b));

        Ok(())
    }

    /// Draws a binary spike vector into `out`, one Bernoulli trial per unit.
    pub fn sample_spike_into<R: Rng + ?Sized>(
        &self,
        mean: ArrayView1<f32>,
        mut out: ArrayViewMut1<f32>,
        rng: &mut R,
    ) -> Result<()> {
        check("spike mean", mean.len(), self.hidden_size)?;
        check("spike", out.len(), self.hidden_size)?;

        out.zip_mut_with(&mean, |s, &p| {
            *s = if rng.random::<f32>() < p { 1. } else { 0. };
        });

        Ok(())
    }

    /// Writes the `K × N` slab mean into `out`, column `i` being `spikeᵢ / λ_s · Wᵢᵗ v`.
    pub fn slab_mean_into(
        &self,
        visible: ArrayView1<f32>,
        spike: ArrayView1<f32>,
        mut out: ArrayViewMut2<f32>,
    ) -> Result<()> {
        check("visible", visible.len(), self.visible_size)?;
        check("spike", spike.len(), self.hidden_size)?;
        check("slab mean rows", out.nrows(), self.pool_size)?;
        check("slab mean columns", out.ncols(), self.hidden_size)?;

        for (i, (mut col, &s)) in out.columns_mut().into_iter().zip(spike).enumerate() {
            if s == 0. {
                col.fill(0.);
                continue;
            }

            let w = self.params.weight_block(i);
            col.assign(&w.t().dot(&visible));
            col *= s / self.slab_precision;
        }

        Ok(())
    }

    /// Turns a slab mean into a slab sample in place, adding gaussian noise of variance `1/λ_s`.
    pub fn sample_slab_in_place<R: Rng + ?Sized>(
        &self,
        mut slab: ArrayViewMut2<f32>,
        rng: &mut R,
    ) -> Result<()> {
        check("slab rows", slab.nrows(), self.pool_size)?;
        check("slab columns", slab.ncols(), self.hidden_size)?;

        let std_dev = self.slab_precision.recip().sqrt();
        let noise = Array2::<f32>::random_using(slab.raw_dim(), StandardNormal, rng);
        slab.scaled_add(std_dev, &noise);

        Ok(())
    }

    /// Writes `1/λ_v · Σᵢ Wᵢ slabᵢ spikeᵢ` into `out`.
    pub fn visible_mean_into(&self, hidden: &Hidden, mut out: ArrayViewMut1<f32>) -> Result<()> {
        check("spike", hidden.spike.len(), self.hidden_size)?;
        check("slab rows", hidden.slab.nrows(), self.pool_size)?;
        check("slab columns", hidden.slab.ncols(), self.hidden_size)?;
        check("visible mean", out.len(), self.visible_size)?;

        out.fill(0.);

        for (i, (slab, &s)) in hidden.slab.columns().into_iter().zip(&hidden.spike).enumerate() {
            if s == 0. {
                continue;
            }

            out.scaled_add(s, &self.params.weight_block(i).dot(&slab));
        }

        out /= self.params.visible_precision();
        Ok(())
    }

    /// Draws gaussian visible vectors of variance `1/λ_v` around `mean` into `out` until one
    /// falls inside the containment radius, giving up after `MAX_VISIBLE_TRIALS` draws.
    ///
    /// # Returns
    /// The amount of draws used, or `RbmErr::SamplingFailed` if none of them was contained,
    /// in which case `out` keeps the last draw.
    pub fn sample_visible_into<R: Rng + ?Sized>(
        &self,
        mean: ArrayView1<f32>,
        mut out: ArrayViewMut1<f32>,
        rng: &mut R,
    ) -> Result<usize> {
        check("visible mean", mean.len(), self.visible_size)?;
        check("visible", out.len(), self.visible_size)?;

        let std_dev = self.params.visible_precision().recip().sqrt();
        let mut norm = f32::INFINITY;

        for trial in 1..=MAX_VISIBLE_TRIALS {
            let noise = Array1::<f32>::random_using(self.visible_size, StandardNormal, rng);
            Zip::from(&mut out)
                .and(&mean)
                .and(&noise)
                .for_each(|v, &m, &z| *v = m + std_dev * z);

            norm = out.dot(&out).sqrt();
            if norm < self.radius {
                return Ok(trial);
            }
        }

        warn!(
            trials = MAX_VISIBLE_TRIALS,
            norm = norm,
            radius = self.radius;
            "visible sample is still outside the containment radius"
        );

        Err(RbmErr::SamplingFailed {
            trials: MAX_VISIBLE_TRIALS,
            norm,
        })
    }

    /// Computes one phase of gradient statistics for `visible` into `grad`.
    ///
    /// The weight block of unit `i` gets `v · slab_meanᵢᵗ · spike_meanᵢ`, where the slab mean
    /// is conditioned on a sampled spike while the scale uses the spike probability.
    pub fn phase_into<R: Rng + ?Sized>(
        &self,
        visible: ArrayView1<f32>,
        mut spike_mean: ArrayViewMut1<f32>,
        mut spike: ArrayViewMut1<f32>,
        mut slab_mean: ArrayViewMut2<f32>,
        grad: &mut ParamsViewMut<'_>,
        rng: &mut R,
    ) -> Result<()> {
        self.spike_mean_into(visible, spike_mean.view_mut())?;
        self.sample_spike_into(spike_mean.view(), spike.view_mut(), rng)?;
        self.slab_mean_into(visible, spike.view(), slab_mean.view_mut())?;

        let v = visible.insert_axis(Axis(1));

        for (i, (slab, &p)) in slab_mean.columns().into_iter().zip(&spike_mean).enumerate() {
            let mut dw = grad.weight_block_mut(i);
            linalg::general_mat_mul(p, &v, &slab.insert_axis(Axis(0)), 0., &mut dw);
        }

        grad.spike_bias_mut().assign(&spike_mean);
        grad.set_visible_precision(-0.5 * visible.dot(&visible));

        Ok(())
    }
}
