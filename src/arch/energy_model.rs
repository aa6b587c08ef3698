use ndarray::{parallel::prelude::*, prelude::*};
use rand::Rng;

use super::ParameterLayout;
use crate::{RbmErr, Result, initialization::ParamGen};

/// The capability set shared by restricted Boltzmann machine energy models.
///
/// Every parameter lives in one flat buffer described by `layout`; gradients are written into
/// buffers with the same layout so an `Optimizer` can apply them directly onto `params_mut`.
/// Randomness is always injected by the caller.
pub trait EnergyModel {
    /// The hidden state sampled from a visible vector.
    type Hidden;

    /// Returns the layout of the parameter buffer.
    fn layout(&self) -> &ParameterLayout;

    /// Returns the flat parameter buffer.
    fn params(&self) -> &[f32];

    /// Returns the flat parameter buffer for in-place updates.
    fn params_mut(&mut self) -> &mut [f32];

    /// Zeroes every buffer of the model and fills the parameters using `param_gen`.
    fn reset<G: ParamGen + ?Sized>(&mut self, param_gen: &mut G) -> Result<()>;

    /// Computes the free energy of a visible vector.
    fn free_energy(&self, visible: ArrayView1<f32>) -> Result<f32>;

    /// Writes one phase worth of gradient statistics for `visible` into `grad`.
    fn phase<R: Rng + ?Sized>(
        &mut self,
        visible: ArrayView1<f32>,
        grad: &mut [f32],
        rng: &mut R,
    ) -> Result<()>;

    /// Computes the conditional mean of the hidden state used for reconstruction.
    fn hidden_mean<R: Rng + ?Sized>(
        &self,
        visible: ArrayView1<f32>,
        rng: &mut R,
    ) -> Result<Self::Hidden>;

    /// Samples a hidden state given a visible vector.
    fn sample_hidden<R: Rng + ?Sized>(
        &self,
        visible: ArrayView1<f32>,
        rng: &mut R,
    ) -> Result<Self::Hidden>;

    /// Computes the conditional mean of the visible units given a hidden state.
    fn visible_mean(&self, hidden: &Self::Hidden) -> Result<Array1<f32>>;

    /// Samples a visible vector given a hidden state into `output`.
    ///
    /// # Returns
    /// The amount of draws it took to produce the sample.
    fn sample_visible<R: Rng + ?Sized>(
        &mut self,
        hidden: &Self::Hidden,
        output: ArrayViewMut1<f32>,
        rng: &mut R,
    ) -> Result<usize>;

    /// Computes the contrastive divergence gradient of a batch (one sample per row) into `out`.
    fn gradient<R: Rng + ?Sized>(
        &mut self,
        batch: ArrayView2<f32>,
        gibbs_steps: usize,
        persistent: bool,
        rng: &mut R,
        out: &mut [f32],
    ) -> Result<()>;

    /// Runs `steps` block Gibbs steps starting from `visible`, leaving the last visible sample
    /// in `output`.
    fn gibbs<R: Rng + ?Sized>(
        &mut self,
        visible: ArrayView1<f32>,
        steps: usize,
        mut output: ArrayViewMut1<f32>,
        rng: &mut R,
    ) -> Result<()> {
        if output.len() != visible.len() {
            return Err(RbmErr::SizeMismatch {
                what: "gibbs output",
                got: output.len(),
                expected: visible.len(),
            });
        }

        output.assign(&visible);

        for _ in 0..steps {
            let hidden = self.sample_hidden(output.view(), rng)?;
            self.sample_visible(&hidden, output.view_mut(), rng)?;
        }

        Ok(())
    }

    /// Computes the free energy of every row of `batch` in parallel.
    fn free_energy_batch(&self, batch: ArrayView2<f32>) -> Result<Array1<f32>>
    where
        Self: Sync,
    {
        let energies = batch
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|visible| self.free_energy(visible))
            .collect::<Result<Vec<_>>>()?;

        Ok(Array1::from_vec(energies))
    }
}
