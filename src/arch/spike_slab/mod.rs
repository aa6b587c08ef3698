mod conditionals;
mod gradient;
mod hidden;

pub use conditionals::{Conditionals, MAX_VISIBLE_TRIALS};
pub use hidden::Hidden;

use log::debug;
use ndarray::prelude::*;
use rand::Rng;

use super::{EnergyModel, ParameterLayout, ParamsView, ParamsViewMut};
use crate::{RbmErr, Result, config::SpikeSlabSpec, initialization::ParamGen};

/// A spike and slab restricted Boltzmann machine.
///
/// Real valued visible units are coupled to `N` binary spikes, each gating a pool of `K`
/// gaussian slab units. The learned parameters (weights, spike biases and visible precision)
/// live in a single flat buffer so an optimizer can update them in place, while the slab
/// precision is a fixed hyperparameter held by the spec.
pub struct SpikeSlab {
    spec: SpikeSlabSpec,
    layout: ParameterLayout,
    params: Vec<f32>,

    // Gradient buffers
    positive_grad: Vec<f32>,
    negative_grad: Vec<f32>,
    temp_negative_grad: Vec<f32>,

    // Negative chains, one per row
    negative_samples: Array2<f32>,
    chains_seeded: bool,

    // Scratch
    visible_mean: Array1<f32>,
    spike_mean: Array1<f32>,
    spike_samples: Array1<f32>,
    slab_mean: Array2<f32>,
}

impl SpikeSlab {
    /// Creates a new `SpikeSlab` and initializes its parameters.
    ///
    /// # Arguments
    /// * `spec` - The model's hyperparameters.
    /// * `param_gen` - The rule used to fill the parameter buffer.
    ///
    /// # Returns
    /// A ready to use model, or an error if the spec is invalid or `param_gen` runs out of
    /// values before filling the buffer.
    pub fn new<G: ParamGen + ?Sized>(spec: SpikeSlabSpec, param_gen: &mut G) -> Result<Self> {
        spec.validate()?;

        let layout = ParameterLayout::new(
            spec.visible_size.get(),
            spec.hidden_size.get(),
            spec.pool_size.get(),
        );

        let mut model = Self {
            spec,
            layout,
            params: Vec::new(),
            positive_grad: Vec::new(),
            negative_grad: Vec::new(),
            temp_negative_grad: Vec::new(),
            negative_samples: Array2::zeros((0, 0)),
            chains_seeded: false,
            visible_mean: Array1::zeros(0),
            spike_mean: Array1::zeros(0),
            spike_samples: Array1::zeros(0),
            slab_mean: Array2::zeros((0, 0)),
        };

        model.reset(param_gen)?;
        Ok(model)
    }

    pub fn spec(&self) -> &SpikeSlabSpec {
        &self.spec
    }

    /// Returns a structured view over the parameters.
    pub fn view(&self) -> Result<ParamsView<'_>> {
        ParamsView::new(&self.params, &self.layout)
    }

    /// Returns the accumulated positive phase statistics of the last `gradient` call.
    pub fn positive_grad(&self) -> &[f32] {
        &self.positive_grad
    }

    /// Returns the accumulated negative phase statistics of the last `gradient` call.
    pub fn negative_grad(&self) -> &[f32] {
        &self.negative_grad
    }

    /// Returns the state of the negative chains, one visible vector per row.
    pub fn negative_samples(&self) -> ArrayView2<'_, f32> {
        self.negative_samples.view()
    }

    fn conditionals(&self) -> Result<Conditionals<'_>> {
        Ok(Conditionals::new(self.view()?, &self.spec))
    }

    /// Computes the probability of each spike being active given `visible`.
    pub fn spike_mean(&self, visible: ArrayView1<f32>) -> Result<Array1<f32>> {
        let mut out = Array1::zeros(self.layout.hidden_size);
        self.conditionals()?.spike_mean_into(visible, out.view_mut())?;
        Ok(out)
    }

    /// Draws a binary spike vector with the given activation probabilities.
    pub fn sample_spike<R: Rng + ?Sized>(
        &self,
        mean: ArrayView1<f32>,
        rng: &mut R,
    ) -> Result<Array1<f32>> {
        let mut out = Array1::zeros(self.layout.hidden_size);
        self.conditionals()?.sample_spike_into(mean, out.view_mut(), rng)?;
        Ok(out)
    }

    /// Computes the `K × N` slab mean given `visible` and a spike vector.
    pub fn slab_mean(
        &self,
        visible: ArrayView1<f32>,
        spike: ArrayView1<f32>,
    ) -> Result<Array2<f32>> {
        let mut out = Array2::zeros((self.layout.pool_size, self.layout.hidden_size));
        self.conditionals()?.slab_mean_into(visible, spike, out.view_mut())?;
        Ok(out)
    }

    /// Draws a `K × N` slab sample around `mean`.
    pub fn sample_slab<R: Rng + ?Sized>(
        &self,
        mean: ArrayView2<f32>,
        rng: &mut R,
    ) -> Result<Array2<f32>> {
        let mut out = mean.to_owned();
        self.conditionals()?.sample_slab_in_place(out.view_mut(), rng)?;
        Ok(out)
    }
}

impl EnergyModel for SpikeSlab {
    type Hidden = Hidden;

    fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    fn params(&self) -> &[f32] {
        &self.params
    }

    fn params_mut(&mut self) -> &mut [f32] {
        &mut self.params
    }

    /// Reallocates and zeroes the parameter, gradient and scratch buffers, then fills the
    /// parameters with `param_gen`. The previous parameters are kept if `param_gen` fails.
    fn reset<G: ParamGen + ?Sized>(&mut self, param_gen: &mut G) -> Result<()> {
        let (d, n, k) = (
            self.spec.visible_size.get(),
            self.spec.hidden_size.get(),
            self.spec.pool_size.get(),
        );

        let layout = ParameterLayout::new(d, n, k);
        let len = layout.len();
        layout.validate(len);

        let mut params = vec![0.; len];
        let got = param_gen.fill(&mut params);
        if got < len {
            return Err(RbmErr::InitializerExhausted { got, expected: len });
        }

        self.layout = layout;
        self.params = params;
        self.positive_grad = vec![0.; len];
        self.negative_grad = vec![0.; len];
        self.temp_negative_grad = vec![0.; len];
        self.negative_samples = Array2::zeros((self.spec.batch_size.get(), d));
        self.chains_seeded = false;
        self.visible_mean = Array1::zeros(d);
        self.spike_mean = Array1::zeros(n);
        self.spike_samples = Array1::zeros(n);
        self.slab_mean = Array2::zeros((k, n));

        debug!(params = len, visible = d, hidden = n, pool = k; "spike and slab model reset");
        Ok(())
    }

    fn free_energy(&self, visible: ArrayView1<f32>) -> Result<f32> {
        self.conditionals()?.free_energy(visible)
    }

    fn phase<R: Rng + ?Sized>(
        &mut self,
        visible: ArrayView1<f32>,
        grad: &mut [f32],
        rng: &mut R,
    ) -> Result<()> {
        let mut grad = ParamsViewMut::new(grad, &self.layout)?;
        let params = ParamsView::new(&self.params, &self.layout)?;
        let conditionals = Conditionals::new(params, &self.spec);

        conditionals.phase_into(
            visible,
            self.spike_mean.view_mut(),
            self.spike_samples.view_mut(),
            self.slab_mean.view_mut(),
            &mut grad,
            rng,
        )
    }

    /// The spike part holds the spike probabilities, while the slab part is the slab mean
    /// conditioned on a single spike draw.
    fn hidden_mean<R: Rng + ?Sized>(
        &self,
        visible: ArrayView1<f32>,
        rng: &mut R,
    ) -> Result<Hidden> {
        let conditionals = self.conditionals()?;
        let mut hidden = Hidden::zeros(self.layout.hidden_size, self.layout.pool_size);
        let mut spike = Array1::zeros(self.layout.hidden_size);

        conditionals.spike_mean_into(visible, hidden.spike.view_mut())?;
        conditionals.sample_spike_into(hidden.spike.view(), spike.view_mut(), rng)?;
        conditionals.slab_mean_into(visible, spike.view(), hidden.slab.view_mut())?;

        Ok(hidden)
    }

    fn sample_hidden<R: Rng + ?Sized>(
        &self,
        visible: ArrayView1<f32>,
        rng: &mut R,
    ) -> Result<Hidden> {
        let conditionals = self.conditionals()?;
        let mut hidden = Hidden::zeros(self.layout.hidden_size, self.layout.pool_size);
        let mut mean = Array1::zeros(self.layout.hidden_size);

        conditionals.spike_mean_into(visible, mean.view_mut())?;
        conditionals.sample_spike_into(mean.view(), hidden.spike.view_mut(), rng)?;
        conditionals.slab_mean_into(visible, hidden.spike.view(), hidden.slab.view_mut())?;
        conditionals.sample_slab_in_place(hidden.slab.view_mut(), rng)?;

        Ok(hidden)
    }

    fn visible_mean(&self, hidden: &Hidden) -> Result<Array1<f32>> {
        let mut out = Array1::zeros(self.layout.visible_size);
        self.conditionals()?.visible_mean_into(hidden, out.view_mut())?;
        Ok(out)
    }

    fn sample_visible<R: Rng + ?Sized>(
        &mut self,
        hidden: &Hidden,
        output: ArrayViewMut1<f32>,
        rng: &mut R,
    ) -> Result<usize> {
        let params = ParamsView::new(&self.params, &self.layout)?;
        let conditionals = Conditionals::new(params, &self.spec);

        conditionals.visible_mean_into(hidden, self.visible_mean.view_mut())?;
        conditionals.sample_visible_into(self.visible_mean.view(), output, rng)
    }

    fn gradient<R: Rng + ?Sized>(
        &mut self,
        batch: ArrayView2<f32>,
        gibbs_steps: usize,
        persistent: bool,
        rng: &mut R,
        out: &mut [f32],
    ) -> Result<()> {
        self.contrastive_divergence(batch, gibbs_steps, persistent, rng, out)
    }
}
