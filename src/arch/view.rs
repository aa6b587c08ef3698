use ndarray::prelude::*;

use super::ParameterLayout;
use crate::{RbmErr, Result};

/// Checks that a flat buffer has exactly the length its layout describes.
fn check_len(what: &'static str, got: usize, layout: &ParameterLayout) -> Result<()> {
    if got != layout.len() {
        return Err(RbmErr::SizeMismatch {
            what,
            got,
            expected: layout.len(),
        });
    }

    Ok(())
}

/// A read-only view over a flat spike and slab parameter buffer.
///
/// The view *does not own* the parameters, it interprets them via a `ParameterLayout`, so
/// any in-place update to the buffer is seen by the next view built over it.
#[derive(Debug, Clone, Copy)]
pub struct ParamsView<'a> {
    // Hidden-unit major: (N, D, K).
    weights: ArrayView3<'a, f32>,
    spike_bias: ArrayView1<'a, f32>,
    visible_precision: f32,
}

impl<'a> ParamsView<'a> {
    /// Creates a new `ParamsView`.
    ///
    /// # Arguments
    /// * `params` - The flat parameter buffer.
    /// * `layout` - The layout describing the buffer.
    ///
    /// # Returns
    /// A new `ParamsView` or an error if the buffer doesn't match the layout.
    pub fn new(params: &'a [f32], layout: &ParameterLayout) -> Result<Self> {
        check_len("params", params.len(), layout)?;

        let (w_raw, rest) = params.split_at(layout.spike_bias.start);
        let (b_raw, p_raw) = rest.split_at(layout.hidden_size);
        let shape = (layout.hidden_size, layout.visible_size, layout.pool_size);

        Ok(Self {
            weights: ArrayView3::from_shape(shape, w_raw)?,
            spike_bias: ArrayView1::from_shape(layout.hidden_size, b_raw)?,
            visible_precision: p_raw[0],
        })
    }

    /// Returns the weight tensor with its logical `D × K × N` shape.
    pub fn weights(&self) -> ArrayView3<'a, f32> {
        self.weights.permuted_axes([1, 2, 0])
    }

    /// Returns the `D × K` weight block `Wᵢ` of the `i`-th hidden unit.
    pub fn weight_block(&self, i: usize) -> ArrayView2<'a, f32> {
        self.weights.index_axis_move(Axis(0), i)
    }

    pub fn spike_bias(&self) -> ArrayView1<'a, f32> {
        self.spike_bias
    }

    pub fn visible_precision(&self) -> f32 {
        self.visible_precision
    }
}

/// A mutable view over a flat buffer laid out like the parameters, used to write gradients.
#[derive(Debug)]
pub struct ParamsViewMut<'a> {
    // Hidden-unit major: (N, D, K).
    weights: ArrayViewMut3<'a, f32>,
    spike_bias: ArrayViewMut1<'a, f32>,
    visible_precision: &'a mut f32,
}

impl<'a> ParamsViewMut<'a> {
    /// Creates a new `ParamsViewMut`.
    ///
    /// # Arguments
    /// * `buf` - The flat buffer, a gradient or the parameters themselves.
    /// * `layout` - The layout describing the buffer.
    ///
    /// # Returns
    /// A new `ParamsViewMut` or an error if the buffer doesn't match the layout.
    pub fn new(buf: &'a mut [f32], layout: &ParameterLayout) -> Result<Self> {
        check_len("gradient", buf.len(), layout)?;

        let (w_raw, rest) = buf.split_at_mut(layout.spike_bias.start);
        let (b_raw, p_raw) = rest.split_at_mut(layout.hidden_size);
        let shape = (layout.hidden_size, layout.visible_size, layout.pool_size);

        Ok(Self {
            weights: ArrayViewMut3::from_shape(shape, w_raw)?,
            spike_bias: ArrayViewMut1::from_shape(layout.hidden_size, b_raw)?,
            visible_precision: &mut p_raw[0],
        })
    }

    /// Returns the weight tensor with its logical `D × K × N` shape.
    pub fn weights(&self) -> ArrayView3<'_, f32> {
        self.weights.view().permuted_axes([1, 2, 0])
    }

    /// Returns the `D × K` block of the `i`-th hidden unit.
    pub fn weight_block_mut(&mut self, i: usize) -> ArrayViewMut2<'_, f32> {
        self.weights.index_axis_mut(Axis(0), i)
    }

    pub fn spike_bias(&self) -> ArrayView1<'_, f32> {
        self.spike_bias.view()
    }

    pub fn spike_bias_mut(&mut self) -> ArrayViewMut1<'_, f32> {
        self.spike_bias.view_mut()
    }

    pub fn visible_precision(&self) -> f32 {
        *self.visible_precision
    }

    pub fn set_visible_precision(&mut self, value: f32) {
        *self.visible_precision = value;
    }
}
