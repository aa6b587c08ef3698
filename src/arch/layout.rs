use std::ops::Range;

/// Maps a flat spike and slab parameter buffer into named tensors.
///
/// The buffer holds, in order, the `D * K * N` weights, the `N` spike biases and the
/// visible precision scalar. Gradient buffers share this exact layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterLayout {
    pub visible_size: usize,
    pub hidden_size: usize,
    pub pool_size: usize,

    pub weights: Range<usize>,
    pub spike_bias: Range<usize>,
    pub visible_precision: Range<usize>,
}

impl ParameterLayout {
    /// Creates a new `ParameterLayout`.
    ///
    /// # Arguments
    /// * `visible_size` - The amount of visible units, `D`.
    /// * `hidden_size` - The amount of hidden (spike) units, `N`.
    /// * `pool_size` - The amount of slab units per hidden unit, `K`.
    ///
    /// # Returns
    /// A new `ParameterLayout` instance.
    pub fn new(visible_size: usize, hidden_size: usize, pool_size: usize) -> Self {
        let w_end = visible_size * pool_size * hidden_size;
        let b_end = w_end + hidden_size;

        Self {
            visible_size,
            hidden_size,
            pool_size,
            weights: 0..w_end,
            spike_bias: w_end..b_end,
            visible_precision: b_end..b_end + 1,
        }
    }

    /// Returns the total amount of parameters.
    pub fn len(&self) -> usize {
        self.visible_precision.end
    }

    /// Returns the size of a single weight block `Wᵢ`, that is `D * K`.
    pub fn block_len(&self) -> usize {
        self.visible_size * self.pool_size
    }

    /// Sanity check: ranges must be in-bounds, non-empty, and cover the buffer without gaps
    /// or overlaps.
    ///
    /// # Panics
    /// If any of the above doesn't hold, this is a programming error.
    pub fn validate(&self, total_params: usize) {
        assert!(!self.weights.is_empty(), "weights range must be non-empty");
        assert!(!self.spike_bias.is_empty(), "spike bias range must be non-empty");
        assert_eq!(
            self.visible_precision.len(),
            1,
            "visible precision must be a scalar"
        );
        assert_eq!(self.weights.start, 0, "weights must start the buffer");
        assert_eq!(self.weights.end, self.spike_bias.start, "gap after weights");
        assert_eq!(
            self.spike_bias.end, self.visible_precision.start,
            "gap after spike bias"
        );
        assert_eq!(self.len(), total_params, "layout doesn't cover the buffer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_buffer() {
        for (d, n, k) in [(1, 1, 1), (4, 2, 2), (7, 3, 5), (16, 9, 1)] {
            let layout = ParameterLayout::new(d, n, k);
            let total = d * k * n + n + 1;

            layout.validate(total);
            assert_eq!(
                layout.weights.len() + layout.spike_bias.len() + layout.visible_precision.len(),
                total
            );
        }
    }

    #[test]
    fn small_layout_offsets() {
        let layout = ParameterLayout::new(4, 2, 2);

        assert_eq!(layout.weights, 0..16);
        assert_eq!(layout.spike_bias, 16..18);
        assert_eq!(layout.visible_precision, 18..19);
        assert_eq!(layout.block_len(), 8);
    }

    #[test]
    #[should_panic]
    fn rejects_wrong_total() {
        ParameterLayout::new(4, 2, 2).validate(20);
    }
}
