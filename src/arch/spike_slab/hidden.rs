use ndarray::prelude::*;

/// A hidden state of a spike and slab RBM: one binary spike per hidden unit and a pool of
/// `K` continuous slab units per spike, stored as the columns of a `K × N` matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Hidden {
    pub spike: Array1<f32>,
    pub slab: Array2<f32>,
}

impl Hidden {
    /// Creates a new zeroed `Hidden`.
    ///
    /// # Arguments
    /// * `hidden_size` - The amount of spikes, `N`.
    /// * `pool_size` - The amount of slab units per spike, `K`.
    pub fn zeros(hidden_size: usize, pool_size: usize) -> Self {
        Self {
            spike: Array1::zeros(hidden_size),
            slab: Array2::zeros((pool_size, hidden_size)),
        }
    }
}
