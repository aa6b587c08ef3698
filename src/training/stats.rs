/// Statistics produced by a single training epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpochStats {
    batches: usize,
    skipped: usize,
    free_energy: f32,
}

impl EpochStats {
    /// Creates a new `EpochStats`.
    ///
    /// # Args
    /// * `batches` - Number of batches whose gradient was applied.
    /// * `skipped` - Number of batches dropped because a negative chain left the radius.
    /// * `free_energy` - Mean free energy of the training data at the end of the epoch.
    pub fn new(batches: usize, skipped: usize, free_energy: f32) -> Self {
        Self {
            batches,
            skipped,
            free_energy,
        }
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn free_energy(&self) -> f32 {
        self.free_energy
    }
}
