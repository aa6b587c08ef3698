/// A `ParamGen` generates values for the initial state of the model's parameters.
pub trait ParamGen {
    /// Should sample at most `n` parameters.
    ///
    /// # Arguments
    /// * `n` - The upper limit of samples to generate.
    ///
    /// # Returns
    /// An option whether the generator is exhausted.
    fn sample(&mut self, n: usize) -> Option<Vec<f32>>;

    /// Fills `params` in place, pulling values until the slice is full.
    ///
    /// # Arguments
    /// * `params` - The buffer to fill.
    ///
    /// # Returns
    /// The amount of parameters written, which is less than `params.len()` only if the
    /// generator ran out of values.
    fn fill(&mut self, params: &mut [f32]) -> usize {
        let mut written = 0;

        while written < params.len() {
            let Some(sample) = self.sample(params.len() - written) else {
                break;
            };

            if sample.is_empty() {
                break;
            }

            params[written..written + sample.len()].copy_from_slice(&sample);
            written += sample.len();
        }

        written
    }
}
