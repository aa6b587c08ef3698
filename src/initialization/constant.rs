use super::ParamGen;

/// Yields one fixed value a bounded amount of times, e.g. the zeroed spike biases or the
/// unit visible precision.
pub struct ConstParamGen {
    value: f32,
    left: usize,
}

impl ConstParamGen {
    /// Creates a new `ConstParamGen`.
    ///
    /// # Arguments
    /// * `value` - The value every parameter starts at.
    /// * `count` - How many parameters it covers.
    pub fn new(value: f32, count: usize) -> Self {
        Self { value, left: count }
    }
}

impl ParamGen for ConstParamGen {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        let take = match self.left {
            0 => return None,
            left => n.min(left),
        };

        self.left -= take;
        Some(vec![self.value; take])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_generator_yields_nothing() {
        let mut param_gen = ConstParamGen::new(1., 0);
        assert!(param_gen.sample(1).is_none());
    }

    #[test]
    fn last_sample_is_truncated() {
        let mut param_gen = ConstParamGen::new(1., 10);

        assert_eq!(param_gen.sample(7).unwrap(), vec![1.; 7]);
        assert_eq!(param_gen.sample(7).unwrap(), vec![1.; 3]);
        assert!(param_gen.sample(1).is_none());
    }

    #[test]
    fn fill_stops_when_exhausted() {
        let mut param_gen = ConstParamGen::new(2., 3);
        let mut params = [0.; 5];

        assert_eq!(param_gen.fill(&mut params), 3);
        assert_eq!(params, [2., 2., 2., 0., 0.]);
    }
}
