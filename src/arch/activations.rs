//! Scalar activation functions used by the energy and the conditionals.

/// The logistic function, `1 / (1 + e^-z)`.
pub fn sigmoid(z: f32) -> f32 {
    1. / (1. + (-z).exp())
}

/// The softplus function, `ln(1 + e^z)`.
///
/// Computed as `max(z, 0) + ln(1 + e^-|z|)` so large inputs don't overflow.
pub fn softplus(z: f32) -> f32 {
    z.max(0.) + (-z.abs()).exp().ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_bounds() {
        assert_eq!(sigmoid(0.), 0.5);
        assert!(sigmoid(-200.) >= 0.);
        assert!(sigmoid(200.) <= 1.);
    }

    #[test]
    fn softplus_matches_definition() {
        for z in [-5., -0.5, 0., 0.5, 5.] {
            let expected = (1. + f32::exp(z)).ln();
            assert!((softplus(z) - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn softplus_is_stable() {
        assert!((softplus(1000.) - 1000.).abs() < 1e-3);
        assert!(softplus(-1000.).abs() < 1e-6);
    }
}
