mod chained;
mod constant;
mod error;
mod param_gen;
mod random;

pub use chained::ChainedParamGen;
pub use constant::ConstParamGen;
pub use error::{RandErr, Result};
pub use param_gen::ParamGen;
pub use random::RandParamGen;

use rand::Rng;

use crate::arch::ParameterLayout;

/// Builds the default initialization rule for a spike and slab model.
///
/// The weights are drawn from a centered normal distribution, the spike biases start at zero
/// and the visible precision starts at one so it can be safely used as a divisor.
///
/// # Arguments
/// * `rng` - A random number generator.
/// * `layout` - The parameter layout of the model being initialized.
/// * `weight_std` - The standard deviation of the weights.
///
/// # Returns
/// A chained generator covering exactly `layout.len()` parameters, or an error if
/// `weight_std` is not a valid standard deviation.
pub fn spike_slab_default<'a, R: Rng + 'a>(
    rng: R,
    layout: &ParameterLayout,
    weight_std: f32,
) -> Result<ChainedParamGen<'a>> {
    let gens: Vec<Box<dyn ParamGen + 'a>> = vec![
        Box::new(RandParamGen::normal(rng, layout.weights.len(), 0., weight_std)?),
        Box::new(ConstParamGen::new(0., layout.spike_bias.len())),
        Box::new(ConstParamGen::new(1., layout.visible_precision.len())),
    ];

    Ok(ChainedParamGen::new(gens))
}
