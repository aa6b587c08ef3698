pub mod activations;
mod energy_model;
mod layout;
pub mod spike_slab;
mod view;

pub use energy_model::EnergyModel;
pub use layout::ParameterLayout;
pub use spike_slab::{Hidden, SpikeSlab};
pub use view::{ParamsView, ParamsViewMut};
