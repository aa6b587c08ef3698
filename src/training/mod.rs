mod builder;
mod stats;
mod trainer;

pub use builder::TrainerBuilder;
pub use stats::EpochStats;
pub use trainer::Trainer;
