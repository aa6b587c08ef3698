use std::{
    error::Error,
    fmt::{self, Display},
};

use rand_distr::{NormalError, uniform::Error as UniformError};

/// The result type of the `RandParamGen` constructors.
pub type Result<T> = std::result::Result<T, RandErr>;

/// The reasons a weight distribution can't be built.
#[derive(Debug)]
pub enum RandErr {
    Normal(NormalError),
    Uniform(UniformError),
    NegativeStdDev(f32),
}

impl From<NormalError> for RandErr {
    fn from(value: NormalError) -> Self {
        Self::Normal(value)
    }
}

impl From<UniformError> for RandErr {
    fn from(value: UniformError) -> Self {
        Self::Uniform(value)
    }
}

impl Display for RandErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandErr::Normal(e) => write!(f, "normal weights: {e}"),
            RandErr::Uniform(e) => write!(f, "uniform weights: {e}"),
            RandErr::NegativeStdDev(std_dev) => {
                write!(f, "weight standard deviation must be non negative, got {std_dev}")
            }
        }
    }
}

impl Error for RandErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RandErr::Normal(e) => Some(e),
            RandErr::Uniform(e) => Some(e),
            RandErr::NegativeStdDev(_) => None,
        }
    }
}
