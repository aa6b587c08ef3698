use std::{
    error::Error,
    fmt::{self, Display},
};

use ndarray::ShapeError;

use crate::initialization::RandErr;

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, RbmErr>;

/// The crate's error type.
#[derive(Debug)]
pub enum RbmErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    Shape(ShapeError),
    InvalidHyperparameter {
        name: &'static str,
        value: f32,
    },
    InitializerExhausted {
        got: usize,
        expected: usize,
    },
    InvalidDistribution(RandErr),
    SamplingFailed {
        trials: usize,
        norm: f32,
    },
    Config(String),
}

impl Display for RbmErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RbmErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "size mismatch for {what}, got {got} and expected {expected}"
            ),
            RbmErr::Shape(e) => write!(f, "invalid array shape: {e}"),
            RbmErr::InvalidHyperparameter { name, value } => {
                write!(f, "invalid hyperparameter {name}: {value}")
            }
            RbmErr::InitializerExhausted { got, expected } => write!(
                f,
                "the initializer ran out of values, generated {got} of the expected {expected}"
            ),
            RbmErr::InvalidDistribution(e) => write!(f, "invalid distribution: {e}"),
            RbmErr::SamplingFailed { trials, norm } => write!(
                f,
                "visible sample still outside the radius after {trials} trials (norm {norm})"
            ),
            RbmErr::Config(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for RbmErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RbmErr::Shape(e) => Some(e),
            RbmErr::InvalidDistribution(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for RbmErr {
    fn from(value: ShapeError) -> Self {
        Self::Shape(value)
    }
}

impl From<RandErr> for RbmErr {
    fn from(value: RandErr) -> Self {
        Self::InvalidDistribution(value)
    }
}

impl From<serde_json::Error> for RbmErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value.to_string())
    }
}
