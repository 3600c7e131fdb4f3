#![warn(missing_docs)]
//! Error structures of the optics engine
use std::{error::Error, fmt::Display};

/// Result type used throughout this crate.
pub type OptResult<T> = std::result::Result<T, OpticalError>;

/// Errors that can be returned while building or analyzing an optical system.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum OpticalError {
    /// Snell's law has no real solution: the ray is totally reflected at the interface.
    TotalInternalReflection,
    /// the paraxial recursion degenerated (e.g. zero system power of an afocal system)
    SingularSystem(String),
    /// a surface was built from invalid geometry
    InvalidSurface(String),
    /// a lens was built from invalid data. The reasons are similar to [`OpticalError::InvalidSurface`]
    InvalidLens(String),
    /// a ray was built with an invalid direction or wavelength
    InvalidRay(String),
    /// invalid configuration values or unparsable configuration text
    Config(String),
    /// an iterative solver did not converge
    NonConvergence(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for OpticalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TotalInternalReflection => write!(f, "TotalInternalReflection"),
            Self::SingularSystem(m) => {
                write!(f, "SingularSystem:{m}")
            }
            Self::InvalidSurface(m) => {
                write!(f, "InvalidSurface:{m}")
            }
            Self::InvalidLens(m) => {
                write!(f, "InvalidLens:{m}")
            }
            Self::InvalidRay(m) => {
                write!(f, "InvalidRay:{m}")
            }
            Self::Config(m) => {
                write!(f, "Config:{m}")
            }
            Self::NonConvergence(m) => {
                write!(f, "NonConvergence:{m}")
            }
            Self::Other(m) => write!(f, "Optical Error:Other:{m}"),
        }
    }
}
impl Error for OpticalError {}

impl std::convert::From<String> for OpticalError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
