#![warn(missing_docs)]
//! Optical Analyzers
//!
//! An analyzer of a certain [`AnalyzerType`] determines how an [`OpticalSystem`] is analyzed. The ray tracer
//! propagates the rays of a set of light sources through the system, the paraxial solver derives focal length and
//! principal plane and the pupil analyzers search the marginal ray height using the ray tracer as oracle.
use std::fmt::Display;

use strum::EnumIter;

pub mod collision;
pub mod paraxial;
pub mod pupil;
pub mod raytrace;

pub use paraxial::{system_power, ParaxialAnalyzer, ParaxialResult};
pub use pupil::{entrance_pupil, exit_pupil, Pupil, PupilAnalyzer, PupilSide};
pub use raytrace::{trace_lights, trace_ray, trace_rays, RayTracingAnalyzer, TraceConfig};

use crate::{error::OptResult, optic_system::OpticalSystem};

/// Type of analysis to be performed.
#[non_exhaustive]
#[derive(EnumIter, PartialEq, Debug, Clone)]
pub enum AnalyzerType {
    /// Ray tracing analysis.
    ///
    /// This mode propagates the rays of all light sources through the optical system.
    RayTrace(TraceConfig),
    /// First order (paraxial) analysis yielding focal length and principal plane.
    Paraxial(TraceConfig),
    /// Search of the entrance or exit pupil.
    Pupil(TraceConfig, PupilSide),
}

impl Display for AnalyzerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::RayTrace(_) => "ray tracing",
            Self::Paraxial(_) => "paraxial",
            Self::Pupil(_, PupilSide::Entrance) => "entrance pupil",
            Self::Pupil(_, PupilSide::Exit) => "exit pupil",
        };
        write!(f, "{msg}")
    }
}

/// Trait for all Analyzers
pub trait Analyzer {
    /// Result of the analysis.
    type Output;
    /// Returns the [`AnalyzerType`] of this analyzer.
    fn analyzer_type(&self) -> AnalyzerType;
    /// Analyze an [`OpticalSystem`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the concrete implementation of the [`Analyzer`] returns an error.
    fn analyze(&self, system: &OpticalSystem) -> OptResult<Self::Output>;
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn display() {
        assert_eq!(
            format!("{}", AnalyzerType::RayTrace(TraceConfig::default())),
            "ray tracing"
        );
        assert_eq!(
            format!("{}", AnalyzerType::Paraxial(TraceConfig::default())),
            "paraxial"
        );
        assert_eq!(
            format!(
                "{}",
                AnalyzerType::Pupil(TraceConfig::default(), PupilSide::Exit)
            ),
            "exit pupil"
        );
    }
    #[test]
    fn debug() {
        assert_eq!(
            format!("{:?}", AnalyzerType::Pupil(TraceConfig::default(), PupilSide::Entrance)),
            format!("Pupil({:?}, Entrance)", TraceConfig::default())
        );
    }
}
