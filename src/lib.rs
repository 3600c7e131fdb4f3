//! This is the documentation for the **lensray** package, a geometric optics engine for sequential lens systems.
//!
//! An [`OpticalSystem`] is assembled from [`lens::Lens`]es (usually taken from the enabled
//! [`lens::LensGroup`]s of a [`prescription::Prescription`]), [`aperture::Aperture`] stops,
//! [`sensor::Sensor`]s and an optional enclosing [`body::Body`]. It can then be examined by the analyzers:
//!   - [`analyzers::system_power`]: paraxial focal length and principal plane
//!   - [`analyzers::trace_ray`] / [`analyzers::trace_lights`]: two-dimensional ray tracing in the meridional plane
//!   - [`analyzers::entrance_pupil`] / [`analyzers::exit_pupil`]: pupil radius found by bisection with the ray tracer
//!
//! All lengths are given in millimeters along the optical axis `x` (light travels towards `+x`) and the height `y`.
#![allow(clippy::module_name_repetitions)]

pub mod analyzers;
pub mod aperture;
pub mod body;
pub mod error;
pub mod geometry;
pub mod lens;
pub mod light;
pub mod optic_system;
pub mod prescription;
pub mod ray;
pub mod ray_path;
pub mod refractive_index;
pub mod sensor;
pub mod surface;
pub mod utils;

pub use error::{OptResult, OpticalError};
pub use optic_system::OpticalSystem;
