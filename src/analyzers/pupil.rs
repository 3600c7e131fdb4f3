#![warn(missing_docs)]
//! Entrance and exit pupil
//!
//! The pupil radius is the largest height of a ray parallel to the optical axis which passes every refracting
//! element of the system without being stopped by an aperture. It is found by bisection using the ray tracer as
//! oracle. The exit pupil is the entrance pupil of the system reversed along the optical axis.
use log::{info, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{
    error::OptResult,
    optic_system::OpticalSystem,
    ray::Ray,
    ray_path::{TerminationKind, TracedPath},
};

use super::{
    collision::CollisionScene, paraxial::system_power, raytrace::trace_in_scene, Analyzer,
    AnalyzerType, TraceConfig,
};

/// Axial distance in front of the system at which the probe rays start.
const PROBE_DISTANCE: f64 = 1.0;

/// Side of the system a [`Pupil`] refers to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum PupilSide {
    /// object side
    #[default]
    Entrance,
    /// image side
    Exit,
}

/// Result of a pupil search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pupil {
    radius: f64,
    principal_plane: f64,
    top_path: TracedPath,
    bottom_path: TracedPath,
    converged: bool,
    iterations: usize,
}
impl Pupil {
    /// Pupil radius (height of the marginal ray).
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }
    /// Axial position of the principal plane on this side of the system.
    #[must_use]
    pub const fn principal_plane(&self) -> f64 {
        self.principal_plane
    }
    /// Traced path of the upper marginal ray.
    #[must_use]
    pub const fn top_path(&self) -> &TracedPath {
        &self.top_path
    }
    /// Traced path of the lower marginal ray.
    #[must_use]
    pub const fn bottom_path(&self) -> &TracedPath {
        &self.bottom_path
    }
    /// `false` if the bisection stopped at the iteration limit before reaching the tolerance.
    #[must_use]
    pub const fn converged(&self) -> bool {
        self.converged
    }
    /// Number of bisection steps performed.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }
    fn mirrored(self) -> Self {
        Self {
            principal_plane: -self.principal_plane,
            top_path: self.top_path.mirrored(),
            bottom_path: self.bottom_path.mirrored(),
            ..self
        }
    }
}

struct Probe<'a> {
    scene: CollisionScene<'a>,
    config: &'a TraceConfig,
    start: f64,
    expected_refractions: usize,
}
impl Probe<'_> {
    fn trace(&self, height: f64) -> OptResult<TracedPath> {
        let ray = Ray::new_collimated(
            Point2::new(self.start, height),
            self.config.paraxial_wavelength(),
            0,
        )?;
        Ok(trace_in_scene(&self.scene, ray, self.config))
    }
    /// The ray passed all refracting elements and was not stopped by an aperture.
    fn admissible(&self, path: &TracedPath) -> bool {
        path.refractions() == self.expected_refractions
            && path.internal_reflections() == 0
            && path.termination() != TerminationKind::Aperture
            && !path.truncated()
    }
}

/// Search the entrance pupil of an [`OpticalSystem`].
///
/// Probe rays start at [`TraceConfig::paraxial_wavelength`] parallel to the axis 1 mm in front of the first
/// element. The search interval is bounded by the largest lens height and bisected until it is smaller than
/// [`TraceConfig::pupil_tolerance`]. If the iteration limit is reached first, a warning is logged and the result is
/// flagged as not converged.
///
/// # Errors
///
/// This function will return an error if the paraxial analysis of the system fails (no lenses or an afocal system).
pub fn entrance_pupil(system: &OpticalSystem, config: &TraceConfig) -> OptResult<Pupil> {
    let paraxial = system_power(system.lenses(), config)?;
    let start = system.front().unwrap_or_default() - PROBE_DISTANCE;
    let probe = Probe {
        scene: CollisionScene::new(system, config),
        config,
        start,
        expected_refractions: system.refraction_count(config.ideal_lens()),
    };
    let mut ok = 0.0;
    let mut ng = system.max_lens_height();
    let mut iterations = 0;
    while ng - ok >= config.pupil_tolerance() && iterations < config.max_pupil_iterations() {
        let mid = 0.5 * (ok + ng);
        if probe.admissible(&probe.trace(mid)?) {
            ok = mid;
        } else {
            ng = mid;
        }
        iterations += 1;
    }
    let converged = ng - ok < config.pupil_tolerance();
    if !converged {
        warn!("pupil search did not converge after {iterations} iterations (interval {ok}..{ng} mm)");
    }
    info!(
        "pupil radius {ok} mm, principal plane at {} mm",
        paraxial.principal_plane()
    );
    Ok(Pupil {
        radius: ok,
        principal_plane: paraxial.principal_plane(),
        top_path: probe.trace(ok)?,
        bottom_path: probe.trace(-ok)?,
        converged,
        iterations,
    })
}
/// Search the exit pupil of an [`OpticalSystem`].
///
/// The entrance pupil of the reversed system is searched and the result (principal plane and marginal ray paths)
/// is mirrored back.
///
/// # Errors
///
/// This function will return an error if the paraxial analysis of the system fails (no lenses or an afocal system).
pub fn exit_pupil(system: &OpticalSystem, config: &TraceConfig) -> OptResult<Pupil> {
    Ok(entrance_pupil(&system.reversed(), config)?.mirrored())
}

/// Analyzer for the entrance or exit pupil of an [`OpticalSystem`]
#[derive(Default, Debug)]
pub struct PupilAnalyzer {
    config: TraceConfig,
    side: PupilSide,
}
impl PupilAnalyzer {
    /// Creates a new [`PupilAnalyzer`].
    #[must_use]
    pub const fn new(config: TraceConfig, side: PupilSide) -> Self {
        Self { config, side }
    }
}
impl Analyzer for PupilAnalyzer {
    type Output = Pupil;
    fn analyzer_type(&self) -> AnalyzerType {
        AnalyzerType::Pupil(self.config.clone(), self.side)
    }
    fn analyze(&self, system: &OpticalSystem) -> OptResult<Pupil> {
        match self.side {
            PupilSide::Entrance => entrance_pupil(system, &self.config),
            PupilSide::Exit => exit_pupil(system, &self.config),
        }
    }
}
