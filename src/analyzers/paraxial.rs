#![warn(missing_docs)]
//! First order (paraxial) analysis
//!
//! The system is reduced by tracing the paraxial marginal ray `(y, ω)` (height and reduced angle `ω = n·u`)
//! through all refracting elements, starting parallel to the axis at unit height:
//!   - refraction: `ω' = ω - y·P` with the element power `P` (`(n_after - n_before)/R` for a surface),
//!   - transfer: `y' = y + d·ω/n` with the distance `d` to the next element and the index `n` of the gap.
//!
//! The system power is `Φ = -ω` behind the last element. This is equivalent to the classical sequential
//! thick-lens reduction via reduced vergences but also handles flat surfaces and zero vergences without special
//! cases.
use log::info;
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use crate::{
    error::{OptResult, OpticalError},
    lens::{sort_lenses, Lens},
    optic_system::OpticalSystem,
};

use super::{Analyzer, AnalyzerType, TraceConfig};

#[derive(Debug, Clone, Copy)]
struct ParaxialElement {
    x: f64,
    power: f64,
    n_before: f64,
    n_after: f64,
}

/// Axial position, power and surrounding media of all surfaces of the given (sorted) lenses.
fn surface_elements(lenses: &[Lens], wavelength: Length) -> Vec<ParaxialElement> {
    lenses
        .iter()
        .flat_map(Lens::surfaces)
        .map(|s| ParaxialElement {
            x: s.x(),
            power: s.power(wavelength),
            n_before: s.params_before().get_refractive_index(wavelength),
            n_after: s.params_after().get_refractive_index(wavelength),
        })
        .collect()
}
/// Every lens as one thin element at its centroid.
fn thin_lens_elements(lenses: &[Lens], wavelength: Length) -> Vec<ParaxialElement> {
    lenses
        .iter()
        .map(|lens| {
            let surfaces = lens.surfaces();
            ParaxialElement {
                x: lens.centroid(),
                power: reduce(&surface_elements(std::slice::from_ref(lens), wavelength))
                    .map_or(0.0, |(power, _)| power),
                n_before: surfaces[0]
                    .params_before()
                    .get_refractive_index(wavelength),
                n_after: surfaces[surfaces.len() - 1]
                    .params_after()
                    .get_refractive_index(wavelength),
            }
        })
        .collect()
}
/// Trace the paraxial marginal ray. Returns the power and the ray height at the last element.
fn reduce(elements: &[ParaxialElement]) -> Option<(f64, f64)> {
    let mut y = 1.0;
    let mut omega = 0.0;
    let mut previous: Option<&ParaxialElement> = None;
    for element in elements {
        if let Some(p) = previous {
            y += (element.x - p.x) * omega / p.n_after;
        }
        omega -= y * element.power;
        previous = Some(element);
    }
    previous.map(|_| (-omega, y))
}

/// Image side focal length `n'/Φ` of a single lens at the given wavelength.
///
/// `n'` is the index of the medium behind the lens, so a thin lens with this focal length deflects a ray
/// travelling in that medium like the thick lens does. Returns `None` for a lens without refractive power.
#[must_use]
pub fn lens_focal_length(lens: &Lens, wavelength: Length) -> Option<f64> {
    let elements = surface_elements(std::slice::from_ref(lens), wavelength);
    let n_after = elements.last()?.n_after;
    reduce(&elements)
        .map(|(power, _)| n_after / power)
        .filter(|f| f.is_finite())
}

/// Result of a paraxial analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParaxialResult {
    focal_length: f64,
    principal_plane: f64,
    power: f64,
}
impl ParaxialResult {
    /// Effective (rear) focal length measured from the principal plane.
    #[must_use]
    pub const fn focal_length(&self) -> f64 {
        self.focal_length
    }
    /// Axial position of the (rear) principal plane.
    #[must_use]
    pub const fn principal_plane(&self) -> f64 {
        self.principal_plane
    }
    /// Refractive power of the system.
    #[must_use]
    pub const fn power(&self) -> f64 {
        self.power
    }
    /// Axial position of the (rear) focal point.
    #[must_use]
    pub fn focal_point(&self) -> f64 {
        self.principal_plane + self.focal_length
    }
}

/// Calculate focal length and principal plane of the given lenses.
///
/// The lenses are sorted along the axis first (see [`sort_lenses`]). In ideal lens mode each lens
/// is replaced by a thin lens at its centroid having the power of the (thick) lens itself. All indices are evaluated
/// at [`TraceConfig::paraxial_wavelength`].
///
/// # Errors
///
/// This function will return [`OpticalError::SingularSystem`] if
///   - there are no lenses
///   - the system has no refractive power (afocal system)
pub fn system_power(lenses: &[Lens], config: &TraceConfig) -> OptResult<ParaxialResult> {
    let sorted = sort_lenses(lenses, config.ideal_lens());
    let wavelength = config.paraxial_wavelength();
    let elements = if config.ideal_lens() {
        thin_lens_elements(&sorted, wavelength)
    } else {
        surface_elements(&sorted, wavelength)
    };
    let Some((power, y)) = reduce(&elements) else {
        return Err(OpticalError::SingularSystem("no refracting surfaces".into()));
    };
    if power == 0.0 || !power.is_finite() {
        return Err(OpticalError::SingularSystem(
            "system has no refractive power (afocal)".into(),
        ));
    }
    let last = elements[elements.len() - 1];
    let focal_length = last.n_after / power;
    let back_focal_distance = y * focal_length;
    let principal_plane = last.x + back_focal_distance - focal_length;
    info!("paraxial solve: focal length {focal_length} mm, principal plane at {principal_plane} mm");
    Ok(ParaxialResult {
        focal_length,
        principal_plane,
        power,
    })
}

/// Analyzer for the paraxial properties of an [`OpticalSystem`]
#[derive(Default, Debug)]
pub struct ParaxialAnalyzer {
    config: TraceConfig,
}
impl ParaxialAnalyzer {
    /// Creates a new [`ParaxialAnalyzer`].
    #[must_use]
    pub const fn new(config: TraceConfig) -> Self {
        Self { config }
    }
}
impl Analyzer for ParaxialAnalyzer {
    type Output = ParaxialResult;
    fn analyzer_type(&self) -> AnalyzerType {
        AnalyzerType::Paraxial(self.config.clone())
    }
    fn analyze(&self, system: &OpticalSystem) -> OptResult<ParaxialResult> {
        system_power(system.lenses(), &self.config)
    }
}
