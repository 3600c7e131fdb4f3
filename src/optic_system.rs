#![warn(missing_docs)]
//! Snapshot of a complete optical system
//!
//! An [`OpticalSystem`] bundles everything the analyzers need: the (enabled) lenses, free-standing apertures,
//! sensors and the optional housing. It is an immutable value; the analyzers never modify it.
use serde::{Deserialize, Serialize};

use crate::{
    aperture::Aperture,
    body::Body,
    lens::{enabled_lenses, Lens, LensGroup},
    sensor::Sensor,
};

/// An optical system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpticalSystem {
    lenses: Vec<Lens>,
    apertures: Vec<Aperture>,
    sensors: Vec<Sensor>,
    body: Option<Body>,
}
impl OpticalSystem {
    /// Creates a new [`OpticalSystem`] without housing.
    #[must_use]
    pub fn new(lenses: Vec<Lens>, apertures: Vec<Aperture>, sensors: Vec<Sensor>) -> Self {
        Self {
            lenses,
            apertures,
            sensors,
            body: None,
        }
    }
    /// Creates a new [`OpticalSystem`] from the enabled lenses of the given groups.
    #[must_use]
    pub fn from_groups(groups: &[LensGroup], apertures: Vec<Aperture>, sensors: Vec<Sensor>) -> Self {
        Self::new(enabled_lenses(groups), apertures, sensors)
    }
    /// Use the given housing.
    #[must_use]
    pub fn with_body(mut self, body: Option<Body>) -> Self {
        self.body = body;
        self
    }
    /// Use the smallest housing enclosing all elements (see [`Body::enclose`]).
    #[must_use]
    pub fn with_derived_body(self) -> Self {
        let body = Body::enclose(&self.lenses, &self.apertures, &self.sensors);
        self.with_body(body)
    }
    /// Returns the lenses in the order given on construction.
    #[must_use]
    pub fn lenses(&self) -> &[Lens] {
        &self.lenses
    }
    /// Returns the free-standing apertures.
    #[must_use]
    pub fn apertures(&self) -> &[Aperture] {
        &self.apertures
    }
    /// Returns the sensors.
    #[must_use]
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }
    /// Returns the housing (if any).
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }
    /// Total number of refracting surfaces.
    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.lenses.iter().map(|l| l.surfaces().len()).sum()
    }
    /// Number of refractions a ray passing the whole system undergoes.
    ///
    /// This is the number of surfaces or, for ideal (thin) lenses, the number of lenses.
    #[must_use]
    pub fn refraction_count(&self, ideal: bool) -> usize {
        if ideal {
            self.lenses.len()
        } else {
            self.surface_count()
        }
    }
    /// Axial start of the system: the smallest lens front or aperture position.
    ///
    /// Returns `None` for a system without lenses and apertures.
    #[must_use]
    pub fn front(&self) -> Option<f64> {
        self.lenses
            .iter()
            .map(Lens::front)
            .chain(self.apertures.iter().map(Aperture::x))
            .reduce(f64::min)
    }
    /// Largest lens half-height (`0.0` for a system without lenses).
    #[must_use]
    pub fn max_lens_height(&self) -> f64 {
        self.lenses.iter().map(Lens::outer_height).fold(0.0, f64::max)
    }
    /// Returns the system reversed along the optical axis (all elements mirrored at the plane `x = 0`).
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            lenses: self.lenses.iter().rev().map(Lens::mirrored).collect(),
            apertures: self.apertures.iter().map(Aperture::mirrored).collect(),
            sensors: self.sensors.iter().map(Sensor::mirrored).collect(),
            body: self.body.as_ref().map(Body::mirrored),
        }
    }
}
