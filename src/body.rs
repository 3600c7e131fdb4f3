#![warn(missing_docs)]
//! The opaque housing of an optical system
use serde::{Deserialize, Serialize};

use crate::{
    aperture::Aperture,
    error::{OptResult, OpticalError},
    lens::Lens,
    sensor::Sensor,
};

/// Cylindrical housing envelope.
///
/// The housing is open at `front` and closed at `back`. Its walls at `y = ±r` between `front` and `back`
/// as well as its back plane block every ray.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BodyData")]
pub struct Body {
    r: f64,
    front: f64,
    back: f64,
}
#[derive(Deserialize)]
struct BodyData {
    r: f64,
    front: f64,
    back: f64,
}
impl TryFrom<BodyData> for Body {
    type Error = OpticalError;
    fn try_from(data: BodyData) -> OptResult<Self> {
        Self::new(data.r, data.front, data.back)
    }
}
impl Body {
    /// Creates a new [`Body`].
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the radius is not positive and finite
    ///   - `front` or `back` are not finite or `front > back`
    pub fn new(r: f64, front: f64, back: f64) -> OptResult<Self> {
        if r <= 0.0 || !r.is_finite() {
            return Err(OpticalError::Other("body radius must be >0.0 and finite".into()));
        }
        if !front.is_finite() || !back.is_finite() || front > back {
            return Err(OpticalError::Other(
                "body front and back must be finite and front <= back".into(),
            ));
        }
        Ok(Self { r, front, back })
    }
    /// Derive the smallest housing enclosing all given elements.
    ///
    /// The radius is the largest radial extent of all elements, the front the smallest axial start of all
    /// lenses and apertures and the back the largest axial end of all elements. Sensors only extend the front if
    /// there are neither lenses nor apertures. Returns `None` if there are no elements at all or all of them are
    /// located on the axis.
    #[must_use]
    pub fn enclose(lenses: &[Lens], apertures: &[Aperture], sensors: &[Sensor]) -> Option<Self> {
        let r = lenses
            .iter()
            .map(Lens::outer_height)
            .chain(apertures.iter().map(Aperture::r))
            .chain(sensors.iter().map(Sensor::radial_extent))
            .fold(0.0, f64::max);
        let mut front = lenses
            .iter()
            .map(Lens::front)
            .chain(apertures.iter().map(Aperture::x))
            .fold(f64::INFINITY, f64::min);
        if front.is_infinite() {
            front = sensors
                .iter()
                .map(|s| s.s().x.min(s.t().x))
                .fold(f64::INFINITY, f64::min);
        }
        let back = lenses
            .iter()
            .map(Lens::back)
            .chain(apertures.iter().map(Aperture::x))
            .chain(sensors.iter().map(Sensor::back))
            .fold(f64::NEG_INFINITY, f64::max);
        Self::new(r, front, back).ok()
    }
    /// Returns the outer radius.
    #[must_use]
    pub const fn r(&self) -> f64 {
        self.r
    }
    /// Returns the axial position of the open end.
    #[must_use]
    pub const fn front(&self) -> f64 {
        self.front
    }
    /// Returns the axial position of the closed end.
    #[must_use]
    pub const fn back(&self) -> f64 {
        self.back
    }
    /// Returns this body mirrored at the plane `x = 0`.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            r: self.r,
            front: -self.back,
            back: -self.front,
        }
    }
}
