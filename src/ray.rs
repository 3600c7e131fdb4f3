#![warn(missing_docs)]
//! Module for handling optical rays
use std::fmt::Display;

use nalgebra::{Point2, Vector2};
use num::Zero;
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::nanometer};

use crate::error::{OptResult, OpticalError};

/// A single ray in the meridional (x-y) plane.
///
/// The ray is a value type: refraction or propagation never mutate a ray but create a new one sharing the
/// wavelength and the `source_index`. The direction vector is not required to be normalized.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Ray {
    /// start point of the ray
    origin: Point2<f64>,
    /// propagation direction
    dir: Vector2<f64>,
    /// Wavelength of the ray
    wvl: Length,
    /// index of the light source that emitted this ray
    source_index: usize,
}
impl Ray {
    /// Creates a new [`Ray`].
    ///
    /// # Errors
    /// This function returns an error if
    ///  - the given wavelength is <= 0.0, `NaN` or +inf
    ///  - the direction vector has a zero length or contains non-finite values
    ///  - the origin contains non-finite values
    pub fn new(
        origin: Point2<f64>,
        direction: Vector2<f64>,
        wave_length: Length,
        source_index: usize,
    ) -> OptResult<Self> {
        if wave_length.is_zero() || wave_length.is_sign_negative() || !wave_length.is_finite() {
            return Err(OpticalError::InvalidRay("wavelength must be >0".into()));
        }
        if direction.norm().is_zero() || !direction.norm().is_finite() {
            return Err(OpticalError::InvalidRay(
                "length of direction must be >0 and finite".into(),
            ));
        }
        if !origin.x.is_finite() || !origin.y.is_finite() {
            return Err(OpticalError::InvalidRay("origin must be finite".into()));
        }
        Ok(Self {
            origin,
            dir: direction,
            wvl: wave_length,
            source_index,
        })
    }
    /// Create a ray parallel to the optical axis propagating in positive x direction.
    ///
    /// # Errors
    /// This function returns an error if the given wavelength is <= 0.0, `NaN` or +inf
    pub fn new_collimated(origin: Point2<f64>, wave_length: Length, source_index: usize) -> OptResult<Self> {
        Self::new(origin, Vector2::x(), wave_length, source_index)
    }
    /// Returns the origin of this [`Ray`].
    #[must_use]
    pub const fn origin(&self) -> Point2<f64> {
        self.origin
    }
    /// Returns the direction of this [`Ray`]. **Note**: This vector is not necessarily normalized.
    #[must_use]
    pub const fn direction(&self) -> Vector2<f64> {
        self.dir
    }
    /// Returns the wavelength of this [`Ray`].
    #[must_use]
    pub const fn wavelength(&self) -> Length {
        self.wvl
    }
    /// Returns the index of the light source which emitted this [`Ray`].
    #[must_use]
    pub const fn source_index(&self) -> usize {
        self.source_index
    }
    /// Returns the point at the given distance along the (normalized) direction.
    #[must_use]
    pub fn point_at(&self, distance: f64) -> Point2<f64> {
        self.origin + distance * self.dir.normalize()
    }
    /// Continue this [`Ray`] from a new origin into a new direction.
    ///
    /// Wavelength and source index are kept. The new direction must have been produced by a refraction or a
    /// reflection and hence is non-zero.
    #[must_use]
    pub const fn continued(&self, origin: Point2<f64>, direction: Vector2<f64>) -> Self {
        Self {
            origin,
            dir: direction,
            wvl: self.wvl,
            source_index: self.source_index,
        }
    }
    /// Refract this [`Ray`] on an ideal thin lens located at its origin.
    ///
    /// The slope with respect to the optical axis changes by `-y/f` (`y` = radial offset of the origin), independent
    /// of the propagation direction along the axis. The resulting direction is normalized.
    ///
    /// # Errors
    /// This function returns an error if
    ///  - the focal length is zero or not finite
    ///  - the ray propagates perpendicular to the optical axis
    pub fn refract_paraxial(&self, focal_length: f64) -> OptResult<Self> {
        if focal_length.is_zero() || !focal_length.is_finite() {
            return Err(OpticalError::Other(
                "focal length must be != 0.0 & finite".into(),
            ));
        }
        if self.dir.x.is_zero() {
            return Err(OpticalError::InvalidRay(
                "ray propagates perpendicular to the optical axis".into(),
            ));
        }
        let mut dir = self.dir / self.dir.x.abs();
        dir.y -= self.origin.y / focal_length;
        Ok(self.continued(self.origin, dir.normalize()))
    }
    /// Returns the same ray propagating into the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        self.continued(self.origin, -self.dir)
    }
    /// Returns this ray mirrored at the plane `x = 0`.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        self.continued(
            Point2::new(-self.origin.x, self.origin.y),
            Vector2::new(-self.dir.x, self.dir.y),
        )
    }
}
impl Display for Ray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nm = Length::format_args(nanometer, uom::fmt::DisplayStyle::Abbreviation);
        write!(
            f,
            "origin: ({} mm, {} mm), dir: ({}, {}), wavelength: {:.4}, source: {}",
            self.origin.x,
            self.origin.y,
            self.dir.x,
            self.dir.y,
            nm.with(self.wvl),
            self.source_index
        )
    }
}
