//! Module for handling iris stops
//!
//! An [`Aperture`] is a free-standing circular stop perpendicular to the optical axis. It has no refractive
//! effect: rays passing at a radial offset smaller than its opening radius are unaffected, all others are blocked
//! at the stop's axial position.
//! ```rust
//! use lensray::aperture::Aperture;
//!
//! let stop = Aperture::new(10.0, 5.0).unwrap();
//! assert!(stop.transmits(4.9));
//! assert!(!stop.transmits(-5.1));
//! ```
use serde::{Deserialize, Serialize};

use crate::error::{OptResult, OpticalError};

/// A circular iris stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ApertureData")]
pub struct Aperture {
    x: f64,
    r: f64,
}
#[derive(Deserialize)]
struct ApertureData {
    x: f64,
    r: f64,
}
impl TryFrom<ApertureData> for Aperture {
    type Error = OpticalError;
    fn try_from(data: ApertureData) -> OptResult<Self> {
        Self::new(data.x, data.r)
    }
}
impl Aperture {
    /// Create a new [`Aperture`] at the axial position `x` with the opening radius `r`.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///  - `x` is not finite
    ///  - the radius is negative or not finite
    pub fn new(x: f64, r: f64) -> OptResult<Self> {
        if !x.is_finite() {
            return Err(OpticalError::Other("aperture position must be finite".into()));
        }
        if r.is_sign_negative() || !r.is_finite() {
            return Err(OpticalError::Other(
                "aperture radius must be positive and finite".into(),
            ));
        }
        Ok(Self { x, r })
    }
    /// Returns the axial position of this [`Aperture`].
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }
    /// Returns the opening radius of this [`Aperture`].
    #[must_use]
    pub const fn r(&self) -> f64 {
        self.r
    }
    /// Set the opening radius.
    ///
    /// # Errors
    ///
    /// This function will return an error if the radius is negative or not finite.
    pub fn set_r(&mut self, r: f64) -> OptResult<()> {
        *self = Self::new(self.x, r)?;
        Ok(())
    }
    /// Returns `true` if a ray crossing the stop plane at the radial offset `y` passes.
    #[must_use]
    pub fn transmits(&self, y: f64) -> bool {
        y.abs() <= self.r
    }
    /// Returns this aperture mirrored at the plane `x = 0`.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            x: -self.x,
            r: self.r,
        }
    }
}
