#![warn(missing_docs)]
//! Image sensors
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{OptResult, OpticalError};

/// A line sensor between the points `s` and `t`.
///
/// The sensor may have any orientation. The circle of confusion is a display parameter only and is not used
/// for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SensorData")]
pub struct Sensor {
    s: Point2<f64>,
    t: Point2<f64>,
    circle_of_confusion: f64,
}
#[derive(Deserialize)]
struct SensorData {
    s: Point2<f64>,
    t: Point2<f64>,
    circle_of_confusion: f64,
}
impl TryFrom<SensorData> for Sensor {
    type Error = OpticalError;
    fn try_from(data: SensorData) -> OptResult<Self> {
        Self::new(data.s, data.t, data.circle_of_confusion)
    }
}
impl Sensor {
    /// Creates a new [`Sensor`].
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///  - the end points are not finite or coincide
    ///  - the circle of confusion is negative or not finite
    pub fn new(s: Point2<f64>, t: Point2<f64>, circle_of_confusion: f64) -> OptResult<Self> {
        if !(s.x.is_finite() && s.y.is_finite() && t.x.is_finite() && t.y.is_finite()) {
            return Err(OpticalError::Other("sensor end points must be finite".into()));
        }
        if s == t {
            return Err(OpticalError::Other("sensor must have a non-zero length".into()));
        }
        if circle_of_confusion.is_sign_negative() || !circle_of_confusion.is_finite() {
            return Err(OpticalError::Other(
                "circle of confusion must be positive and finite".into(),
            ));
        }
        Ok(Self {
            s,
            t,
            circle_of_confusion,
        })
    }
    /// Creates a sensor perpendicular to the optical axis at `x` extending to `±half_height`.
    ///
    /// # Errors
    ///
    /// This function will return an error if `x` is not finite or `half_height` is not positive and finite.
    pub fn perpendicular(x: f64, half_height: f64) -> OptResult<Self> {
        if half_height <= 0.0 {
            return Err(OpticalError::Other("sensor height must be >0.0".into()));
        }
        Self::new(Point2::new(x, -half_height), Point2::new(x, half_height), 0.0)
    }
    /// Returns the first end point.
    #[must_use]
    pub const fn s(&self) -> Point2<f64> {
        self.s
    }
    /// Returns the second end point.
    #[must_use]
    pub const fn t(&self) -> Point2<f64> {
        self.t
    }
    /// Returns the circle of confusion.
    #[must_use]
    pub const fn circle_of_confusion(&self) -> f64 {
        self.circle_of_confusion
    }
    /// Largest radial extent of the sensor.
    #[must_use]
    pub fn radial_extent(&self) -> f64 {
        self.s.y.abs().max(self.t.y.abs())
    }
    /// Largest axial coordinate of the sensor.
    #[must_use]
    pub fn back(&self) -> f64 {
        self.s.x.max(self.t.x)
    }
    /// Returns this sensor mirrored at the plane `x = 0`.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            s: Point2::new(-self.s.x, self.s.y),
            t: Point2::new(-self.t.x, self.t.y),
            circle_of_confusion: self.circle_of_confusion,
        }
    }
}
