//! Flat surface
//!
//! A flat 2D interface oriented perpendicular to the optical axis and positioned at the given x position.
use super::GeoSurface;
use crate::{
    geometry::{intersection_y, Hit},
    ray::Ray,
};
use nalgebra::Vector2;

#[derive(Debug, Clone, Copy)]
/// A flat surface of finite height with its normal collinear to the optical axis.
pub struct Plane {
    x: f64,
    h: f64,
    orientation: f64,
}
impl Plane {
    /// Create a new [`Plane`] located at the given x position on the optical axis.
    ///
    /// The sign of `orientation` (the infinite radius of curvature of the surface) selects the direction of the
    /// returned normal vector: `(-1, 0)` for `+∞`, `(1, 0)` for `-∞`.
    #[must_use]
    pub const fn new(x: f64, h: f64, orientation: f64) -> Self {
        Self { x, h, orientation }
    }
}

impl GeoSurface for Plane {
    fn calc_intersect_and_normal(&self, ray: &Ray) -> Option<(Hit, Vector2<f64>)> {
        let hit = intersection_y(&ray.origin(), &ray.direction(), self.x, -self.h, self.h)?;
        Some((hit, Vector2::new(-self.orientation.signum(), 0.0)))
    }
}
