//! Spherical surface
use super::{center_of_curvature, GeoSurface};
use crate::{
    geometry::{intersection_cl, Hit},
    ray::Ray,
};
use nalgebra::Vector2;

/// The usable cap of a sphere (a circle in the meridional plane) with its vertex on the optical axis.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    x: f64,
    radius: f64,
    h: f64,
}
impl Sphere {
    /// Create a new [`Sphere`] with its vertex at `x`, the signed radius of curvature and the cap height `h`.
    #[must_use]
    pub const fn new(x: f64, radius: f64, h: f64) -> Self {
        Self { x, radius, h }
    }
}
impl GeoSurface for Sphere {
    /// Of the (up to two) intersections with the full circle, the nearest one lying on the vertex side of the
    /// center of curvature and within the cap height is used. The normal points away from the center of curvature.
    fn calc_intersect_and_normal(&self, ray: &Ray) -> Option<(Hit, Vector2<f64>)> {
        let center = center_of_curvature(self.x, self.radius);
        intersection_cl(&center, self.radius.abs(), &ray.origin(), &ray.direction())
            .into_iter()
            .find(|hit| {
                let on_cap_side = if self.radius > 0.0 {
                    hit.point.x < center.x
                } else {
                    hit.point.x > center.x
                };
                on_cap_side && hit.point.y.abs() < self.h
            })
            .map(|hit| {
                let normal = (hit.point - center) / self.radius.abs();
                (hit, normal)
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nanometer;
    use approx::assert_relative_eq;
    use nalgebra::Point2;
    #[test]
    fn convex_on_axis() {
        let s = Sphere::new(10.0, 20.0, 5.0);
        let ray = Ray::new_collimated(Point2::origin(), nanometer!(587.56), 0).unwrap();
        let (hit, normal) = s.calc_intersect_and_normal(&ray).unwrap();
        assert_relative_eq!(hit.point, Point2::new(10.0, 0.0));
        assert_relative_eq!(normal, Vector2::new(-1.0, 0.0));
    }
    #[test]
    fn concave_on_axis() {
        let s = Sphere::new(10.0, -20.0, 5.0);
        let ray = Ray::new_collimated(Point2::origin(), nanometer!(587.56), 0).unwrap();
        let (hit, normal) = s.calc_intersect_and_normal(&ray).unwrap();
        assert_relative_eq!(hit.point, Point2::new(10.0, 0.0));
        assert_relative_eq!(normal, Vector2::new(1.0, 0.0));
    }
    #[test]
    fn off_axis() {
        let s = Sphere::new(0.0, 5.0, 4.0);
        let ray = Ray::new_collimated(Point2::new(-10.0, 3.0), nanometer!(587.56), 0).unwrap();
        let (hit, normal) = s.calc_intersect_and_normal(&ray).unwrap();
        assert_relative_eq!(hit.point, Point2::new(1.0, 3.0), epsilon = 1e-12);
        assert_relative_eq!(normal, Vector2::new(-0.8, 0.6), epsilon = 1e-12);
        // outside the cap
        let ray = Ray::new_collimated(Point2::new(-10.0, 4.5), nanometer!(587.56), 0).unwrap();
        assert!(s.calc_intersect_and_normal(&ray).is_none());
    }
    #[test]
    fn far_side_rejected() {
        // ray starting inside the circle behind the cap only meets the opposite half
        let s = Sphere::new(0.0, 5.0, 4.0);
        let ray = Ray::new_collimated(Point2::new(2.0, 0.0), nanometer!(587.56), 0).unwrap();
        assert!(s.calc_intersect_and_normal(&ray).is_none());
        // ... but a ray travelling backwards hits the cap from inside
        let ray = ray.reversed();
        let (hit, _) = s.calc_intersect_and_normal(&ray).unwrap();
        assert_relative_eq!(hit.point, Point2::new(0.0, 0.0), epsilon = 1e-12);
    }
}
