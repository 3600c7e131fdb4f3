#![warn(missing_docs)]
//! 2D vector helpers and intersection routines
//!
//! All positions are [`Point2<f64>`] and all directions are [`Vector2<f64>`] in millimeters. The x axis is the
//! optical axis, y the radial offset. Every intersection routine only reports hits strictly ahead of the ray
//! origin: the distance along the (normalized) ray direction must exceed [`EPSILON`]. This prevents a ray from
//! colliding again with the surface it just left.
use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};

/// Minimum forward distance of a valid intersection.
pub const EPSILON: f64 = 1e-7;

/// z component of the 3D cross product of two 2D vectors.
#[must_use]
pub fn cross(p: &Vector2<f64>, q: &Vector2<f64>) -> f64 {
    p.x.mul_add(q.y, -(q.x * p.y))
}
/// Signed angle between two vectors: `asin(cross(p,q) / (|p| |q|))`.
///
/// The result lies in `[-π/2, π/2]`. Rounding excursions of the sine beyond `±1` are clamped. Returns `0.0` if
/// one of the vectors has zero length.
#[must_use]
pub fn cross_angle(p: &Vector2<f64>, q: &Vector2<f64>) -> f64 {
    let norm = p.norm() * q.norm();
    if norm == 0.0 {
        return 0.0;
    }
    (cross(p, q) / norm).clamp(-1.0, 1.0).asin()
}
/// Unit vector with the given polar angle (radians, counter-clockwise from the x axis).
#[must_use]
pub fn from_angle(theta: f64) -> Vector2<f64> {
    Vector2::new(theta.cos(), theta.sin())
}
/// Rotate a vector counter-clockwise by the given angle (radians).
#[must_use]
pub fn rotate(v: &Vector2<f64>, angle: f64) -> Vector2<f64> {
    Rotation2::new(angle) * v
}
/// Polar angle of a vector.
#[must_use]
pub fn angle_of(v: &Vector2<f64>) -> f64 {
    v.y.atan2(v.x)
}

/// An intersection point together with its distance from the ray origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// intersection point
    pub point: Point2<f64>,
    /// distance from the ray origin along the ray direction
    pub distance: f64,
}
impl Hit {
    fn along(origin: &Point2<f64>, dir: &Vector2<f64>, distance: f64) -> Option<Self> {
        if distance > EPSILON && distance.is_finite() {
            Some(Self {
                point: origin + distance * dir,
                distance,
            })
        } else {
            None
        }
    }
}

fn unit(dir: &Vector2<f64>) -> Option<Vector2<f64>> {
    let norm = dir.norm();
    if norm == 0.0 || !norm.is_finite() {
        None
    } else {
        Some(dir / norm)
    }
}

/// Intersection of a ray with the line segment `s`-`t`.
///
/// The segment end points must lie on different sides of the ray's supporting line (touching counts).
#[must_use]
pub fn intersection_ls(
    origin: &Point2<f64>,
    dir: &Vector2<f64>,
    s: &Point2<f64>,
    t: &Point2<f64>,
) -> Option<Hit> {
    let n = unit(dir)?;
    let side_s = cross(&n, &(s - origin));
    let side_t = cross(&n, &(t - origin));
    if side_s * side_t > 0.0 {
        return None;
    }
    let seg = t - s;
    let denom = cross(&n, &seg);
    if denom == 0.0 {
        // parallel (or collinear) to the segment
        return None;
    }
    let distance = cross(&(s - origin), &seg) / denom;
    Hit::along(origin, &n, distance)
}
/// Intersection of a ray with a circle.
///
/// Returns up to two hits sorted by ascending distance. Roots behind the origin (or closer than [`EPSILON`]) are
/// dropped.
#[must_use]
pub fn intersection_cl(
    center: &Point2<f64>,
    radius: f64,
    origin: &Point2<f64>,
    dir: &Vector2<f64>,
) -> Vec<Hit> {
    let Some(n) = unit(dir) else {
        return Vec::new();
    };
    let oc = origin - center;
    let b = 2.0 * oc.dot(&n);
    let c = radius.mul_add(-radius, oc.norm_squared());
    let cond = b.mul_add(b, -4.0 * c);
    if cond < 0.0 || !cond.is_finite() {
        return Vec::new();
    }
    let sqrt_cond = cond.sqrt();
    [(-b - sqrt_cond) / 2.0, (-b + sqrt_cond) / 2.0]
        .into_iter()
        .filter_map(|d| Hit::along(origin, &n, d))
        .collect()
}
/// Intersection of a ray with the horizontal line `y = const` restricted to `x_min..=x_max`.
#[must_use]
pub fn intersection_x(
    origin: &Point2<f64>,
    dir: &Vector2<f64>,
    y: f64,
    x_min: f64,
    x_max: f64,
) -> Option<Hit> {
    let n = unit(dir)?;
    if n.y == 0.0 {
        return None;
    }
    let hit = Hit::along(origin, &n, (y - origin.y) / n.y)?;
    (x_min..=x_max).contains(&hit.point.x).then_some(hit)
}
/// Intersection of a ray with the vertical line `x = const` restricted to `y_min..=y_max`.
#[must_use]
pub fn intersection_y(
    origin: &Point2<f64>,
    dir: &Vector2<f64>,
    x: f64,
    y_min: f64,
    y_max: f64,
) -> Option<Hit> {
    let n = unit(dir)?;
    if n.x == 0.0 {
        return None;
    }
    let hit = Hit::along(origin, &n, (x - origin.x) / n.x)?;
    (y_min..=y_max).contains(&hit.point.y).then_some(hit)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
    #[test]
    fn cross_and_angle() {
        let x = Vector2::x();
        let y = Vector2::y();
        assert_eq!(cross(&x, &y), 1.0);
        assert_eq!(cross(&y, &x), -1.0);
        assert_relative_eq!(cross_angle(&x, &y), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(cross_angle(&x, &Vector2::new(1.0, 1.0)), FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(
            cross_angle(&x, &Vector2::new(2.0, -2.0)),
            -FRAC_PI_4,
            epsilon = 1e-12
        );
        assert_eq!(cross_angle(&x, &Vector2::zeros()), 0.0);
    }
    #[test]
    fn rotation() {
        let v = rotate(&Vector2::x(), FRAC_PI_2);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-15);
        let v = from_angle(PI);
        assert_abs_diff_eq!(v.x, -1.0, epsilon = 1e-15);
        assert_relative_eq!(angle_of(&Vector2::new(0.0, 2.0)), FRAC_PI_2);
    }
    #[test]
    fn line_segment() {
        let origin = Point2::new(0.0, 0.0);
        let hit = intersection_ls(
            &origin,
            &Vector2::new(2.0, 0.0),
            &Point2::new(5.0, -1.0),
            &Point2::new(5.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(hit.distance, 5.0);
        assert_relative_eq!(hit.point.x, 5.0);
        assert_abs_diff_eq!(hit.point.y, 0.0);
        // segment above the ray
        assert!(intersection_ls(
            &origin,
            &Vector2::x(),
            &Point2::new(5.0, 1.0),
            &Point2::new(5.0, 2.0)
        )
        .is_none());
        // segment behind the ray
        assert!(intersection_ls(
            &origin,
            &Vector2::x(),
            &Point2::new(-5.0, -1.0),
            &Point2::new(-5.0, 1.0)
        )
        .is_none());
        // parallel
        assert!(intersection_ls(
            &origin,
            &Vector2::x(),
            &Point2::new(1.0, 0.0),
            &Point2::new(2.0, 0.0)
        )
        .is_none());
    }
    #[test]
    fn line_circle() {
        let hits = intersection_cl(
            &Point2::new(10.0, 0.0),
            2.0,
            &Point2::origin(),
            &Vector2::new(3.0, 0.0),
        );
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].distance, 8.0);
        assert_relative_eq!(hits[1].distance, 12.0);
        // origin inside the circle: only the forward root
        let hits = intersection_cl(
            &Point2::new(0.0, 0.0),
            2.0,
            &Point2::origin(),
            &Vector2::x(),
        );
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point.x, 2.0);
        // miss
        assert!(intersection_cl(
            &Point2::new(10.0, 5.0),
            2.0,
            &Point2::origin(),
            &Vector2::x()
        )
        .is_empty());
        // zero direction
        assert!(intersection_cl(&Point2::origin(), 1.0, &Point2::origin(), &Vector2::zeros())
            .is_empty());
    }
    #[test]
    fn axis_lines() {
        let origin = Point2::new(0.0, 0.0);
        let dir = Vector2::new(1.0, 1.0);
        let hit = intersection_x(&origin, &dir, 2.0, 0.0, 10.0).unwrap();
        assert_relative_eq!(hit.point.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(hit.distance, 8.0_f64.sqrt(), epsilon = 1e-12);
        assert!(intersection_x(&origin, &dir, 2.0, 3.0, 10.0).is_none());
        assert!(intersection_x(&origin, &dir, -2.0, -10.0, 10.0).is_none());
        assert!(intersection_x(&origin, &Vector2::x(), 2.0, -10.0, 10.0).is_none());

        let hit = intersection_y(&origin, &dir, 3.0, -5.0, 5.0).unwrap();
        assert_relative_eq!(hit.point.y, 3.0, epsilon = 1e-12);
        assert!(intersection_y(&origin, &dir, 3.0, -1.0, 1.0).is_none());
        assert!(intersection_y(&origin, &dir, -3.0, -5.0, 5.0).is_none());
        // the origin itself is not a hit
        assert!(intersection_y(&origin, &dir, 0.0, -5.0, 5.0).is_none());
    }
}
