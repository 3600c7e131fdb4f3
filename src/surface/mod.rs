//! Module for handling refracting surfaces
//!
//! A [`Surface`] is a single rotationally symmetric interface between two media, characterized by its vertex
//! position on the optical axis, its signed radius of curvature and its half-aperture height. A positive radius
//! places the center of curvature downstream (to the right) of the vertex, `±∞` denotes a flat surface.
mod plane;
mod sphere;

pub use plane::Plane;
pub use sphere::Sphere;

use log::debug;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use crate::{
    error::{OptResult, OpticalError},
    geometry::{cross_angle, rotate, Hit},
    ray::Ray,
    refractive_index::CauchyParams,
};

/// Intersection of a [`Ray`] with a geometric surface shape.
pub trait GeoSurface {
    /// Calculate intersection point and the surface normal vector at this point of a [`Ray`] with a [`GeoSurface`]
    ///
    /// This function returns `None` if the given ray does not intersect with the optically usable part of the
    /// surface (strictly ahead of the ray origin).
    fn calc_intersect_and_normal(&self, ray: &Ray) -> Option<(Hit, Vector2<f64>)>;
}

/// A single refracting interface of a lens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SurfaceData")]
pub struct Surface {
    x: f64,
    r: f64,
    h: f64,
    params_before: CauchyParams,
    params_after: CauchyParams,
}
#[derive(Deserialize)]
struct SurfaceData {
    x: f64,
    r: f64,
    h: f64,
    params_before: CauchyParams,
    params_after: CauchyParams,
}
impl TryFrom<SurfaceData> for Surface {
    type Error = OpticalError;
    fn try_from(data: SurfaceData) -> OptResult<Self> {
        Self::new(data.x, data.r, data.h, data.params_before, data.params_after)
    }
}
impl Surface {
    /// Creates a new [`Surface`].
    ///
    /// `params_before` describes the medium upstream (smaller x) of the surface, `params_after` the medium
    /// downstream.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - `x` is not finite
    ///   - `r` is zero or `NaN`
    ///   - `h` is not positive and finite
    ///   - the surface cannot be realized since `|r| < h`
    pub fn new(
        x: f64,
        r: f64,
        h: f64,
        params_before: CauchyParams,
        params_after: CauchyParams,
    ) -> OptResult<Self> {
        if !x.is_finite() {
            return Err(OpticalError::InvalidSurface("position must be finite".into()));
        }
        if r.is_nan() || r == 0.0 {
            return Err(OpticalError::InvalidSurface(
                "radius of curvature must be != 0.0 and not NaN".into(),
            ));
        }
        if h <= 0.0 || !h.is_finite() {
            return Err(OpticalError::InvalidSurface(
                "aperture height must be >0.0 and finite".into(),
            ));
        }
        if r.abs() < h {
            return Err(OpticalError::InvalidSurface(format!(
                "radius of curvature {r} is smaller than the aperture height {h}"
            )));
        }
        Ok(Self {
            x,
            r,
            h,
            params_before,
            params_after,
        })
    }
    /// Creates a new flat [`Surface`].
    ///
    /// # Errors
    ///
    /// This function will return an error if `x` is not finite or `h` is not positive and finite.
    pub fn flat(
        x: f64,
        h: f64,
        params_before: CauchyParams,
        params_after: CauchyParams,
    ) -> OptResult<Self> {
        Self::new(x, f64::INFINITY, h, params_before, params_after)
    }
    /// Axial position of the surface vertex.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }
    /// Signed radius of curvature.
    #[must_use]
    pub const fn r(&self) -> f64 {
        self.r
    }
    /// Half-aperture height.
    #[must_use]
    pub const fn h(&self) -> f64 {
        self.h
    }
    /// Dispersion of the medium upstream of the surface.
    #[must_use]
    pub const fn params_before(&self) -> &CauchyParams {
        &self.params_before
    }
    /// Dispersion of the medium downstream of the surface.
    #[must_use]
    pub const fn params_after(&self) -> &CauchyParams {
        &self.params_after
    }
    /// Returns `true` for a flat surface (infinite radius of curvature).
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.r.is_infinite()
    }
    /// Axial position of the surface profile at the radial offset `y` (`|y| <= h`).
    #[must_use]
    pub fn profile_x(&self, y: f64) -> f64 {
        if self.is_flat() {
            self.x
        } else {
            let y = y.abs().min(self.h);
            self.r
                .signum()
                .mul_add(-self.r.mul_add(self.r, -(y * y)).sqrt(), self.x + self.r)
        }
    }
    /// Axial position of the surface rim (the profile at `y = h`).
    #[must_use]
    pub fn rim_x(&self) -> f64 {
        self.profile_x(self.h)
    }
    /// Paraxial refracting power `(n_after - n_before) / r` at the given wavelength.
    #[must_use]
    pub fn power(&self, wavelength: Length) -> f64 {
        if self.is_flat() {
            return 0.0;
        }
        (self.params_after.get_refractive_index(wavelength)
            - self.params_before.get_refractive_index(wavelength))
            / self.r
    }
    /// Returns this surface mirrored at the plane `x = 0`.
    ///
    /// Position and radius of curvature change their sign and the media before and after are swapped.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            x: -self.x,
            r: -self.r,
            h: self.h,
            params_before: self.params_after,
            params_after: self.params_before,
        }
    }
    /// Returns this surface shifted along the optical axis.
    #[must_use]
    pub fn shifted(&self, dx: f64) -> Self {
        Self {
            x: self.x + dx,
            ..*self
        }
    }
    /// Calculate the intersection of a [`Ray`] with this surface and the surface normal at this point.
    #[must_use]
    pub fn calc_intersect_and_normal(&self, ray: &Ray) -> Option<(Hit, Vector2<f64>)> {
        if self.is_flat() {
            Plane::new(self.x, self.h, self.r).calc_intersect_and_normal(ray)
        } else {
            Sphere::new(self.x, self.r, self.h).calc_intersect_and_normal(ray)
        }
    }
    /// Returns `true` if a ray with the given direction arriving at a point with the given surface normal comes
    /// from the upstream medium.
    fn arrives_from_before(&self, direction: &Vector2<f64>, normal: &Vector2<f64>) -> bool {
        if self.is_flat() {
            direction.x > 0.0
        } else {
            // normals point away from the center of curvature
            let entering_sphere = normal.dot(direction) < 0.0;
            (self.r > 0.0) == entering_sphere
        }
    }
    /// Refractive indices `(incident, outgoing)` seen by a ray crossing this surface.
    #[must_use]
    pub fn indices(
        &self,
        direction: &Vector2<f64>,
        normal: &Vector2<f64>,
        wavelength: Length,
    ) -> (f64, f64) {
        let n_before = self.params_before.get_refractive_index(wavelength);
        let n_after = self.params_after.get_refractive_index(wavelength);
        if self.arrives_from_before(direction, normal) {
            (n_before, n_after)
        } else {
            (n_after, n_before)
        }
    }
    /// Calculate the direction of a [`Ray`] after crossing this surface at a point with the given normal.
    ///
    /// # Errors
    ///
    /// This function returns [`OpticalError::TotalInternalReflection`] if the ray cannot leave the denser medium.
    pub fn refract(&self, ray: &Ray, normal: &Vector2<f64>) -> OptResult<Vector2<f64>> {
        let direction = ray.direction();
        let (n_in, n_out) = self.indices(&direction, normal, ray.wavelength());
        refract_direction(&direction, normal, n_in, n_out)
    }
}

/// Refract a direction at an interface using Snell's law `n_out·sin(θ_out) = n_in·sin(θ_in)`.
///
/// The normal may point to either side of the interface. The returned vector is normalized, except for index
/// matched media (`n_in == n_out`), where the direction is returned unchanged.
///
/// # Errors
///
/// This function returns [`OpticalError::TotalInternalReflection`] if `sin(θ_in)·n_in/n_out > 1`.
pub fn refract_direction(
    direction: &Vector2<f64>,
    normal: &Vector2<f64>,
    n_in: f64,
    n_out: f64,
) -> OptResult<Vector2<f64>> {
    if n_in == n_out {
        return Ok(*direction);
    }
    let n = normal.normalize();
    // normal oriented along the propagation
    let n = if n.dot(direction) < 0.0 { -n } else { n };
    let theta_in = cross_angle(&n, direction);
    let sin_out = theta_in.sin() * n_in / n_out;
    if sin_out.abs() > 1.0 {
        debug!("total internal reflection at n_in={n_in}, n_out={n_out}");
        return Err(OpticalError::TotalInternalReflection);
    }
    Ok(rotate(&n, sin_out.asin()))
}
/// Mirror a direction at a surface with the given normal.
#[must_use]
pub fn reflect_direction(direction: &Vector2<f64>, normal: &Vector2<f64>) -> Vector2<f64> {
    let n = normal.normalize();
    direction - 2.0 * direction.dot(&n) * n
}
/// Point on the axis at which the center of curvature of a curved surface is located.
#[must_use]
pub fn center_of_curvature(x: f64, r: f64) -> Point2<f64> {
    Point2::new(x + r, 0.0)
}
