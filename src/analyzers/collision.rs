#![warn(missing_docs)]
//! Collision resolution
//!
//! For a given [`Ray`] every obstacle of an [`OpticalSystem`] is tested and the nearest collision strictly ahead
//! of the ray origin is selected. Obstacles are
//!   - the refracting lens surfaces (or ideal thin lenses at the lens centroids),
//!   - the lens mounts: a ring stop at each surface rim up to the lens outer height, the built-in iris at the lens
//!     centroid, a ring from the lens to the housing and the barrel walls at `y = ±h`,
//!   - free-standing apertures,
//!   - sensors,
//!   - the housing walls and its back plane.
use nalgebra::Vector2;

use crate::{
    geometry::{intersection_ls, intersection_x, intersection_y, Hit, EPSILON},
    lens::Lens,
    optic_system::OpticalSystem,
    ray::Ray,
    surface::Surface,
};

use super::{paraxial::lens_focal_length, TraceConfig};

/// The kind of obstacle a [`Ray`] collides with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionKind {
    /// a refracting surface with the surface normal at the hit point
    Refraction {
        /// the surface hit
        surface: Surface,
        /// surface normal at the hit point
        normal: Vector2<f64>,
    },
    /// an ideal thin lens; `None` for a lens without refractive power
    ThinLens {
        /// focal length of the thin lens
        focal_length: Option<f64>,
    },
    /// an iris stop, a lens mount ring or a built-in lens aperture
    Aperture,
    /// the housing or a lens barrel
    Body,
    /// a sensor
    Sensor,
}
impl CollisionKind {
    /// Precedence if two obstacles are hit at the same distance.
    const fn priority(&self) -> u8 {
        match self {
            Self::Aperture => 3,
            Self::Sensor => 2,
            Self::Body => 1,
            Self::Refraction { .. } | Self::ThinLens { .. } => 0,
        }
    }
}

/// A collision of a [`Ray`] with an obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// hit point and distance from the ray origin
    pub hit: Hit,
    /// the obstacle hit
    pub kind: CollisionKind,
}

#[derive(Debug)]
struct LensMount<'a> {
    lens: &'a Lens,
    centroid: f64,
    front: f64,
    back: f64,
    h: f64,
    open_h: f64,
    focal_length: Option<f64>,
}
impl<'a> LensMount<'a> {
    fn new(lens: &'a Lens, config: &TraceConfig) -> Self {
        let focal_length = if config.ideal_lens() {
            lens_focal_length(lens, config.paraxial_wavelength())
        } else {
            None
        };
        Self {
            lens,
            centroid: lens.centroid(),
            front: lens.front(),
            back: lens.back(),
            h: lens.outer_height(),
            open_h: lens.open_height(),
            focal_length,
        }
    }
}

/// All obstacles of an [`OpticalSystem`] prepared for collision tests.
///
/// The scene only lives for one analysis call. It caches the derived lens geometry (centroids, mounts and thin lens
/// focal lengths) which is needed for every bounce of every ray.
#[derive(Debug)]
pub struct CollisionScene<'a> {
    system: &'a OpticalSystem,
    mounts: Vec<LensMount<'a>>,
    ideal: bool,
    stop_radius: f64,
}
impl<'a> CollisionScene<'a> {
    /// Prepare the obstacles of the given system.
    #[must_use]
    pub fn new(system: &'a OpticalSystem, config: &TraceConfig) -> Self {
        let mounts = system
            .lenses()
            .iter()
            .map(|l| LensMount::new(l, config))
            .collect();
        let stop_radius = system.body().map_or(config.infinity_radius(), |b| b.r());
        Self {
            system,
            mounts,
            ideal: config.ideal_lens(),
            stop_radius,
        }
    }
    /// Find the nearest collision of the given [`Ray`] with any obstacle.
    ///
    /// Returns `None` if the ray escapes.
    #[must_use]
    pub fn nearest(&self, ray: &Ray) -> Option<Collision> {
        let origin = ray.origin();
        let dir = ray.direction();
        let mut nearest: Option<Collision> = None;
        let mut update = |hit: Option<Hit>, kind: CollisionKind| {
            let Some(hit) = hit else {
                return;
            };
            let replace = nearest.map_or(true, |best| {
                hit.distance < best.hit.distance - EPSILON
                    || (hit.distance <= best.hit.distance + EPSILON
                        && kind.priority() > best.kind.priority())
            });
            if replace {
                nearest = Some(Collision { hit, kind });
            }
        };
        for sensor in self.system.sensors() {
            update(
                intersection_ls(&origin, &dir, &sensor.s(), &sensor.t()),
                CollisionKind::Sensor,
            );
        }
        for aperture in self.system.apertures() {
            update(
                ring(ray, aperture.x(), aperture.r(), self.stop_radius),
                CollisionKind::Aperture,
            );
        }
        for mount in &self.mounts {
            if self.ideal {
                update(
                    intersection_y(&origin, &dir, mount.centroid, -mount.open_h, mount.open_h),
                    CollisionKind::ThinLens {
                        focal_length: mount.focal_length,
                    },
                );
            } else {
                for surface in mount.lens.surfaces() {
                    if let Some((hit, normal)) = surface.calc_intersect_and_normal(ray) {
                        update(
                            Some(hit),
                            CollisionKind::Refraction {
                                surface: *surface,
                                normal,
                            },
                        );
                    }
                    update(
                        ring(ray, surface.rim_x(), surface.h(), mount.h),
                        CollisionKind::Aperture,
                    );
                }
            }
            update(
                ring(ray, mount.centroid, mount.open_h, mount.h),
                CollisionKind::Aperture,
            );
            if let Some(body) = self.system.body() {
                let x = if self.ideal { mount.centroid } else { mount.front };
                update(ring(ray, x, mount.h, body.r()), CollisionKind::Aperture);
            }
            for y in [-mount.h, mount.h] {
                update(
                    intersection_x(&origin, &dir, y, mount.front, mount.back),
                    CollisionKind::Body,
                );
            }
        }
        if let Some(body) = self.system.body() {
            for y in [-body.r(), body.r()] {
                update(
                    intersection_x(&origin, &dir, y, body.front(), body.back()),
                    CollisionKind::Body,
                );
            }
            update(
                intersection_y(&origin, &dir, body.back(), -body.r(), body.r()),
                CollisionKind::Body,
            );
        }
        nearest
    }
}

/// Hit of a ray with the annulus `r_min < |y| <= r_max` in the plane at `x`.
fn ring(ray: &Ray, x: f64, r_min: f64, r_max: f64) -> Option<Hit> {
    intersection_y(&ray.origin(), &ray.direction(), x, -r_max, r_max)
        .filter(|hit| hit.point.y.abs() > r_min)
}
