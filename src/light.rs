#![warn(missing_docs)]
//! Light sources emitting [`Ray`]s into an optical system
use std::f64::consts::PI;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use crate::{
    error::{OptResult, OpticalError},
    geometry::from_angle,
    ray::Ray,
    utils::{linspace, usize_to_f64},
};

/// A light source in the meridional plane.
///
/// Every source emits the same ray pattern once per wavelength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LightSource {
    /// A point source emitting into all directions.
    Point {
        /// position of the source
        position: Point2<f64>,
        /// emitted wavelengths
        wavelengths: Vec<Length>,
    },
    /// A collimated bundle emitted perpendicular to the segment `start`-`end`.
    ///
    /// The rays propagate into the direction of `end - start` rotated clockwise by 90°. Hence, a segment from
    /// bottom to top emits into positive x direction.
    Parallel {
        /// first end point of the emitting segment
        start: Point2<f64>,
        /// second end point of the emitting segment
        end: Point2<f64>,
        /// emitted wavelengths
        wavelengths: Vec<Length>,
    },
}
impl LightSource {
    /// Returns the emitted wavelengths.
    #[must_use]
    pub fn wavelengths(&self) -> &[Length] {
        match self {
            Self::Point { wavelengths, .. } | Self::Parallel { wavelengths, .. } => wavelengths,
        }
    }
    /// Emit `nr_of_rays` rays per wavelength, tagged with `source_index`.
    ///
    /// A point source distributes its rays evenly over the full circle starting along the positive x axis. A
    /// parallel source distributes its rays evenly along the segment including both end points (a single ray
    /// starts in the middle).
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - a wavelength is not positive and finite
    ///   - the segment of a parallel source has zero length
    pub fn emit_rays(&self, source_index: usize, nr_of_rays: usize) -> OptResult<Vec<Ray>> {
        let mut rays = Vec::with_capacity(nr_of_rays * self.wavelengths().len());
        match self {
            Self::Point {
                position,
                wavelengths,
            } => {
                for wvl in wavelengths {
                    for i in 0..nr_of_rays {
                        let angle = 2.0 * PI * usize_to_f64(i) / usize_to_f64(nr_of_rays);
                        rays.push(Ray::new(*position, from_angle(angle), *wvl, source_index)?);
                    }
                }
            }
            Self::Parallel {
                start,
                end,
                wavelengths,
            } => {
                let span = end - start;
                if span.norm() == 0.0 {
                    return Err(OpticalError::Other(
                        "parallel light source needs two distinct end points".into(),
                    ));
                }
                let direction = Vector2::new(span.y, -span.x).normalize();
                for wvl in wavelengths {
                    for fraction in linspace(0.0, 1.0, nr_of_rays) {
                        rays.push(Ray::new(start + fraction * span, direction, *wvl, source_index)?);
                    }
                }
            }
        }
        Ok(rays)
    }
}

/// Emit the rays of all given light sources. The source index of each ray is the position of its source in the
/// given list.
///
/// # Errors
///
/// This function will return an error if one of the sources cannot emit its rays (see [`LightSource::emit_rays`]).
pub fn emit_all(sources: &[LightSource], nr_of_rays: usize) -> OptResult<Vec<Ray>> {
    let mut rays = Vec::new();
    for (i, source) in sources.iter().enumerate() {
        rays.extend(source.emit_rays(i, nr_of_rays)?);
    }
    Ok(rays)
}
