#![warn(missing_docs)]
//! Lens prescriptions
//!
//! A [`Prescription`] is the tabular form found in patents and lens catalogs: a list of refracting planes, each
//! given by its curvature, half-height and the distance & glass up to the next plane. It is turned into
//! positioned [`LensGroup`]s by [`Prescription::to_lens_groups`].
use serde::{Deserialize, Serialize};

use crate::{
    error::{OptResult, OpticalError},
    lens::{Lens, LensGroup},
    refractive_index::CauchyParams,
    surface::Surface,
};

/// One row of a [`Prescription`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneData {
    /// signed radius of curvature (`±inf` for flat)
    pub r: f64,
    /// distance to the next plane
    pub d: f64,
    /// half-aperture height
    pub h: f64,
    /// refractive index (d line) of the medium up to the next plane, `None` for air
    #[serde(default)]
    pub nd: Option<f64>,
    /// Abbe number of the medium up to the next plane, `None` for a non-dispersive medium
    #[serde(default)]
    pub vd: Option<f64>,
}
impl PlaneData {
    /// Creates a plane followed by air.
    #[must_use]
    pub const fn air(r: f64, d: f64, h: f64) -> Self {
        Self {
            r,
            d,
            h,
            nd: None,
            vd: None,
        }
    }
    /// Creates a plane followed by glass.
    #[must_use]
    pub const fn glass(r: f64, d: f64, h: f64, nd: f64, vd: f64) -> Self {
        Self {
            r,
            d,
            h,
            nd: Some(nd),
            vd: Some(vd),
        }
    }
    fn params(&self) -> CauchyParams {
        CauchyParams::from_catalog(self.nd, self.vd)
    }
}

/// A complete lens prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    /// descriptive name
    pub name: String,
    /// refracting planes in front-to-back order
    pub planes: Vec<PlaneData>,
    /// plane indices forming each lens
    pub lenses: Vec<Vec<usize>>,
    /// lens indices forming each group
    pub groups: Vec<Vec<usize>>,
}
impl Prescription {
    /// Build the [`Surface`]s of this prescription.
    ///
    /// The first plane is located at `x = 0` in vacuum, every following plane at the accumulated distances. The
    /// medium before a plane is the one declared by its predecessor.
    ///
    /// # Errors
    ///
    /// This function will return an error if a plane describes an invalid [`Surface`].
    pub fn surfaces(&self) -> OptResult<Vec<Surface>> {
        let mut x = 0.0;
        let mut before = CauchyParams::vacuum();
        let mut surfaces = Vec::with_capacity(self.planes.len());
        for (i, plane) in self.planes.iter().enumerate() {
            if i > 0 {
                x += self.planes[i - 1].d;
            }
            let after = plane.params();
            surfaces.push(Surface::new(x, plane.r, plane.h, before, after)?);
            before = after;
        }
        Ok(surfaces)
    }
    /// Build the (enabled) [`LensGroup`]s of this prescription. Every lens has a fully open iris.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - a plane describes an invalid [`Surface`]
    ///   - a lens or group refers to a non-existing plane or lens
    ///   - a lens has no planes
    pub fn to_lens_groups(&self) -> OptResult<Vec<LensGroup>> {
        let surfaces = self.surfaces()?;
        let lenses = self
            .lenses
            .iter()
            .map(|indices| {
                let lens_surfaces = indices
                    .iter()
                    .map(|i| {
                        surfaces.get(*i).copied().ok_or_else(|| {
                            OpticalError::InvalidLens(format!("plane index {i} out of range"))
                        })
                    })
                    .collect::<OptResult<Vec<_>>>()?;
                Lens::new(lens_surfaces, 1.0)
            })
            .collect::<OptResult<Vec<_>>>()?;
        self.groups
            .iter()
            .map(|indices| {
                let group_lenses = indices
                    .iter()
                    .map(|i| {
                        lenses.get(*i).cloned().ok_or_else(|| {
                            OpticalError::InvalidLens(format!("lens index {i} out of range"))
                        })
                    })
                    .collect::<OptResult<Vec<_>>>()?;
                Ok(LensGroup::new(group_lenses))
            })
            .collect()
    }
}
