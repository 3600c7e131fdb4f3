#![warn(missing_docs)]
//! Lenses made of spherical (or flat) surfaces
//!
//! # Curvature convention:
//! - positive curvature on the input will be a convex (focusing) surface
//! - negative curvature on the input will be a concave (defocusing) surface
//! - negative curvature on the output will be a convex (focusing) surface
//! - positive curvature on the output will be a concave (defocusing) surface
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    error::{OptResult, OpticalError},
    refractive_index::CauchyParams,
    surface::Surface,
    utils::linspace,
};

const OUTLINE_SAMPLES: usize = 64;

/// A lens: an ordered, non-empty list of [`Surface`]s and a built-in iris.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LensData")]
pub struct Lens {
    surfaces: Vec<Surface>,
    aperture: f64,
}
#[derive(Deserialize)]
struct LensData {
    surfaces: Vec<Surface>,
    aperture: f64,
}
impl TryFrom<LensData> for Lens {
    type Error = OpticalError;
    fn try_from(data: LensData) -> OptResult<Self> {
        Self::new(data.surfaces, data.aperture)
    }
}
impl Lens {
    /// Creates a new [`Lens`].
    ///
    /// `aperture` is the open fraction `[0, 1]` of the lens's outer clear radius.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the list of surfaces is empty
    ///   - `aperture` is outside `[0.0, 1.0]`
    pub fn new(surfaces: Vec<Surface>, aperture: f64) -> OptResult<Self> {
        if surfaces.is_empty() {
            return Err(OpticalError::InvalidLens(
                "a lens needs at least one surface".into(),
            ));
        }
        if !(0.0..=1.0).contains(&aperture) {
            return Err(OpticalError::InvalidLens(
                "aperture must be within [0.0; 1.0]".into(),
            ));
        }
        Ok(Self { surfaces, aperture })
    }
    /// Creates an equiconvex lens of zero edge thickness with the given (thick lens) focal length.
    ///
    /// The radius of curvature `R` is solved from the lens maker's equation
    /// `1/f = (n-1)·(2/R - (n-1)·d/(n·R²))` with the center thickness `d = 2·(R - sqrt(R² - h²))`. The front vertex
    /// is placed at `x`, the medium around the lens is vacuum, the glass is non-dispersive with index `nd`.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - `focal_length` or `h` is not positive and finite
    ///   - `nd` is not > 1.0 and finite
    ///   - no such lens exists since the requested focal length is too short for the given height
    pub fn symmetric_biconvex(x: f64, focal_length: f64, h: f64, nd: f64) -> OptResult<Self> {
        if focal_length <= 0.0 || !focal_length.is_finite() {
            return Err(OpticalError::InvalidLens(
                "focal length must be >0.0 and finite".into(),
            ));
        }
        if h <= 0.0 || !h.is_finite() {
            return Err(OpticalError::InvalidLens(
                "height must be >0.0 and finite".into(),
            ));
        }
        if nd <= 1.0 || !nd.is_finite() {
            return Err(OpticalError::InvalidLens(
                "refractive index must be >1.0 and finite".into(),
            ));
        }
        let thickness = |r: f64| 2.0 * (r - r.mul_add(r, -(h * h)).sqrt());
        let power = |r: f64| {
            (nd - 1.0) * (2.0 / r - (nd - 1.0) * thickness(r) / (nd * r * r))
        };
        let target = 1.0 / focal_length;
        // the thin lens radius always yields a too weak thick lens
        let mut ng = (2.0 * (nd - 1.0) * focal_length).max(h);
        let mut ok = ng;
        while power(ok) < target {
            ng = ok;
            ok *= 0.5;
            if ok < h {
                ok = h;
                if power(ok) < target {
                    return Err(OpticalError::InvalidLens(format!(
                        "focal length {focal_length} too short for height {h}"
                    )));
                }
            }
        }
        let mut iterations = 0;
        while (ng - ok).abs() > 1e-12 * ng {
            let mid = 0.5 * (ok + ng);
            if power(mid) >= target {
                ok = mid;
            } else {
                ng = mid;
            }
            iterations += 1;
            if iterations > 200 {
                return Err(OpticalError::NonConvergence(
                    "lens maker equation did not converge".into(),
                ));
            }
        }
        let radius = ok;
        let glass = CauchyParams::constant(nd);
        let air = CauchyParams::vacuum();
        let front = Surface::new(x, radius, h, air, glass)?;
        let back = Surface::new(x + thickness(radius), -radius, h, glass, air)?;
        Self::new(vec![front, back], 1.0)
    }
    /// Returns the surfaces of this [`Lens`].
    #[must_use]
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }
    /// Returns the open fraction of the built-in iris.
    #[must_use]
    pub const fn aperture(&self) -> f64 {
        self.aperture
    }
    /// Sets the open fraction of the built-in iris.
    ///
    /// # Errors
    ///
    /// This function will return an error if `aperture` is outside `[0.0, 1.0]`.
    pub fn set_aperture(&mut self, aperture: f64) -> OptResult<()> {
        if !(0.0..=1.0).contains(&aperture) {
            return Err(OpticalError::InvalidLens(
                "aperture must be within [0.0; 1.0]".into(),
            ));
        }
        self.aperture = aperture;
        Ok(())
    }
    /// Outer clear radius: the largest surface height.
    #[must_use]
    pub fn outer_height(&self) -> f64 {
        self.surfaces.iter().map(Surface::h).fold(0.0, f64::max)
    }
    /// Open radius of the built-in iris.
    #[must_use]
    pub fn open_height(&self) -> f64 {
        self.aperture * self.outer_height()
    }
    /// Axial start of the lens (minimum over all vertices and rims).
    #[must_use]
    pub fn front(&self) -> f64 {
        self.surfaces
            .iter()
            .map(|s| s.x().min(s.rim_x()))
            .fold(f64::INFINITY, f64::min)
    }
    /// Axial end of the lens (maximum over all vertices and rims).
    #[must_use]
    pub fn back(&self) -> f64 {
        self.surfaces
            .iter()
            .map(|s| s.x().max(s.rim_x()))
            .fold(f64::NEG_INFINITY, f64::max)
    }
    /// Axial position of the first surface vertex.
    #[must_use]
    pub fn first_vertex(&self) -> f64 {
        self.surfaces[0].x()
    }
    /// Axial coordinate of the centroid of the lens cross section.
    ///
    /// The outline is formed by the first and the last surface profile, connected at their rims. For a
    /// degenerated outline (e.g. a single surface) the center between [`front`](Self::front) and
    /// [`back`](Self::back) is returned.
    #[must_use]
    pub fn centroid(&self) -> f64 {
        let first = &self.surfaces[0];
        let last = &self.surfaces[self.surfaces.len() - 1];
        let outline = linspace(-first.h(), first.h(), OUTLINE_SAMPLES + 1)
            .map(|y| (first.profile_x(y), y))
            .chain(
                linspace(-last.h(), last.h(), OUTLINE_SAMPLES + 1)
                    .rev()
                    .map(|y| (last.profile_x(y), y)),
            )
            .collect::<Vec<_>>();
        let (area, moment) = outline
            .iter()
            .circular_tuple_windows()
            .fold((0.0, 0.0), |(area, moment), (p, q)| {
                let cross = p.0.mul_add(q.1, -(q.0 * p.1));
                (area + cross, (p.0 + q.0).mul_add(cross, moment))
            });
        if area.abs() < 1e-12 {
            0.5 * (self.front() + self.back())
        } else {
            moment / (3.0 * area)
        }
    }
    /// Axial position used to order lenses: the first vertex, or the centroid for ideal (thin) lenses.
    #[must_use]
    pub fn axial_position(&self, ideal: bool) -> f64 {
        if ideal {
            self.centroid()
        } else {
            self.first_vertex()
        }
    }
    /// Returns this lens mirrored at the plane `x = 0`.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            surfaces: self.surfaces.iter().rev().map(Surface::mirrored).collect(),
            aperture: self.aperture,
        }
    }
    /// Returns this lens shifted along the optical axis.
    #[must_use]
    pub fn shifted(&self, dx: f64) -> Self {
        Self {
            surfaces: self.surfaces.iter().map(|s| s.shifted(dx)).collect(),
            aperture: self.aperture,
        }
    }
}

/// A set of [`Lens`]es moved and enabled together.
///
/// The flags are only evaluated by an interactive front end, except for `enabled` which decides whether the
/// lenses take part in an optical system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensGroup {
    lenses: Vec<Lens>,
    selected: bool,
    enabled: bool,
    fixed: bool,
}
impl LensGroup {
    /// Creates a new, enabled [`LensGroup`].
    #[must_use]
    pub const fn new(lenses: Vec<Lens>) -> Self {
        Self {
            lenses,
            selected: false,
            enabled: true,
            fixed: false,
        }
    }
    /// Returns the lenses of this group.
    #[must_use]
    pub fn lenses(&self) -> &[Lens] {
        &self.lenses
    }
    /// Returns `true` if the group is selected.
    #[must_use]
    pub const fn selected(&self) -> bool {
        self.selected
    }
    /// Select / deselect this group.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
    /// Returns `true` if the group takes part in the optical system.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }
    /// Enable / disable this group.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
    /// Returns `true` if the group cannot be moved.
    #[must_use]
    pub const fn fixed(&self) -> bool {
        self.fixed
    }
    /// Fix / release this group.
    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }
    /// Returns this group with all lenses shifted along the optical axis.
    #[must_use]
    pub fn shifted(&self, dx: f64) -> Self {
        Self {
            lenses: self.lenses.iter().map(|l| l.shifted(dx)).collect(),
            ..*self
        }
    }
}
/// Flatten the given groups into the list of lenses of all enabled groups.
#[must_use]
pub fn enabled_lenses(groups: &[LensGroup]) -> Vec<Lens> {
    groups
        .iter()
        .filter(|g| g.enabled())
        .flat_map(|g| g.lenses().iter().cloned())
        .collect()
}
/// Returns the lenses sorted along the optical axis.
///
/// Lenses are sorted by their first vertex, or by their centroid if `ideal` is set.
#[must_use]
pub fn sort_lenses(lenses: &[Lens], ideal: bool) -> Vec<Lens> {
    let mut sorted = lenses.to_vec();
    sorted.sort_by(|a, b| a.axial_position(ideal).total_cmp(&b.axial_position(ideal)));
    sorted
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    fn biconvex() -> Lens {
        let glass = CauchyParams::constant(1.5);
        let air = CauchyParams::vacuum();
        Lens::new(
            vec![
                Surface::new(0.0, 50.0, 10.0, air, glass).unwrap(),
                Surface::new(4.0, -50.0, 10.0, glass, air).unwrap(),
            ],
            1.0,
        )
        .unwrap()
    }
    #[test]
    fn new() {
        assert_matches!(Lens::new(vec![], 1.0), Err(OpticalError::InvalidLens(_)));
        let s = biconvex().surfaces()[0];
        assert!(Lens::new(vec![s], -0.1).is_err());
        assert!(Lens::new(vec![s], 1.1).is_err());
        assert!(Lens::new(vec![s], f64::NAN).is_err());
        let l = Lens::new(vec![s], 0.5).unwrap();
        assert_eq!(l.aperture(), 0.5);
        assert_eq!(l.surfaces().len(), 1);
    }
    #[test]
    fn set_aperture() {
        let mut l = biconvex();
        assert!(l.set_aperture(2.0).is_err());
        l.set_aperture(0.25).unwrap();
        assert_eq!(l.open_height(), 2.5);
    }
    #[test]
    fn outline() {
        let l = biconvex();
        let sag = 50.0 - (2500.0_f64 - 100.0).sqrt();
        assert_eq!(l.outer_height(), 10.0);
        assert_eq!(l.front(), 0.0);
        assert_eq!(l.back(), 4.0);
        assert_relative_eq!(l.surfaces()[0].rim_x(), sag);
        assert_eq!(l.first_vertex(), 0.0);
    }
    #[test]
    fn centroid() {
        // symmetric lens: centroid in the middle
        assert_relative_eq!(biconvex().centroid(), 2.0, epsilon = 1e-9);
        // plano-convex: closer to the flat side
        let glass = CauchyParams::constant(1.5);
        let air = CauchyParams::vacuum();
        let l = Lens::new(
            vec![
                Surface::new(0.0, 20.0, 10.0, air, glass).unwrap(),
                Surface::flat(5.0, 10.0, glass, air).unwrap(),
            ],
            1.0,
        )
        .unwrap();
        let c = l.centroid();
        assert!(c > 2.5 && c < 5.0);
        // single surface
        let l = Lens::new(vec![Surface::flat(3.0, 10.0, air, glass).unwrap()], 1.0).unwrap();
        assert_eq!(l.centroid(), 3.0);
        assert_eq!(l.axial_position(true), 3.0);
    }
    #[test]
    fn mirrored() {
        let l = biconvex().shifted(10.0).mirrored();
        assert_eq!(l.first_vertex(), -14.0);
        assert_eq!(l.surfaces()[0].r(), 50.0);
        assert_eq!(l.surfaces()[1].x(), -10.0);
        assert_relative_eq!(l.centroid(), -12.0, epsilon = 1e-9);
    }
    #[test]
    fn symmetric_biconvex() {
        let nd = 1.5;
        let h = 20.0;
        let l = Lens::symmetric_biconvex(0.0, 100.0, h, nd).unwrap();
        let r = l.surfaces()[0].r();
        let d = l.surfaces()[1].x();
        assert_eq!(l.surfaces()[1].r(), -r);
        // zero edge thickness
        assert_relative_eq!(l.surfaces()[0].rim_x(), l.surfaces()[1].rim_x(), epsilon = 1e-9);
        let f = 1.0 / ((nd - 1.0) * (2.0 / r - (nd - 1.0) * d / (nd * r * r)));
        assert_relative_eq!(f, 100.0, max_relative = 1e-9);
        assert!(Lens::symmetric_biconvex(0.0, -10.0, h, nd).is_err());
        assert!(Lens::symmetric_biconvex(0.0, 10.0, 0.0, nd).is_err());
        assert!(Lens::symmetric_biconvex(0.0, 10.0, h, 1.0).is_err());
        // impossible: focal length far too short for the height
        assert!(Lens::symmetric_biconvex(0.0, 1.0, h, nd).is_err());
    }
    #[test]
    fn groups() {
        let mut g1 = LensGroup::new(vec![biconvex(), biconvex().shifted(10.0)]);
        let mut g2 = LensGroup::new(vec![biconvex().shifted(20.0)]);
        assert!(g1.enabled());
        assert!(!g1.selected());
        assert!(!g1.fixed());
        g1.set_selected(true);
        g1.set_fixed(true);
        assert!(g1.selected() && g1.fixed());
        assert_eq!(enabled_lenses(&[g1.clone(), g2.clone()]).len(), 3);
        g2.set_enabled(false);
        assert_eq!(enabled_lenses(&[g1.clone(), g2]).len(), 2);
        assert_eq!(g1.shifted(1.0).lenses()[1].first_vertex(), 11.0);
    }
    #[test]
    fn sorted() {
        let lenses = [biconvex().shifted(10.0), biconvex()];
        assert_eq!(sort_lenses(&lenses, false)[0].first_vertex(), 0.0);
        assert_eq!(sort_lenses(&lenses, true)[1].first_vertex(), 10.0);
        assert!(sort_lenses(&[], true).is_empty());
    }
    #[test]
    fn deserialize_validated() {
        assert!(serde_yaml::from_str::<Lens>("surfaces: []\naperture: 1.0").is_err());
        let yaml = serde_yaml::to_string(&biconvex()).unwrap();
        assert_eq!(serde_yaml::from_str::<Lens>(&yaml).unwrap(), biconvex());
        let yaml = yaml.replace("aperture: 1.0", "aperture: 7.0");
        assert!(yaml.contains("aperture: 7.0"));
        assert!(serde_yaml::from_str::<Lens>(&yaml).is_err());
    }
}
