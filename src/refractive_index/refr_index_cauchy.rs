//! Cauchy model
use log::warn;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::nanometer};

use super::{FRAUNHOFER_C_NM, FRAUNHOFER_D_NM, FRAUNHOFER_F_NM};

/// Coefficients of Cauchy's equation `n(λ) = A + B/λ² + C/λ⁴` (λ in nanometers).
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct CauchyParams {
    a: f64,
    b: f64,
    c: f64,
}
impl Default for CauchyParams {
    fn default() -> Self {
        Self::vacuum()
    }
}
impl CauchyParams {
    /// Create a model from raw Cauchy coefficients.
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }
    /// Refractive index of vacuum (`n = 1` at all wavelengths).
    #[must_use]
    pub const fn vacuum() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
    /// Wavelength independent refractive index `nd`.
    #[must_use]
    pub const fn constant(nd: f64) -> Self {
        Self::new(nd, 0.0, 0.0)
    }
    /// Estimate the Cauchy coefficients of a catalog glass from its index `nd` and Abbe number `vd`.
    ///
    /// The principal dispersion `nF - nC = (nd - 1) / vd` is distributed between the F and C lines following the
    /// `1/λ²` spacing of the three lines. The coefficients are then obtained by solving the 3×3 linear system
    /// through the points `(λF, nF)`, `(λd, nd)` and `(λC, nC)`.
    ///
    /// A non-finite or zero `vd` (or a singular system) yields the non-dispersive model [`CauchyParams::constant`].
    #[must_use]
    pub fn estimate(nd: f64, vd: f64) -> Self {
        if !vd.is_finite() || vd == 0.0 {
            warn!("Abbe number vd={vd} is unusable for nd={nd}. Using constant index.");
            return Self::constant(nd);
        }
        // normalized to the d line to keep the system well conditioned
        let inv_sq = |lambda: f64| (FRAUNHOFER_D_NM / lambda).powi(2);
        let (f, d, c) = (
            inv_sq(FRAUNHOFER_F_NM),
            inv_sq(FRAUNHOFER_D_NM),
            inv_sq(FRAUNHOFER_C_NM),
        );
        let principal_dispersion = (nd - 1.0) / vd;
        let n_f = ((f - d) / (f - c)).mul_add(principal_dispersion, nd);
        let n_c = n_f - principal_dispersion;
        let m = Matrix3::new(1.0, f, f * f, 1.0, d, d * d, 1.0, c, c * c);
        m.lu()
            .solve(&Vector3::new(n_f, nd, n_c))
            .map_or_else(
                || {
                    warn!("Cauchy estimation failed for nd={nd}, vd={vd}. Using constant index.");
                    Self::constant(nd)
                },
                |coeff| {
                    let scale = FRAUNHOFER_D_NM * FRAUNHOFER_D_NM;
                    Self::new(coeff[0], coeff[1] * scale, coeff[2] * scale * scale)
                },
            )
    }
    /// Create the model of a catalog entry with optional `nd` and `vd`.
    ///
    /// A missing `nd` denotes vacuum (air), a missing `vd` a non-dispersive material.
    #[must_use]
    pub fn from_catalog(nd: Option<f64>, vd: Option<f64>) -> Self {
        match (nd, vd) {
            (None, _) => Self::vacuum(),
            (Some(nd), None) => Self::constant(nd),
            (Some(nd), Some(vd)) => Self::estimate(nd, vd),
        }
    }
    /// Returns the coefficient `A`.
    #[must_use]
    pub const fn a(&self) -> f64 {
        self.a
    }
    /// Returns the coefficient `B` (nm²).
    #[must_use]
    pub const fn b(&self) -> f64 {
        self.b
    }
    /// Returns the coefficient `C` (nm⁴).
    #[must_use]
    pub const fn c(&self) -> f64 {
        self.c
    }
    /// Refractive index at the given wavelength.
    #[must_use]
    pub fn get_refractive_index(&self, wavelength: Length) -> f64 {
        self.index_at_nm(wavelength.get::<nanometer>())
    }
    /// Refractive index at a wavelength given in nanometers.
    #[must_use]
    pub fn index_at_nm(&self, lambda: f64) -> f64 {
        let inv_sq = 1.0 / (lambda * lambda);
        self.c.mul_add(inv_sq * inv_sq, self.b.mul_add(inv_sq, self.a))
    }
}
