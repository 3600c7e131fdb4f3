//! Module for handling the wavelength dependent refractive index of an optical material.
#![warn(missing_docs)]
use uom::si::f64::Length;

mod refr_index_cauchy;

pub use refr_index_cauchy::CauchyParams;

/// Wavelength of the Fraunhofer F line (hydrogen, blue) in nanometers.
pub const FRAUNHOFER_F_NM: f64 = 486.1327;
/// Wavelength of the Fraunhofer d line (helium, yellow) in nanometers.
pub const FRAUNHOFER_D_NM: f64 = 587.5618;
/// Wavelength of the Fraunhofer C line (hydrogen, red) in nanometers.
pub const FRAUNHOFER_C_NM: f64 = 656.2725;

/// Wavelength of the Fraunhofer d line.
#[must_use]
pub fn d_line() -> Length {
    crate::nanometer!(FRAUNHOFER_D_NM)
}
/// Abbe number `vd = (nd - 1) / (nF - nC)` of a material given by its indices at the F, d and C lines.
///
/// Returns `f64::INFINITY` for a non-dispersive material (`nF == nC`).
#[must_use]
pub fn abbe_number(n_f: f64, n_d: f64, n_c: f64) -> f64 {
    let dispersion = n_f - n_c;
    if dispersion == 0.0 {
        f64::INFINITY
    } else {
        (n_d - 1.0) / dispersion
    }
}
#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use uom::si::length::nanometer;
    #[test]
    fn abbe() {
        // N-BK7
        assert_relative_eq!(
            abbe_number(1.522_376, 1.516_800, 1.514_322),
            64.17,
            max_relative = 1e-3
        );
        assert_eq!(abbe_number(1.5, 1.5, 1.5), f64::INFINITY);
    }
    #[test]
    fn d_line_wavelength() {
        assert_relative_eq!(d_line().get::<nanometer>(), FRAUNHOFER_D_NM, max_relative = 1e-12);
    }
}
