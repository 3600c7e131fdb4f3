//! Module for additional computational capabilities
pub mod math_utils;
pub mod uom_macros;
pub use math_utils::{linspace, usize_to_f64};
