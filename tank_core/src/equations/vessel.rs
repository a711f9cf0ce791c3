//! # Thin-Wall Vessel Formulas
//!
//! Membrane stresses and envelope geometry for a closed cylinder with two domes.
//!
//! ## Notation
//!
//! - `P` = Internal pressure (MPa)
//! - `R` = Radius used in the formula (mm); the solver passes the mean radius
//! - `t` = Wall thickness (mm)
//! - `h` = Dome height (mm)
//!
//! ## References
//!
//! - Roark's Formulas for Stress and Strain, 8th Edition, Table 13.1, Cases 1a and 3a

use std::f64::consts::PI;

use crate::design::DomeType;

// =============================================================================
// MEMBRANE STRESSES
// =============================================================================

/// Hoop (circumferential) stress in a closed thin-walled cylinder
///
/// # Formula (Roark's Table 13.1, Case 1a)
/// - σ_h = P·R / t
///
/// ```rust
/// use tank_core::equations::cylinder_hoop_stress;
/// assert!((cylinder_hoop_stress(70.0, 75.0, 15.0) - 350.0).abs() < 1e-9);
/// ```
#[inline]
pub fn cylinder_hoop_stress(p: f64, r: f64, t: f64) -> f64 {
    p * r / t
}

/// Axial (longitudinal) stress in a closed thin-walled cylinder
///
/// # Formula (Roark's Table 13.1, Case 1c)
/// - σ_a = P·R / (2t)
///
/// The hoop/axial ratio is exactly 2 for any input.
#[inline]
pub fn cylinder_axial_stress(p: f64, r: f64, t: f64) -> f64 {
    p * r / (2.0 * t)
}

/// Membrane stress in a thin spherical shell (equal in every direction)
///
/// # Formula (Roark's Table 13.1, Case 3a)
/// - σ = P·R / (2t)
#[inline]
pub fn sphere_membrane_stress(p: f64, r: f64, t: f64) -> f64 {
    p * r / (2.0 * t)
}

// =============================================================================
// DOME GEOMETRY
// =============================================================================

/// Enclosed volume of one dome (mm³)
///
/// # Formulas
/// - Spherical cap: V = πh(3R² + h²)/6
/// - Isotensoid (semi-ellipsoid approximation): V = (2/3)·πR²h
#[inline]
pub fn dome_volume(dome_type: DomeType, r: f64, h: f64) -> f64 {
    match dome_type {
        DomeType::Spherical => PI * h * (3.0 * r * r + h * h) / 6.0,
        DomeType::Isotensoid => 2.0 / 3.0 * PI * r * r * h,
    }
}

/// Surface area of one dome (mm²)
///
/// Cap area π(R² + h²). Exact for a spherical cap, close enough for the
/// isotensoid profile at the dome heights used in practice.
#[inline]
pub fn dome_surface_area(_dome_type: DomeType, r: f64, h: f64) -> f64 {
    PI * (r * r + h * h)
}
