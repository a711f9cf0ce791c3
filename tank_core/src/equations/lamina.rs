//! # Lamina Mechanics
//!
//! Plane-stress stiffness of a unidirectional ply and its transformation to
//! the vessel's hoop/axial axes.
//!
//! ## Notation
//!
//! - `E1`, `E2`, `G12`, `ν12` = Ply elastic constants (MPa)
//! - `Q` = Reduced stiffness in material axes
//! - `Q̄` = Transformed reduced stiffness in vessel axes (x = hoop, y = axial)
//! - `ψ` = Fiber angle measured from the hoop direction (rad)
//!
//! ## References
//!
//! - Jones, Mechanics of Composite Materials, 2nd Edition, Eqs. 2.61, 2.84, 2.97

use serde::{Deserialize, Serialize};

use crate::materials::MaterialProperties;

/// Reduced stiffness matrix terms in material axes (MPa)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReducedStiffness {
    pub q11: f64,
    pub q12: f64,
    pub q22: f64,
    pub q66: f64,
}

/// Transformed reduced stiffness in hoop/axial axes (MPa)
///
/// Index 1 = hoop, 2 = axial, 6 = in-plane shear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformedStiffness {
    pub q11: f64,
    pub q12: f64,
    pub q22: f64,
    pub q16: f64,
    pub q26: f64,
    pub q66: f64,
}

impl TransformedStiffness {
    /// Global stresses (σ_h, σ_a, τ) for membrane strains with zero shear strain
    pub fn stress(&self, strain_hoop: f64, strain_axial: f64) -> (f64, f64, f64) {
        (
            self.q11 * strain_hoop + self.q12 * strain_axial,
            self.q12 * strain_hoop + self.q22 * strain_axial,
            self.q16 * strain_hoop + self.q26 * strain_axial,
        )
    }
}

/// Reduced stiffness of a ply
///
/// # Formulas (Jones Eq. 2.61)
/// - Q11 = E1 / (1 − ν12·ν21)
/// - Q12 = ν12·E2 / (1 − ν12·ν21)
/// - Q22 = E2 / (1 − ν12·ν21)
/// - Q66 = G12
pub fn reduced_stiffness(material: &MaterialProperties) -> ReducedStiffness {
    let d = 1.0 - material.nu12 * material.nu21();
    ReducedStiffness {
        q11: material.e1_mpa / d,
        q12: material.nu12 * material.e2_mpa / d,
        q22: material.e2_mpa / d,
        q66: material.g12_mpa,
    }
}

/// Rotate the reduced stiffness into vessel axes
///
/// # Formulas (Jones Eq. 2.84), c = cos ψ, s = sin ψ
/// ```text
/// Q̄11 = Q11c⁴ + 2(Q12 + 2Q66)s²c² + Q22s⁴
/// Q̄22 = Q11s⁴ + 2(Q12 + 2Q66)s²c² + Q22c⁴
/// Q̄12 = (Q11 + Q22 − 4Q66)s²c² + Q12(s⁴ + c⁴)
/// Q̄66 = (Q11 + Q22 − 2Q12 − 2Q66)s²c² + Q66(s⁴ + c⁴)
/// Q̄16 = (Q11 − Q12 − 2Q66)sc³ + (Q12 − Q22 + 2Q66)s³c
/// Q̄26 = (Q11 − Q12 − 2Q66)s³c + (Q12 − Q22 + 2Q66)sc³
/// ```
pub fn transformed_stiffness(q: &ReducedStiffness, psi_rad: f64) -> TransformedStiffness {
    let c = psi_rad.cos();
    let s = psi_rad.sin();
    let (c2, s2) = (c * c, s * s);
    let (c4, s4) = (c2 * c2, s2 * s2);
    let s2c2 = s2 * c2;

    TransformedStiffness {
        q11: q.q11 * c4 + 2.0 * (q.q12 + 2.0 * q.q66) * s2c2 + q.q22 * s4,
        q22: q.q11 * s4 + 2.0 * (q.q12 + 2.0 * q.q66) * s2c2 + q.q22 * c4,
        q12: (q.q11 + q.q22 - 4.0 * q.q66) * s2c2 + q.q12 * (s4 + c4),
        q66: (q.q11 + q.q22 - 2.0 * q.q12 - 2.0 * q.q66) * s2c2 + q.q66 * (s4 + c4),
        q16: (q.q11 - q.q12 - 2.0 * q.q66) * s * c2 * c + (q.q12 - q.q22 + 2.0 * q.q66) * s2 * s * c,
        q26: (q.q11 - q.q12 - 2.0 * q.q66) * s2 * s * c + (q.q12 - q.q22 + 2.0 * q.q66) * s * c2 * c,
    }
}

/// Young's modulus of a ply loaded at angle φ to its fibers
///
/// # Formula (Jones Eq. 2.97)
/// ```text
/// 1/E(φ) = c⁴/E1 + (1/G12 − 2ν12/E1)·s²c² + s⁴/E2
/// ```
pub fn off_axis_modulus(material: &MaterialProperties, phi_rad: f64) -> f64 {
    let c = phi_rad.cos();
    let s = phi_rad.sin();
    let (c2, s2) = (c * c, s * s);
    let compliance = c2 * c2 / material.e1_mpa
        + (1.0 / material.g12_mpa - 2.0 * material.nu12 / material.e1_mpa) * s2 * c2
        + s2 * s2 / material.e2_mpa;
    1.0 / compliance
}

/// Rotate hoop/axial stresses into fiber axes
///
/// # Formulas, c = cos ψ, s = sin ψ
/// - σ1 = σ_h·c² + σ_a·s² + 2τ·sc
/// - σ2 = σ_h·s² + σ_a·c² − 2τ·sc
/// - τ12 = (σ_a − σ_h)·sc + τ(c² − s²)
///
/// # Returns
/// (σ1, σ2, τ12)
#[inline]
pub fn rotate_to_material_axes(hoop: f64, axial: f64, shear: f64, psi_rad: f64) -> (f64, f64, f64) {
    let c = psi_rad.cos();
    let s = psi_rad.sin();
    let sigma1 = hoop * c * c + axial * s * s + 2.0 * shear * s * c;
    let sigma2 = hoop * s * s + axial * c * c - 2.0 * shear * s * c;
    let tau12 = (axial - hoop) * s * c + shear * (c * c - s * s);
    (sigma1, sigma2, tau12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::MaterialRegistry;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn t700() -> MaterialProperties {
        MaterialRegistry::standard().get("T700S").unwrap().clone()
    }

    #[test]
    fn test_off_axis_modulus_limits() {
        let m = t700();
        assert_relative_eq!(off_axis_modulus(&m, 0.0), m.e1_mpa, max_relative = 1e-12);
        assert_relative_eq!(off_axis_modulus(&m, FRAC_PI_2), m.e2_mpa, max_relative = 1e-9);
        let mid = off_axis_modulus(&m, 45f64.to_radians());
        assert!(mid < m.e1_mpa && mid > 0.0);
    }

    #[test]
    fn test_transformed_stiffness_at_zero() {
        let q = reduced_stiffness(&t700());
        let qb = transformed_stiffness(&q, 0.0);
        assert_relative_eq!(qb.q11, q.q11, max_relative = 1e-12);
        assert_relative_eq!(qb.q22, q.q22, max_relative = 1e-12);
        assert_relative_eq!(qb.q12, q.q12, max_relative = 1e-12);
        assert_relative_eq!(qb.q66, q.q66, max_relative = 1e-12);
        assert!(qb.q16.abs() < 1e-9);
    }

    #[test]
    fn test_transformed_stiffness_at_right_angle_swaps_axes() {
        let q = reduced_stiffness(&t700());
        let qb = transformed_stiffness(&q, FRAC_PI_2);
        assert_relative_eq!(qb.q11, q.q22, max_relative = 1e-9);
        assert_relative_eq!(qb.q22, q.q11, max_relative = 1e-9);
    }

    #[test]
    fn test_coupling_terms_flip_with_angle() {
        let q = reduced_stiffness(&t700());
        let plus = transformed_stiffness(&q, 30f64.to_radians());
        let minus = transformed_stiffness(&q, -30f64.to_radians());
        assert_relative_eq!(plus.q16, -minus.q16, max_relative = 1e-12);
        assert_relative_eq!(plus.q11, minus.q11, max_relative = 1e-12);
    }

    #[test]
    fn test_rotation_identity_and_swap() {
        let (s1, s2, t12) = rotate_to_material_axes(350.0, 175.0, 0.0, 0.0);
        assert_relative_eq!(s1, 350.0);
        assert_relative_eq!(s2, 175.0);
        assert!(t12.abs() < 1e-12);

        let (s1, s2, _) = rotate_to_material_axes(350.0, 175.0, 0.0, FRAC_PI_2);
        assert_relative_eq!(s1, 175.0, max_relative = 1e-12);
        assert_relative_eq!(s2, 350.0, max_relative = 1e-12);
    }

    #[test]
    fn test_rotation_preserves_invariants() {
        let (h, a, t) = (300.0, 120.0, 25.0);
        let (s1, s2, t12) = rotate_to_material_axes(h, a, t, 0.4);
        assert_relative_eq!(s1 + s2, h + a, max_relative = 1e-12);
        assert_relative_eq!(s1 * s2 - t12 * t12, h * a - t * t, max_relative = 1e-9);
    }

    #[test]
    fn test_stress_from_strain() {
        let q = reduced_stiffness(&t700());
        let qb = transformed_stiffness(&q, 0.0);
        let (h, a, t) = qb.stress(0.01, 0.0);
        assert_relative_eq!(h, q.q11 * 0.01, max_relative = 1e-12);
        assert_relative_eq!(a, q.q12 * 0.01, max_relative = 1e-12);
        assert!(t.abs() < 1e-9);
    }
}
