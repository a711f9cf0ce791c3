//! Standard Material Catalog
//!
//! Reference properties for the fiber systems, resins, liners and boss alloys
//! offered by the designer. Fiber entries are unidirectional fiber/epoxy plies
//! at roughly 60% fiber volume fraction; metals and polymers are isotropic, so
//! their longitudinal and transverse values coincide.
//!
//! Values are typical datasheet figures. Cost is USD per kg of finished material.

use super::{MaterialKind, MaterialProperties};

/// Shear modulus of an isotropic material, G = E / (2(1 + ν))
fn isotropic_shear_modulus(e_mpa: f64, nu: f64) -> f64 {
    e_mpa / (2.0 * (1.0 + nu))
}

/// Build an isotropic entry from E, ν and tension/compression/shear strengths.
#[allow(clippy::too_many_arguments)]
fn isotropic(
    id: &str,
    kind: MaterialKind,
    name: &str,
    e_mpa: f64,
    nu: f64,
    tensile_mpa: f64,
    compressive_mpa: f64,
    shear_mpa: f64,
    density_kg_m3: f64,
    cost_per_kg: f64,
) -> MaterialProperties {
    MaterialProperties {
        id: id.to_string(),
        kind,
        name: name.to_string(),
        e1_mpa: e_mpa,
        e2_mpa: e_mpa,
        g12_mpa: isotropic_shear_modulus(e_mpa, nu),
        nu12: nu,
        xt_mpa: tensile_mpa,
        xc_mpa: compressive_mpa,
        yt_mpa: tensile_mpa,
        yc_mpa: compressive_mpa,
        s_mpa: shear_mpa,
        density_kg_m3,
        cost_per_kg,
    }
}

/// Build a unidirectional ply entry.
#[allow(clippy::too_many_arguments)]
fn ply(
    id: &str,
    name: &str,
    e1_mpa: f64,
    e2_mpa: f64,
    g12_mpa: f64,
    nu12: f64,
    strengths: [f64; 5],
    density_kg_m3: f64,
    cost_per_kg: f64,
) -> MaterialProperties {
    let [xt, xc, yt, yc, s] = strengths;
    MaterialProperties {
        id: id.to_string(),
        kind: MaterialKind::Fiber,
        name: name.to_string(),
        e1_mpa,
        e2_mpa,
        g12_mpa,
        nu12,
        xt_mpa: xt,
        xc_mpa: xc,
        yt_mpa: yt,
        yc_mpa: yc,
        s_mpa: s,
        density_kg_m3,
        cost_per_kg,
    }
}

/// All standard catalog entries
pub fn standard_materials() -> Vec<MaterialProperties> {
    vec![
        // === Fiber systems (UD ply, strengths Xt, Xc, Yt, Yc, S) ===
        ply("T700S", "Toray T700S / epoxy", 135_000.0, 9_500.0, 5_000.0, 0.30,
            [2550.0, 1470.0, 69.0, 220.0, 100.0], 1570.0, 30.0),
        ply("T800H", "Toray T800H / epoxy", 162_000.0, 9_000.0, 5_000.0, 0.31,
            [2840.0, 1570.0, 79.0, 250.0, 110.0], 1580.0, 55.0),
        ply("T1000G", "Toray T1000G / epoxy", 165_000.0, 9_200.0, 5_200.0, 0.31,
            [3040.0, 1570.0, 75.0, 250.0, 110.0], 1580.0, 80.0),
        ply("E-GLASS", "E-glass / epoxy", 45_000.0, 12_000.0, 5_500.0, 0.28,
            [1100.0, 675.0, 35.0, 120.0, 80.0], 2000.0, 6.0),
        // === Resins ===
        isotropic("EPOXY", MaterialKind::Resin, "Filament winding epoxy",
            3_500.0, 0.35, 80.0, 120.0, 50.0, 1200.0, 12.0),
        isotropic("VINYL-ESTER", MaterialKind::Resin, "Vinyl ester",
            3_300.0, 0.35, 75.0, 110.0, 45.0, 1120.0, 5.0),
        // === Liners ===
        isotropic("HDPE", MaterialKind::Liner, "High-density polyethylene (Type IV)",
            1_000.0, 0.40, 25.0, 30.0, 15.0, 950.0, 2.5),
        isotropic("PA6", MaterialKind::Liner, "Polyamide 6 (Type IV)",
            2_800.0, 0.39, 75.0, 90.0, 40.0, 1140.0, 4.0),
        isotropic("AL6061-T6", MaterialKind::Liner, "Aluminium 6061-T6 (Type III)",
            68_900.0, 0.33, 310.0, 310.0, 207.0, 2700.0, 4.0),
        // === Bosses ===
        isotropic("AL7075-T6", MaterialKind::Boss, "Aluminium 7075-T6",
            71_700.0, 0.33, 572.0, 572.0, 331.0, 2810.0, 6.0),
        isotropic("SS316L", MaterialKind::Boss, "Stainless steel 316L",
            193_000.0, 0.27, 485.0, 485.0, 280.0, 8000.0, 5.0),
    ]
}
