//! # Mass, Volume and Cost
//!
//! Envelope-level summary of a design: internal volume, liner and composite
//! mass, material cost and stored hydrogen.
//!
//! ## Assumptions
//!
//! - Domes follow the composite inner surface; the liner follows it inwards
//! - Each layer sits at its own mid-radius; dome layers grow by the same offset
//! - Cylinder-only layers contribute no dome mass
//! - Boss fittings are not included
//!
//! Hydrogen density uses a linear compressibility fit, good to about 1% up
//! to 700 bar at room temperature:
//!
//! ```text
//! ρ = P·M / (Z·R·T),   Z ≈ 1 + 0.00066·P_bar
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::design::{Coverage, TankDesign};
use crate::equations::{dome_surface_area, dome_volume};
use crate::errors::{require_finite, CalcResult};
use crate::materials::MaterialRegistry;

/// Molar mass of H2 (kg/mol)
pub const H2_MOLAR_MASS: f64 = 0.002016;

/// Universal gas constant (J/(mol·K))
pub const GAS_CONSTANT: f64 = 8.314_462_618;

/// Slope of the linear H2 compressibility fit (1/bar)
pub const H2_COMPRESSIBILITY_SLOPE: f64 = 0.00066;

const MM3_PER_M3: f64 = 1e9;
const MM3_PER_LITRE: f64 = 1e6;

/// Mass and capacity summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassSummary {
    pub internal_volume_l: f64,
    pub liner_mass_kg: f64,
    pub composite_mass_kg: f64,
    pub total_mass_kg: f64,
    pub material_cost: f64,
    pub h2_density_kg_m3: f64,
    pub h2_capacity_kg: f64,
    /// Stored H2 as a share of H2 + vessel mass
    pub gravimetric_percent: f64,
}

/// Hydrogen density at pressure and temperature
///
/// ```rust
/// use tank_core::calculations::mass::h2_density;
/// let rho = h2_density(700.0, 15.0);
/// assert!((rho - 40.3).abs() < 0.5);
/// ```
pub fn h2_density(pressure_bar: f64, temperature_c: f64) -> f64 {
    let z = 1.0 + H2_COMPRESSIBILITY_SLOPE * pressure_bar;
    let pressure_pa = pressure_bar * 1e5;
    let temperature_k = temperature_c + 273.15;
    pressure_pa * H2_MOLAR_MASS / (z * GAS_CONSTANT * temperature_k)
}

/// Volume enclosed by a cylinder of radius `r` and two domes of height `h` (mm³)
fn envelope_volume_mm3(design: &TankDesign, r: f64, h: f64) -> f64 {
    PI * r * r * design.geometry.cylinder_length_mm + 2.0 * dome_volume(design.geometry.dome_type, r, h)
}

/// Summarise mass, cost and capacity at the working pressure.
pub fn mass_summary(design: &TankDesign, registry: &MaterialRegistry, temperature_c: f64) -> CalcResult<MassSummary> {
    design.validate(registry)?;
    require_finite("temperature_c", temperature_c)?;
    let g = &design.geometry;

    let liner_t = design.liner.as_ref().map(|l| l.thickness_mm).unwrap_or(0.0);
    let cavity_r = design.cavity_radius_mm();
    let cavity_h = (g.dome_height_mm - liner_t).max(0.0);
    let cavity_mm3 = envelope_volume_mm3(design, cavity_r, cavity_h);

    let mut cost = 0.0;
    let liner_mass_kg = match &design.liner {
        Some(liner) => {
            let material = registry.get(&liner.material_id)?;
            let shell_mm3 = envelope_volume_mm3(design, g.inner_radius_mm, g.dome_height_mm) - cavity_mm3;
            let mass = shell_mm3 / MM3_PER_M3 * material.density_kg_m3;
            cost += mass * material.cost_per_kg;
            mass
        }
        None => 0.0,
    };

    let mut composite_mass_kg = 0.0;
    let mut offset = 0.0;
    for layer in &design.layers {
        let material = registry.get(&layer.material_id)?;
        let r = g.inner_radius_mm + offset + layer.thickness_mm / 2.0;
        let mut area = 2.0 * PI * r * g.cylinder_length_mm;
        if layer.coverage == Coverage::Full {
            let h = g.dome_height_mm + (r - g.inner_radius_mm);
            area += 2.0 * dome_surface_area(g.dome_type, r, h);
        }
        let mass = area * layer.thickness_mm / MM3_PER_M3 * material.density_kg_m3;
        composite_mass_kg += mass;
        cost += mass * material.cost_per_kg;
        offset += layer.thickness_mm;
    }

    let total_mass_kg = liner_mass_kg + composite_mass_kg;
    let h2_density_kg_m3 = h2_density(design.nominal_working_pressure_bar, temperature_c);
    let h2_capacity_kg = h2_density_kg_m3 * cavity_mm3 / MM3_PER_M3;
    let gravimetric_percent = if h2_capacity_kg + total_mass_kg > 0.0 {
        h2_capacity_kg / (h2_capacity_kg + total_mass_kg) * 100.0
    } else {
        0.0
    };

    tracing::debug!(design = %design.id, total_mass_kg, h2_capacity_kg, "mass summary");

    Ok(MassSummary {
        internal_volume_l: cavity_mm3 / MM3_PER_LITRE,
        liner_mass_kg,
        composite_mass_kg,
        total_mass_kg,
        material_cost: cost,
        h2_density_kg_m3,
        h2_capacity_kg,
        gravimetric_percent,
    })
}
