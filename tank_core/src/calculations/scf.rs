//! # Stress Concentration Factors
//!
//! Amplifies a base stress state for the geometric features where membrane
//! theory underestimates stress.
//!
//! | Region     | Range     | Components scaled          |
//! |------------|-----------|----------------------------|
//! | transition | 1.5 – 2.5 | all                        |
//! | boss       | 2.0 – 3.5 | all                        |
//! | ply-drop   | 1.2 – 1.5 | shear, σ2, τ12 (matrix)    |
//!
//! A single `severity` in [0, 1] picks the point in each range; 1.0 is the
//! upper bound.

use serde::{Deserialize, Serialize};

use crate::calculations::stress::StressState;
use crate::design::{Coverage, LayerSpec, VesselGeometry};
use crate::errors::{CalcError, CalcResult};

/// Location on the vessel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    /// Cylindrical section (no amplification)
    Cylinder,
    /// Cylinder-to-dome junction
    Transition,
    /// Around the polar boss opening
    Boss,
    /// Where cylinder-only layers terminate
    PlyDrop,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Cylinder, Region::Transition, Region::Boss, Region::PlyDrop];

    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Cylinder => "cylinder",
            Region::Transition => "transition",
            Region::Boss => "boss",
            Region::PlyDrop => "ply-drop",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Range of concentration factors for one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScfRange {
    pub min: f64,
    pub max: f64,
}

impl ScfRange {
    pub const fn new(min: f64, max: f64) -> Self {
        ScfRange { min, max }
    }

    /// Factor at `severity` (0 = min, 1 = max)
    pub fn at(&self, severity: f64) -> f64 {
        self.min + severity * (self.max - self.min)
    }
}

/// `[scf]` section: factor ranges and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScfTable {
    pub transition: ScfRange,
    pub boss: ScfRange,
    pub ply_drop: ScfRange,
    pub severity: f64,
}

impl Default for ScfTable {
    fn default() -> Self {
        ScfTable {
            transition: ScfRange::new(1.5, 2.5),
            boss: ScfRange::new(2.0, 3.5),
            ply_drop: ScfRange::new(1.2, 1.5),
            severity: 1.0,
        }
    }
}

impl ScfTable {
    /// Factor applied in `region`
    pub fn factor(&self, region: Region) -> f64 {
        match region {
            Region::Cylinder => 1.0,
            Region::Transition => self.transition.at(self.severity),
            Region::Boss => self.boss.at(self.severity),
            Region::PlyDrop => self.ply_drop.at(self.severity),
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        for (key, range) in [
            ("scf.transition", self.transition),
            ("scf.boss", self.boss),
            ("scf.ply_drop", self.ply_drop),
        ] {
            if !range.min.is_finite() || !range.max.is_finite() || range.min < 1.0 || range.max < range.min {
                return Err(CalcError::config_error(key, "Range needs 1 <= min <= max"));
            }
        }
        if !(0.0..=1.0).contains(&self.severity) {
            return Err(CalcError::config_error("scf.severity", "Must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Amplify a stress state for a region.
///
/// ```rust
/// use tank_core::calculations::scf::{apply_scf, Region, ScfTable};
/// use tank_core::calculations::stress::StressState;
///
/// let base = StressState {
///     layer_index: 0, angle_deg: 15.0,
///     hoop_stress_mpa: 100.0, axial_stress_mpa: 50.0, shear_stress_mpa: 10.0,
///     sigma1_mpa: 60.0, sigma2_mpa: 90.0, tau12_mpa: 5.0,
/// };
/// let boss = apply_scf(&base, Region::Boss, &ScfTable::default());
/// assert_eq!(boss.sigma1_mpa, 60.0 * 3.5);
/// ```
pub fn apply_scf(base: &StressState, region: Region, table: &ScfTable) -> StressState {
    let k = table.factor(region);
    match region {
        Region::Cylinder | Region::Transition | Region::Boss => base.scaled(k),
        Region::PlyDrop => StressState {
            shear_stress_mpa: base.shear_stress_mpa * k,
            sigma2_mpa: base.sigma2_mpa * k,
            tau12_mpa: base.tau12_mpa * k,
            ..*base
        },
    }
}

/// One layer evaluated in one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionStress {
    pub region: Region,
    pub factor: f64,
    pub state: StressState,
}

/// Regions that apply to a layer of this design
pub fn regions_for_layer(layer: &LayerSpec, layers: &[LayerSpec], geometry: &VesselGeometry) -> Vec<Region> {
    let mut regions = vec![Region::Cylinder];
    if layer.coverage == Coverage::Full {
        regions.push(Region::Transition);
        if geometry.has_boss() {
            regions.push(Region::Boss);
        }
    }
    if layers.iter().any(|l| l.coverage == Coverage::CylinderOnly) {
        regions.push(Region::PlyDrop);
    }
    regions
}

/// Evaluate every applicable region for every layer.
///
/// `states` and `layers` must be in the same order.
pub fn scan_regions(
    states: &[StressState],
    layers: &[LayerSpec],
    geometry: &VesselGeometry,
    table: &ScfTable,
) -> Vec<RegionStress> {
    states
        .iter()
        .zip(layers)
        .flat_map(|(state, layer)| {
            regions_for_layer(layer, layers, geometry)
                .into_iter()
                .map(move |region| RegionStress {
                    region,
                    factor: table.factor(region),
                    state: apply_scf(state, region, table),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn base() -> StressState {
        StressState {
            layer_index: 3,
            angle_deg: 15.0,
            hoop_stress_mpa: 200.0,
            axial_stress_mpa: 400.0,
            shear_stress_mpa: 80.0,
            sigma1_mpa: 500.0,
            sigma2_mpa: 60.0,
            tau12_mpa: -10.0,
        }
    }

    #[test]
    fn test_default_factors_are_upper_bounds() {
        let table = ScfTable::default();
        assert_eq!(table.factor(Region::Transition), 2.5);
        assert_eq!(table.factor(Region::Boss), 3.5);
        assert_eq!(table.factor(Region::PlyDrop), 1.5);
        assert_eq!(table.factor(Region::Cylinder), 1.0);

        let mild = ScfTable { severity: 0.0, ..ScfTable::default() };
        for region in Region::ALL {
            assert!(mild.factor(region) >= 1.0, "{} below unity", region);
            assert!(mild.factor(region) <= table.factor(region));
        }
    }

    #[test]
    fn test_severity_interpolates() {
        let table = ScfTable {
            severity: 0.0,
            ..ScfTable::default()
        };
        assert_eq!(table.factor(Region::Boss), 2.0);
        let table = ScfTable {
            severity: 0.5,
            ..ScfTable::default()
        };
        assert_relative_eq!(table.factor(Region::Transition), 2.0);
    }

    #[test]
    fn test_transition_scales_everything() {
        let out = apply_scf(&base(), Region::Transition, &ScfTable::default());
        assert_eq!(out.sigma1_mpa, 1250.0);
        assert_eq!(out.sigma2_mpa, 150.0);
        assert_eq!(out.hoop_stress_mpa, 500.0);
        assert_eq!(out.layer_index, 3);
    }

    #[test]
    fn test_ply_drop_scales_matrix_components_only() {
        let out = apply_scf(&base(), Region::PlyDrop, &ScfTable::default());
        assert_eq!(out.sigma1_mpa, 500.0);
        assert_eq!(out.hoop_stress_mpa, 200.0);
        assert_eq!(out.sigma2_mpa, 90.0);
        assert_eq!(out.tau12_mpa, -15.0);
        assert_eq!(out.shear_stress_mpa, 120.0);
    }

    #[test]
    fn test_table_validation() {
        assert!(ScfTable::default().validate().is_ok());
        let bad = ScfTable {
            severity: 1.5,
            ..ScfTable::default()
        };
        assert!(bad.validate().is_err());
        let bad = ScfTable {
            boss: ScfRange::new(3.0, 2.0),
            ..ScfTable::default()
        };
        assert!(bad.validate().is_err());
        let bad = ScfTable {
            ply_drop: ScfRange::new(0.5, 1.5),
            ..ScfTable::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_region_scan_respects_coverage_and_boss() {
        let layers = vec![
            LayerSpec::helical(0, 15.0, 1.0, "T700S"),
            LayerSpec::hoop(1, 1.5, "T700S"),
        ];
        let mut geometry = VesselGeometry::cylinder(200.0, 2.5, 800.0);
        assert_eq!(
            regions_for_layer(&layers[0], &layers, &geometry),
            vec![Region::Cylinder, Region::Transition, Region::PlyDrop]
        );
        assert_eq!(
            regions_for_layer(&layers[1], &layers, &geometry),
            vec![Region::Cylinder, Region::PlyDrop]
        );

        geometry.boss_od_mm = 60.0;
        geometry.boss_id_mm = 20.0;
        let states = [base(), base()];
        let scan = scan_regions(&states, &layers, &geometry, &ScfTable::default());
        assert_eq!(scan.len(), 6);
        assert!(scan.iter().any(|r| r.region == Region::Boss && r.state.sigma1_mpa == 1750.0));
    }

    #[test]
    fn test_region_serialization() {
        assert_eq!(serde_json::to_string(&Region::PlyDrop).unwrap(), "\"ply-drop\"");
    }
}
