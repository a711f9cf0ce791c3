//! # Vessel Design Records
//!
//! Geometry, layup and load definitions for a filament-wound pressure vessel.
//!
//! ```text
//! TankDesign
//! ├── meta: DesignMetadata (schema version, author, timestamps)
//! ├── geometry: VesselGeometry (radius, wall, cylinder, domes, boss)
//! ├── layers: Vec<LayerSpec> (inner → outer stacking order)
//! ├── liner: Option<LinerSpec>
//! └── nominal_working_pressure_bar
//! ```
//!
//! The composite wall starts at `inner_radius_mm`; the liner sits inside it.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::design::{LayerSpec, LoadCase, VesselGeometry};
//!
//! let geometry = VesselGeometry::cylinder(200.0, 20.0, 800.0);
//! let layers = vec![
//!     LayerSpec::helical(0, 15.0, 1.0, "T700S"),
//!     LayerSpec::hoop(1, 1.5, "T700S"),
//! ];
//! let load = LoadCase::operating(700.0);
//! assert!(geometry.validate().is_ok());
//! assert!(load.validate().is_ok());
//! assert_eq!(layers.len(), 2);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{require_finite, require_positive, CalcError, CalcResult};
use crate::materials::{MaterialKind, MaterialRegistry};
use crate::units::bar_to_mpa;

/// Current schema version for design files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Winding angle used by [`LayerSpec::hoop`]
pub const DEFAULT_HOOP_ANGLE_DEG: f64 = 89.0;

/// Thin-wall theory is considered valid above this radius/thickness ratio
pub const RECOMMENDED_RADIUS_THICKNESS_RATIO: f64 = 10.0;

// ============================================================================
// Layers
// ============================================================================

/// Filament winding pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindingType {
    /// Balanced ±θ helical pass, covers cylinder and domes
    Helical,
    /// Circumferential pass (θ ≈ 90°), carries hoop load only
    Hoop,
}

impl WindingType {
    pub fn display_name(&self) -> &'static str {
        match self {
            WindingType::Helical => "helical",
            WindingType::Hoop => "hoop",
        }
    }
}

impl std::fmt::Display for WindingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Which part of the vessel a layer covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Coverage {
    /// Cylinder and both domes
    #[default]
    Full,
    /// Cylinder only (typical for hoop layers)
    CylinderOnly,
}

/// One composite ply in the stack.
///
/// ## JSON Example
///
/// ```json
/// {
///   "layer_index": 0,
///   "winding_type": "helical",
///   "angle_deg": 15.0,
///   "thickness_mm": 1.0,
///   "coverage": "full",
///   "material_id": "T700S"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Position in the stack (0 = innermost)
    pub layer_index: usize,
    pub winding_type: WindingType,
    /// Winding angle measured from the vessel axis (degrees, 0..=90)
    pub angle_deg: f64,
    pub thickness_mm: f64,
    #[serde(default)]
    pub coverage: Coverage,
    pub material_id: String,
}

impl LayerSpec {
    /// Helical layer covering the full vessel
    pub fn helical(layer_index: usize, angle_deg: f64, thickness_mm: f64, material_id: impl Into<String>) -> Self {
        LayerSpec {
            layer_index,
            winding_type: WindingType::Helical,
            angle_deg,
            thickness_mm,
            coverage: Coverage::Full,
            material_id: material_id.into(),
        }
    }

    /// Hoop layer on the cylinder
    pub fn hoop(layer_index: usize, thickness_mm: f64, material_id: impl Into<String>) -> Self {
        LayerSpec {
            layer_index,
            winding_type: WindingType::Hoop,
            angle_deg: DEFAULT_HOOP_ANGLE_DEG,
            thickness_mm,
            coverage: Coverage::CylinderOnly,
            material_id: material_id.into(),
        }
    }

    /// Validate a single layer (material existence is checked by [`validate_layup`]).
    pub fn validate(&self) -> CalcResult<()> {
        let field = format!("layers[{}].angle_deg", self.layer_index);
        require_finite(&field, self.angle_deg)?;
        if !(0.0..=90.0).contains(&self.angle_deg) {
            return Err(CalcError::invalid_input(
                field,
                self.angle_deg.to_string(),
                "Winding angle must be within [0, 90] degrees",
            ));
        }
        require_positive(&format!("layers[{}].thickness_mm", self.layer_index), self.thickness_mm)?;
        Ok(())
    }

    /// Short label used in reports, e.g. "layer 3 (helical 15°)"
    pub fn label(&self) -> String {
        format!("layer {} ({} {}°)", self.layer_index, self.winding_type, self.angle_deg)
    }
}

/// Validate a layup against the registry.
///
/// Rejects empty stacks, bad angles/thicknesses and layers whose material is
/// missing or not a fiber system.
pub fn validate_layup(layers: &[LayerSpec], registry: &MaterialRegistry) -> CalcResult<()> {
    if layers.is_empty() {
        return Err(CalcError::invalid_input("layers", "[]", "At least one layer is required"));
    }
    for layer in layers {
        layer.validate()?;
        let material = registry.get(&layer.material_id)?;
        if material.kind != MaterialKind::Fiber {
            return Err(CalcError::invalid_input(
                format!("layers[{}].material_id", layer.layer_index),
                &layer.material_id,
                format!("Wound layers need a fiber system, got {}", material.kind),
            ));
        }
    }
    Ok(())
}

/// Total thickness of a layup (mm)
pub fn layup_thickness_mm(layers: &[LayerSpec]) -> f64 {
    layers.iter().map(|l| l.thickness_mm).sum()
}

// ============================================================================
// Geometry
// ============================================================================

/// Dome profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DomeType {
    /// Spherical cap
    Spherical,
    /// Fiber-path optimised profile (approximated as a semi-ellipsoid)
    #[default]
    Isotensoid,
}

/// Vessel geometry (all dimensions in mm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselGeometry {
    /// Inner radius of the load-bearing composite wall
    pub inner_radius_mm: f64,
    /// Composite wall thickness
    pub wall_thickness_mm: f64,
    pub cylinder_length_mm: f64,
    pub dome_height_mm: f64,
    #[serde(default)]
    pub dome_type: DomeType,
    /// Boss outer diameter (0 = no boss)
    #[serde(default)]
    pub boss_od_mm: f64,
    /// Boss port diameter
    #[serde(default)]
    pub boss_id_mm: f64,
}

impl VesselGeometry {
    /// Plain cylinder with hemispherical-height isotensoid domes and no boss
    pub fn cylinder(inner_radius_mm: f64, wall_thickness_mm: f64, cylinder_length_mm: f64) -> Self {
        VesselGeometry {
            inner_radius_mm,
            wall_thickness_mm,
            cylinder_length_mm,
            dome_height_mm: inner_radius_mm * 0.6,
            dome_type: DomeType::Isotensoid,
            boss_od_mm: 0.0,
            boss_id_mm: 0.0,
        }
    }

    /// Validate dimensions.
    ///
    /// The thin-wall ratio is advisory only; see [`Self::is_thin_wall`].
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("inner_radius_mm", self.inner_radius_mm)?;
        require_positive("wall_thickness_mm", self.wall_thickness_mm)?;
        require_finite("cylinder_length_mm", self.cylinder_length_mm)?;
        require_finite("dome_height_mm", self.dome_height_mm)?;
        require_finite("boss_od_mm", self.boss_od_mm)?;
        require_finite("boss_id_mm", self.boss_id_mm)?;
        if self.cylinder_length_mm < 0.0 {
            return Err(CalcError::invalid_input(
                "cylinder_length_mm",
                self.cylinder_length_mm.to_string(),
                "Cylinder length must not be negative",
            ));
        }
        if self.dome_height_mm < 0.0 || self.dome_height_mm > self.inner_radius_mm * 2.0 {
            return Err(CalcError::invalid_input(
                "dome_height_mm",
                self.dome_height_mm.to_string(),
                "Dome height must be between 0 and the vessel diameter",
            ));
        }
        if self.boss_od_mm < 0.0 || self.boss_id_mm < 0.0 {
            return Err(CalcError::invalid_input(
                "boss_od_mm",
                self.boss_od_mm.to_string(),
                "Boss diameters must not be negative",
            ));
        }
        if self.has_boss() && self.boss_id_mm >= self.boss_od_mm {
            return Err(CalcError::invalid_input(
                "boss_id_mm",
                self.boss_id_mm.to_string(),
                "Boss port must be smaller than the boss outer diameter",
            ));
        }
        if self.boss_od_mm >= self.inner_radius_mm * 2.0 {
            return Err(CalcError::invalid_input(
                "boss_od_mm",
                self.boss_od_mm.to_string(),
                "Boss must be smaller than the vessel diameter",
            ));
        }
        Ok(())
    }

    /// Mid-wall radius R = r_i + t/2
    pub fn mean_radius_mm(&self) -> f64 {
        self.inner_radius_mm + self.wall_thickness_mm / 2.0
    }

    pub fn outer_radius_mm(&self) -> f64 {
        self.inner_radius_mm + self.wall_thickness_mm
    }

    /// r_i / t
    pub fn radius_thickness_ratio(&self) -> f64 {
        self.inner_radius_mm / self.wall_thickness_mm
    }

    /// Whether the geometry sits in the thin-wall range
    pub fn is_thin_wall(&self, min_ratio: f64) -> bool {
        self.radius_thickness_ratio() >= min_ratio
    }

    pub fn has_boss(&self) -> bool {
        self.boss_od_mm > 0.0
    }

    /// Overall length including both domes (outer surface)
    pub fn overall_length_mm(&self) -> f64 {
        self.cylinder_length_mm + 2.0 * (self.dome_height_mm + self.wall_thickness_mm)
    }
}

// ============================================================================
// Load Cases
// ============================================================================

/// Load case category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadCaseType {
    /// Nominal working pressure
    #[default]
    Operating,
    /// Burst test pressure
    Burst,
    /// Fatigue cycling peak pressure
    Cyclic,
}

impl LoadCaseType {
    pub fn display_name(&self) -> &'static str {
        match self {
            LoadCaseType::Operating => "operating",
            LoadCaseType::Burst => "burst",
            LoadCaseType::Cyclic => "cyclic",
        }
    }
}

/// Pressure load applied to the vessel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    pub pressure_bar: f64,
    #[serde(default = "default_temperature_c")]
    pub temperature_c: f64,
    #[serde(default)]
    pub case_type: LoadCaseType,
}

fn default_temperature_c() -> f64 {
    15.0
}

impl LoadCase {
    pub fn new(pressure_bar: f64, case_type: LoadCaseType) -> Self {
        LoadCase {
            pressure_bar,
            temperature_c: default_temperature_c(),
            case_type,
        }
    }

    pub fn operating(pressure_bar: f64) -> Self {
        Self::new(pressure_bar, LoadCaseType::Operating)
    }

    /// Burst test case at `ratio` times the working pressure
    pub fn burst(nominal_working_pressure_bar: f64, ratio: f64) -> Self {
        Self::new(nominal_working_pressure_bar * ratio, LoadCaseType::Burst)
    }

    /// Builder: set temperature
    pub fn with_temperature(mut self, temperature_c: f64) -> Self {
        self.temperature_c = temperature_c;
        self
    }

    pub fn validate(&self) -> CalcResult<()> {
        require_finite("pressure_bar", self.pressure_bar)?;
        if self.pressure_bar < 0.0 {
            return Err(CalcError::invalid_input(
                "pressure_bar",
                self.pressure_bar.to_string(),
                "Pressure must not be negative",
            ));
        }
        require_finite("temperature_c", self.temperature_c)?;
        if !(-273.15..=500.0).contains(&self.temperature_c) {
            return Err(CalcError::invalid_input(
                "temperature_c",
                self.temperature_c.to_string(),
                "Temperature must be between -273.15 and 500 °C",
            ));
        }
        Ok(())
    }

    /// Pressure in MPa
    pub fn pressure_mpa(&self) -> f64 {
        bar_to_mpa(self.pressure_bar)
    }
}

// ============================================================================
// Design Record
// ============================================================================

/// Liner definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinerSpec {
    pub material_id: String,
    pub thickness_mm: f64,
}

/// Design file header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub author: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl DesignMetadata {
    pub fn new(author: impl Into<String>) -> Self {
        let now = Utc::now();
        DesignMetadata {
            version: SCHEMA_VERSION.to_string(),
            author: author.into(),
            created: now,
            modified: now,
        }
    }
}

/// A complete tank design record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankDesign {
    pub id: String,
    pub name: String,
    pub meta: DesignMetadata,
    pub geometry: VesselGeometry,
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub liner: Option<LinerSpec>,
    #[serde(default)]
    pub boss_material_id: Option<String>,
    pub nominal_working_pressure_bar: f64,
}

impl TankDesign {
    /// New design with a generated id
    pub fn new(
        name: impl Into<String>,
        geometry: VesselGeometry,
        layers: Vec<LayerSpec>,
        nominal_working_pressure_bar: f64,
    ) -> Self {
        TankDesign {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            meta: DesignMetadata::new(""),
            geometry,
            layers,
            liner: None,
            boss_material_id: None,
            nominal_working_pressure_bar,
        }
    }

    /// Builder: set a fixed id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder: set the liner
    pub fn with_liner(mut self, material_id: impl Into<String>, thickness_mm: f64) -> Self {
        self.liner = Some(LinerSpec {
            material_id: material_id.into(),
            thickness_mm,
        });
        self
    }

    /// Builder: set the boss material
    pub fn with_boss_material(mut self, material_id: impl Into<String>) -> Self {
        self.boss_material_id = Some(material_id.into());
        self
    }

    /// Builder: set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.meta.author = author.into();
        self
    }

    /// Operating load case at the nominal working pressure
    pub fn operating_load(&self) -> LoadCase {
        LoadCase::operating(self.nominal_working_pressure_bar)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Validate the whole record against the registry.
    pub fn validate(&self, registry: &MaterialRegistry) -> CalcResult<()> {
        if self.id.trim().is_empty() {
            return Err(CalcError::invalid_input("id", &self.id, "Design id must not be empty"));
        }
        self.geometry.validate()?;
        validate_layup(&self.layers, registry)?;
        require_positive("nominal_working_pressure_bar", self.nominal_working_pressure_bar)?;
        if let Some(liner) = &self.liner {
            require_positive("liner.thickness_mm", liner.thickness_mm)?;
            if liner.thickness_mm >= self.geometry.inner_radius_mm {
                return Err(CalcError::invalid_input(
                    "liner.thickness_mm",
                    liner.thickness_mm.to_string(),
                    "Liner is thicker than the vessel radius",
                ));
            }
            expect_kind(registry, &liner.material_id, MaterialKind::Liner, "liner.material_id")?;
        }
        if let Some(boss) = &self.boss_material_id {
            expect_kind(registry, boss, MaterialKind::Boss, "boss_material_id")?;
        }
        Ok(())
    }

    /// Radius of the gas cavity (inside the liner)
    pub fn cavity_radius_mm(&self) -> f64 {
        let liner = self.liner.as_ref().map(|l| l.thickness_mm).unwrap_or(0.0);
        self.geometry.inner_radius_mm - liner
    }
}

fn expect_kind(registry: &MaterialRegistry, id: &str, kind: MaterialKind, field: &str) -> CalcResult<()> {
    let material = registry.get(id)?;
    if material.kind != kind {
        return Err(CalcError::invalid_input(
            field,
            id,
            format!("Expected a {} material, got {}", kind, material.kind),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layup() -> Vec<LayerSpec> {
        vec![
            LayerSpec::helical(0, 15.0, 1.0, "T700S"),
            LayerSpec::hoop(1, 1.5, "T700S"),
        ]
    }

    #[test]
    fn test_geometry_helpers() {
        let g = VesselGeometry::cylinder(200.0, 20.0, 800.0);
        assert_eq!(g.mean_radius_mm(), 210.0);
        assert_eq!(g.outer_radius_mm(), 220.0);
        assert_eq!(g.radius_thickness_ratio(), 10.0);
        assert!(g.is_thin_wall(RECOMMENDED_RADIUS_THICKNESS_RATIO));
        assert!(!g.has_boss());
    }

    #[test]
    fn test_geometry_validation() {
        let mut g = VesselGeometry::cylinder(200.0, 20.0, 800.0);
        assert!(g.validate().is_ok());

        g.inner_radius_mm = 0.0;
        assert!(g.validate().is_err());

        let mut g = VesselGeometry::cylinder(200.0, -1.0, 800.0);
        assert!(g.validate().is_err());
        g.wall_thickness_mm = f64::NAN;
        assert!(g.validate().is_err());

        let mut g = VesselGeometry::cylinder(200.0, 20.0, 800.0);
        g.boss_od_mm = 40.0;
        g.boss_id_mm = 50.0;
        assert!(g.validate().is_err());
    }

    #[test]
    fn test_thick_wall_is_not_rejected() {
        // R/t = 5 is outside the thin-wall range but still accepted
        let g = VesselGeometry::cylinder(75.0, 15.0, 300.0);
        assert!(g.validate().is_ok());
        assert!(!g.is_thin_wall(RECOMMENDED_RADIUS_THICKNESS_RATIO));
    }

    #[test]
    fn test_layer_angle_bounds() {
        assert!(LayerSpec::helical(0, -1.0, 1.0, "T700S").validate().is_err());
        assert!(LayerSpec::helical(0, 90.5, 1.0, "T700S").validate().is_err());
        assert!(LayerSpec::helical(0, 0.0, 1.0, "T700S").validate().is_ok());
        assert!(LayerSpec::helical(0, 90.0, 1.0, "T700S").validate().is_ok());
        assert!(LayerSpec::helical(0, 15.0, 0.0, "T700S").validate().is_err());
    }

    #[test]
    fn test_validate_layup() {
        let registry = MaterialRegistry::standard();
        assert!(validate_layup(&layup(), &registry).is_ok());

        let err = validate_layup(&[], &registry).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let bad = vec![LayerSpec::helical(0, 15.0, 1.0, "HDPE")];
        assert!(validate_layup(&bad, &registry).is_err());

        let missing = vec![LayerSpec::helical(0, 15.0, 1.0, "NOPE")];
        assert_eq!(
            validate_layup(&missing, &registry).unwrap_err().error_code(),
            "MATERIAL_NOT_FOUND"
        );
    }

    #[test]
    fn test_load_case_validation() {
        assert!(LoadCase::operating(700.0).validate().is_ok());
        assert!(LoadCase::operating(0.0).validate().is_ok());
        assert!(LoadCase::operating(-1.0).validate().is_err());
        assert!(LoadCase::operating(700.0).with_temperature(-300.0).validate().is_err());
        let burst = LoadCase::burst(700.0, 2.25);
        assert_eq!(burst.pressure_bar, 1575.0);
        assert_eq!(burst.case_type, LoadCaseType::Burst);
        assert!((LoadCase::operating(700.0).pressure_mpa() - 70.0).abs() < 1e-12);
    }

    #[test]
    fn test_design_validation() {
        let registry = MaterialRegistry::standard();
        let design = TankDesign::new("Test", VesselGeometry::cylinder(200.0, 2.5, 800.0), layup(), 700.0)
            .with_liner("PA6", 5.0)
            .with_boss_material("AL7075-T6");
        assert!(design.validate(&registry).is_ok());
        assert_eq!(design.cavity_radius_mm(), 195.0);

        let wrong_liner = design.clone().with_liner("T700S", 5.0);
        assert!(wrong_liner.validate(&registry).is_err());

        let wrong_boss = design.clone().with_boss_material("HDPE");
        assert!(wrong_boss.validate(&registry).is_err());
    }

    #[test]
    fn test_design_serialization() {
        let design = TankDesign::new("Test", VesselGeometry::cylinder(200.0, 2.5, 800.0), layup(), 700.0)
            .with_id("test-1");
        let json = serde_json::to_string_pretty(&design).unwrap();
        assert!(json.contains("\"winding_type\": \"helical\""));
        assert!(json.contains("\"coverage\": \"cylinder-only\""));
        let roundtrip: TankDesign = serde_json::from_str(&json).unwrap();
        assert_eq!(design, roundtrip);
    }

    #[test]
    fn test_layer_defaults_when_deserializing() {
        let json = r#"{"layer_index": 2, "winding_type": "hoop", "angle_deg": 90.0,
                       "thickness_mm": 1.2, "material_id": "T800H"}"#;
        let layer: LayerSpec = serde_json::from_str(json).unwrap();
        assert_eq!(layer.coverage, Coverage::Full);
        assert_eq!(layup_thickness_mm(&[layer]), 1.2);
    }
}
