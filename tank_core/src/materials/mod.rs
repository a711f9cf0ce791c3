//! # Materials Database
//!
//! Material definitions and property lookups for filament-wound pressure vessels.
//!
//! ## Material Kinds
//!
//! - **Fiber**: unidirectional fiber/resin ply (orthotropic lamina properties)
//! - **Resin**: matrix systems
//! - **Liner**: gas barrier (polymer for Type IV, aluminium for Type III)
//! - **Boss**: metallic port fittings
//!
//! The registry is built once at startup and handed to every solver by
//! reference. It is never mutated after construction.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::materials::MaterialRegistry;
//!
//! let registry = MaterialRegistry::standard();
//! let ply = registry.get("T700S").unwrap();
//! println!("E1 = {} MPa, Xt = {} MPa", ply.e1_mpa, ply.xt_mpa);
//! ```

pub mod catalog;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{require_positive, CalcError, CalcResult};

/// Material category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Fiber,
    Resin,
    Liner,
    Boss,
}

impl MaterialKind {
    /// All kinds in display order
    pub const ALL: [MaterialKind; 4] = [
        MaterialKind::Fiber,
        MaterialKind::Resin,
        MaterialKind::Liner,
        MaterialKind::Boss,
    ];

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialKind::Fiber => "Fiber",
            MaterialKind::Resin => "Resin",
            MaterialKind::Liner => "Liner",
            MaterialKind::Boss => "Boss",
        }
    }
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Elastic and strength properties of one material.
///
/// Directions 1 and 2 are the fiber and transverse directions of a ply. For
/// isotropic materials both directions carry the same values.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "T700S", "kind": "fiber", "name": "Toray T700S / epoxy",
///   "e1_mpa": 135000.0, "e2_mpa": 9500.0, "g12_mpa": 5000.0, "nu12": 0.3,
///   "xt_mpa": 2550.0, "xc_mpa": 1470.0, "yt_mpa": 69.0, "yc_mpa": 220.0, "s_mpa": 100.0,
///   "density_kg_m3": 1570.0, "cost_per_kg": 30.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Registry key (e.g., "T700S")
    pub id: String,
    /// Material category
    pub kind: MaterialKind,
    /// Display name
    pub name: String,
    /// Longitudinal modulus E1 (MPa)
    pub e1_mpa: f64,
    /// Transverse modulus E2 (MPa)
    pub e2_mpa: f64,
    /// In-plane shear modulus G12 (MPa)
    pub g12_mpa: f64,
    /// Major Poisson ratio ν12
    pub nu12: f64,
    /// Longitudinal tensile strength Xt (MPa)
    pub xt_mpa: f64,
    /// Longitudinal compressive strength Xc (MPa, positive)
    pub xc_mpa: f64,
    /// Transverse tensile strength Yt (MPa)
    pub yt_mpa: f64,
    /// Transverse compressive strength Yc (MPa, positive)
    pub yc_mpa: f64,
    /// In-plane shear strength S (MPa)
    pub s_mpa: f64,
    /// Density (kg/m³)
    pub density_kg_m3: f64,
    /// Cost (USD/kg)
    pub cost_per_kg: f64,
}

impl MaterialProperties {
    /// Reject non-physical property sets.
    pub fn validate(&self) -> CalcResult<()> {
        if self.id.trim().is_empty() {
            return Err(CalcError::invalid_input("id", &self.id, "Material id must not be empty"));
        }
        let positive = [
            ("e1_mpa", self.e1_mpa),
            ("e2_mpa", self.e2_mpa),
            ("g12_mpa", self.g12_mpa),
            ("xt_mpa", self.xt_mpa),
            ("xc_mpa", self.xc_mpa),
            ("yt_mpa", self.yt_mpa),
            ("yc_mpa", self.yc_mpa),
            ("s_mpa", self.s_mpa),
            ("density_kg_m3", self.density_kg_m3),
        ];
        for (field, value) in positive {
            require_positive(&format!("{}.{}", self.id, field), value)?;
        }
        if !(0.0..1.0).contains(&self.nu12) {
            return Err(CalcError::invalid_input(
                format!("{}.nu12", self.id),
                self.nu12.to_string(),
                "Poisson ratio must be in [0, 1)",
            ));
        }
        if !self.cost_per_kg.is_finite() || self.cost_per_kg < 0.0 {
            return Err(CalcError::invalid_input(
                format!("{}.cost_per_kg", self.id),
                self.cost_per_kg.to_string(),
                "Cost must be a non-negative number",
            ));
        }
        Ok(())
    }

    /// Minor Poisson ratio ν21 = ν12·E2/E1
    pub fn nu21(&self) -> f64 {
        self.nu12 * self.e2_mpa / self.e1_mpa
    }

    /// Check if this material can be used as a wound layer
    pub fn is_windable(&self) -> bool {
        self.kind == MaterialKind::Fiber
    }
}

/// On-disk layout for custom catalogs:
///
/// ```toml
/// [[material]]
/// id = "M40J"
/// kind = "fiber"
/// # ...
/// ```
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    material: Vec<MaterialProperties>,
}

/// Immutable material lookup keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialRegistry {
    materials: BTreeMap<String, MaterialProperties>,
}

impl MaterialRegistry {
    /// Registry holding the standard catalog
    pub fn standard() -> Self {
        let mut materials = BTreeMap::new();
        for mat in catalog::standard_materials() {
            materials.insert(mat.id.clone(), mat);
        }
        MaterialRegistry { materials }
    }

    /// Build a registry from an explicit list, validating every entry.
    ///
    /// Duplicate ids are rejected.
    pub fn from_materials(list: impl IntoIterator<Item = MaterialProperties>) -> CalcResult<Self> {
        let mut materials = BTreeMap::new();
        for mat in list {
            mat.validate()?;
            if materials.contains_key(&mat.id) {
                return Err(CalcError::invalid_input("id", &mat.id, "Duplicate material id"));
            }
            materials.insert(mat.id.clone(), mat);
        }
        Ok(MaterialRegistry { materials })
    }

    /// Parse a TOML catalog (`[[material]]` tables).
    pub fn from_toml_str(content: &str) -> CalcResult<Self> {
        let file: CatalogFile = toml::from_str(content).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid material catalog: {}", e),
        })?;
        Self::from_materials(file.material)
    }

    /// Standard catalog extended (or overridden) by a TOML file.
    pub fn standard_with_file(path: &Path) -> CalcResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
        let custom = Self::from_toml_str(&content)?;
        let mut registry = Self::standard();
        for mat in custom.materials.into_values() {
            registry = registry.with_material(mat)?;
        }
        Ok(registry)
    }

    /// Consume the registry and return one with `material` added or replaced.
    ///
    /// Only meant for startup assembly; solvers receive `&MaterialRegistry`.
    pub fn with_material(mut self, material: MaterialProperties) -> CalcResult<Self> {
        material.validate()?;
        self.materials.insert(material.id.clone(), material);
        Ok(self)
    }

    /// Look up a material by id
    pub fn get(&self, id: &str) -> CalcResult<&MaterialProperties> {
        self.materials
            .get(id)
            .ok_or_else(|| CalcError::material_not_found(id))
    }

    /// Check whether an id exists
    pub fn contains(&self, id: &str) -> bool {
        self.materials.contains_key(id)
    }

    /// All materials in id order
    pub fn iter(&self) -> impl Iterator<Item = &MaterialProperties> {
        self.materials.values()
    }

    /// All materials of one kind, in id order
    pub fn by_kind(&self, kind: MaterialKind) -> Vec<&MaterialProperties> {
        self.materials.values().filter(|m| m.kind == kind).collect()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
