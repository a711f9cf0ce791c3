//! # Design Catalog
//!
//! The `DesignCatalog` is the root container for saved tank designs. Catalogs
//! serialize to human-readable JSON (see [`crate::file_io`]).
//!
//! ## Structure
//!
//! ```text
//! DesignCatalog
//! ├── meta: CatalogMetadata (version, owner, timestamps)
//! └── designs: BTreeMap<String, TankDesign> (keyed by design id)
//! ```
//!
//! A fresh installation starts from [`DesignCatalog::reference`], which holds
//! the built-in reference designs.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::catalog::DesignCatalog;
//!
//! let catalog = DesignCatalog::reference();
//! let design = catalog.get("type4-700").unwrap();
//! assert_eq!(design.nominal_working_pressure_bar, 700.0);
//!
//! let json = serde_json::to_string_pretty(&catalog).unwrap();
//! assert!(json.contains("type4-350"));
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::design::{DomeType, LayerSpec, TankDesign, VesselGeometry, SCHEMA_VERSION};
use crate::errors::{CalcError, CalcResult};
use crate::materials::MaterialRegistry;

/// Root catalog container.
///
/// Designs are stored by id, so listing order is stable and ids are unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignCatalog {
    pub meta: CatalogMetadata,
    pub designs: BTreeMap<String, TankDesign>,
}

/// Catalog file header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub owner: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl DesignCatalog {
    /// Create an empty catalog.
    ///
    /// ```rust
    /// use tank_core::catalog::DesignCatalog;
    ///
    /// let catalog = DesignCatalog::new("Test Lab");
    /// assert!(catalog.is_empty());
    /// ```
    pub fn new(owner: impl Into<String>) -> Self {
        let now = Utc::now();
        DesignCatalog {
            meta: CatalogMetadata {
                version: SCHEMA_VERSION.to_string(),
                owner: owner.into(),
                created: now,
                modified: now,
            },
            designs: BTreeMap::new(),
        }
    }

    /// Catalog holding the built-in reference designs
    pub fn reference() -> Self {
        let mut catalog = DesignCatalog::new("reference");
        for design in reference_designs() {
            catalog.designs.insert(design.id.clone(), design);
        }
        catalog
    }

    /// Add a design, replacing any design with the same id.
    ///
    /// Returns the replaced design, if there was one.
    pub fn insert(&mut self, design: TankDesign) -> Option<TankDesign> {
        let previous = self.designs.insert(design.id.clone(), design);
        self.touch();
        previous
    }

    /// Remove a design by id.
    pub fn remove(&mut self, id: &str) -> Option<TankDesign> {
        let design = self.designs.remove(id);
        if design.is_some() {
            self.touch();
        }
        design
    }

    /// Look up a design by id
    pub fn get(&self, id: &str) -> CalcResult<&TankDesign> {
        self.designs.get(id).ok_or_else(|| CalcError::design_not_found(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.designs.contains_key(id)
    }

    /// Designs in id order
    pub fn list(&self) -> impl Iterator<Item = &TankDesign> {
        self.designs.values()
    }

    pub fn len(&self) -> usize {
        self.designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Validate every design against the registry.
    ///
    /// Also rejects entries whose map key differs from the design id, which
    /// only happens in hand-edited files.
    pub fn validate(&self, registry: &MaterialRegistry) -> CalcResult<()> {
        for (key, design) in &self.designs {
            if key != &design.id {
                return Err(CalcError::invalid_input(
                    "designs",
                    key,
                    format!("Catalog key does not match design id '{}'", design.id),
                ));
            }
            design.validate(registry)?;
        }
        Ok(())
    }
}

impl Default for DesignCatalog {
    fn default() -> Self {
        DesignCatalog::new("")
    }
}

// ============================================================================
// Reference Designs
// ============================================================================

/// Alternating helical/hoop pairs, helical first
fn alternating_layup(pairs: usize, helical_angle_deg: f64, helical_mm: f64, hoop_mm: f64, fiber: &str) -> Vec<LayerSpec> {
    (0..pairs)
        .flat_map(|pair| {
            [
                LayerSpec::helical(2 * pair, helical_angle_deg, helical_mm, fiber),
                LayerSpec::hoop(2 * pair + 1, hoop_mm, fiber),
            ]
        })
        .collect()
}

/// Built-in reference designs.
///
/// | id        | type | NWP (bar) | r_i (mm) | wall (mm) | layup                        |
/// |-----------|------|-----------|----------|-----------|------------------------------|
/// | type4-700 | IV   | 700       | 200      | 30        | 12 × (15° 1.0 mm + hoop 1.5) |
/// | type4-350 | IV   | 350       | 150      | 12        | 6 × (12° 0.8 mm + hoop 1.2)  |
/// | type3-350 | III  | 350       | 120      | 8         | 4 × (20° 0.8 mm + hoop 1.2)  |
///
/// All three are wound from T700S.
pub fn reference_designs() -> Vec<TankDesign> {
    let type4_700 = TankDesign::new(
        "Type IV 700 bar automotive",
        VesselGeometry {
            inner_radius_mm: 200.0,
            wall_thickness_mm: 30.0,
            cylinder_length_mm: 900.0,
            dome_height_mm: 120.0,
            dome_type: DomeType::Isotensoid,
            boss_od_mm: 60.0,
            boss_id_mm: 20.0,
        },
        alternating_layup(12, 15.0, 1.0, 1.5, "T700S"),
        700.0,
    )
    .with_id("type4-700")
    .with_liner("PA6", 5.0)
    .with_boss_material("AL7075-T6");

    let type4_350 = TankDesign::new(
        "Type IV 350 bar bus",
        VesselGeometry {
            inner_radius_mm: 150.0,
            wall_thickness_mm: 12.0,
            cylinder_length_mm: 1800.0,
            dome_height_mm: 90.0,
            dome_type: DomeType::Isotensoid,
            boss_od_mm: 50.0,
            boss_id_mm: 18.0,
        },
        alternating_layup(6, 12.0, 0.8, 1.2, "T700S"),
        350.0,
    )
    .with_id("type4-350")
    .with_liner("HDPE", 6.0)
    .with_boss_material("AL7075-T6");

    let type3_350 = TankDesign::new(
        "Type III 350 bar",
        VesselGeometry {
            inner_radius_mm: 120.0,
            wall_thickness_mm: 8.0,
            cylinder_length_mm: 600.0,
            dome_height_mm: 120.0,
            dome_type: DomeType::Spherical,
            boss_od_mm: 40.0,
            boss_id_mm: 16.0,
        },
        alternating_layup(4, 20.0, 0.8, 1.2, "T700S"),
        350.0,
    )
    .with_id("type3-350")
    .with_liner("AL6061-T6", 3.0)
    .with_boss_material("SS316L");

    vec![type4_700, type4_350, type3_350]
}
