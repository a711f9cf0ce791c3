//! # tank_core - Composite Pressure Vessel Calculation Engine
//!
//! `tank_core` is the engineering library behind the H2 tank designer: thin-wall
//! and laminate stresses, Tsai-Wu and Hashin failure criteria, stress
//! concentrations and Monte Carlo reliability for filament-wound Type III/IV
//! hydrogen vessels. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **Explicit data**: Materials come from a [`MaterialRegistry`] passed by reference
//! - **Reproducible**: Monte Carlo runs are bit-for-bit repeatable for a seed
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use tank_core::calculations::stress::compute_layer_stresses;
//! use tank_core::catalog::reference_designs;
//! use tank_core::config::AnalysisConfig;
//! use tank_core::materials::MaterialRegistry;
//!
//! let registry = MaterialRegistry::standard();
//! let config = AnalysisConfig::default();
//! let design = &reference_designs()[0];
//!
//! let states = compute_layer_stresses(
//!     &design.geometry, &design.layers, &design.operating_load(), &registry, &config.stress,
//! ).unwrap();
//! assert_eq!(states.len(), design.layers.len());
//! ```
//!
//! ## Modules
//!
//! - [`design`] - Geometry, layers, load cases and the design record
//! - [`materials`] - Material properties and the registry
//! - [`equations`] - Closed-form vessel and lamina formulas
//! - [`calculations`] - Stress, failure, SCF, reliability and mass
//! - [`config`] - TOML analysis configuration
//! - [`catalog`] - Design catalog and reference designs
//! - [`api`] - JSON reports by design id
//! - [`units`] - Type-safe unit wrappers and formatting
//! - [`errors`] - Structured error types
//! - [`file_io`] - Atomic JSON saves and version-checked loads

pub mod api;
pub mod calculations;
pub mod catalog;
pub mod config;
pub mod design;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod materials;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use api::ReportContext;
pub use catalog::DesignCatalog;
pub use config::AnalysisConfig;
pub use design::{LayerSpec, LoadCase, TankDesign, VesselGeometry};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_catalog, load_design, save_catalog, save_design};
pub use materials::{MaterialProperties, MaterialRegistry};
