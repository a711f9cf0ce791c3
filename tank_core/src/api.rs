//! # Design Reports
//!
//! JSON-ready reports for a design looked up by id. These are what a request
//! handler (or the CLI) returns for the stress, failure and reliability
//! endpoints.
//!
//! A [`ReportContext`] bundles the design catalog, the material registry and
//! the analysis configuration. It holds references only; build it once at
//! startup and share it.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::api::ReportContext;
//! use tank_core::catalog::DesignCatalog;
//! use tank_core::config::AnalysisConfig;
//! use tank_core::materials::MaterialRegistry;
//!
//! let catalog = DesignCatalog::reference();
//! let registry = MaterialRegistry::standard();
//! let config = AnalysisConfig::default();
//! let ctx = ReportContext::new(&catalog, &registry, &config);
//!
//! let report = ctx.stress_report("type4-350").unwrap();
//! assert_eq!(report.design_id, "type4-350");
//! assert_eq!(report.per_layer_stress.len(), 12);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::failure::{
    burst_pressure, evaluate_laminate, progressive_failure, tsai_wu_index, BurstEstimate, FailureMode,
    FailureResult, ProgressiveStep,
};
use crate::calculations::mass::{mass_summary, MassSummary};
use crate::calculations::reliability::{run_monte_carlo, Interval, ReliabilityInput};
use crate::calculations::scf::{scan_regions, Region, RegionStress};
use crate::calculations::stress::{analyze_laminate, NominalStress, StressState};
use crate::catalog::DesignCatalog;
use crate::config::{AnalysisConfig, BurstCriterion};
use crate::design::{LoadCase, TankDesign};
use crate::errors::{CalcError, CalcResult};
use crate::materials::MaterialRegistry;
use crate::units::{format_percent, format_pressure, format_stress};

/// Shared inputs for every report
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub catalog: &'a DesignCatalog,
    pub registry: &'a MaterialRegistry,
    pub config: &'a AnalysisConfig,
}

// ============================================================================
// Stress
// ============================================================================

/// Which allowable governs the peak stress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StressType {
    FiberTension,
    FiberCompression,
}

/// Peak fiber-direction stress over all layers and regions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxStress {
    pub value_mpa: f64,
    /// Human-readable layer description
    pub location: String,
    pub layer_index: usize,
    pub region: Region,
    /// Xt for tension, Xc for compression
    pub allowable_mpa: f64,
    /// (1 − |value| / allowable) × 100
    pub margin_percent: f64,
}

/// Stress report for one load case.
///
/// ## JSON Example
///
/// ```json
/// {
///   "design_id": "type4-700",
///   "load_case": { "pressure_bar": 700.0, "temperature_c": 15.0, "case_type": "operating" },
///   "load_pressure_bar": 700.0,
///   "stress_type": "fiber-tension",
///   "max_stress": {
///     "value_mpa": 2339.9,
///     "location": "layer 0 (helical 15°)",
///     "layer_index": 0,
///     "region": "boss",
///     "allowable_mpa": 2550.0,
///     "margin_percent": 8.2
///   },
///   "per_layer_stress": [ ... ],
///   "region_stress": [ ... ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressReport {
    pub design_id: String,
    pub load_case: LoadCase,
    pub load_pressure_bar: f64,
    pub stress_type: StressType,
    pub max_stress: MaxStress,
    pub nominal: NominalStress,
    pub thin_wall_valid: bool,
    /// Cylinder stresses, inner → outer
    pub per_layer_stress: Vec<StressState>,
    /// Every layer in every region that applies to it
    pub region_stress: Vec<RegionStress>,
}

// ============================================================================
// Failure
// ============================================================================

/// Highest Tsai-Wu index once stress concentrations are applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionFailure {
    pub region: Region,
    pub layer_index: usize,
    pub tsai_wu_index: f64,
}

/// Failure report at the working pressure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub design_id: String,
    pub pressure_bar: f64,
    pub interaction_coefficient: f64,
    /// Cylinder results per layer
    pub layers: Vec<FailureResult>,
    pub max_index: f64,
    pub critical_layer: usize,
    /// Hashin mode of the critical layer
    pub governing_mode: FailureMode,
    pub region_peak: RegionFailure,
    pub first_ply_failure_bar: f64,
    pub last_ply_failure_bar: f64,
    pub progressive_sequence: Vec<ProgressiveStep>,
    pub burst: BurstEstimate,
    /// Burst pressure / working pressure
    pub burst_ratio: f64,
    pub required_burst_ratio: f64,
    pub meets_burst_ratio: bool,
}

// ============================================================================
// Reliability
// ============================================================================

/// Optional overrides of the configured run parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityOptions {
    pub sample_count: Option<usize>,
    pub seed: Option<u64>,
    pub limit_pressure_bar: Option<f64>,
}

/// Reliability report.
///
/// ## JSON Example
///
/// ```json
/// {
///   "design_id": "type4-700",
///   "p_failure": 0.0123,
///   "mean_burst_bar": 905.2,
///   "std_dev": 48.7,
///   "confidence_interval": { "lower": 0.0103, "upper": 0.0146 },
///   "sample_count": 10000,
///   "discarded_samples": 0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityReport {
    pub design_id: String,
    pub p_failure: f64,
    pub mean_burst_bar: f64,
    pub std_dev: f64,
    pub confidence_interval: Interval,
    pub confidence_level: f64,
    pub sample_count: usize,
    pub valid_samples: usize,
    pub discarded_samples: usize,
    pub mean_burst_ci: Interval,
    pub min_burst_bar: f64,
    pub max_burst_bar: f64,
    pub reliability_index: Option<f64>,
    pub seed: u64,
    pub limit_pressure_bar: f64,
    pub criterion: BurstCriterion,
}

// ============================================================================
// Summary
// ============================================================================

/// Envelope, mass and headline strength figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSummary {
    pub design_id: String,
    pub name: String,
    pub nominal_working_pressure_bar: f64,
    pub layer_count: usize,
    pub overall_length_mm: f64,
    pub outer_diameter_mm: f64,
    pub radius_thickness_ratio: f64,
    pub thin_wall_valid: bool,
    pub mass: MassSummary,
    pub burst_pressure_bar: f64,
    pub burst_ratio: f64,
}

// ============================================================================
// Report Functions
// ============================================================================

impl<'a> ReportContext<'a> {
    pub fn new(catalog: &'a DesignCatalog, registry: &'a MaterialRegistry, config: &'a AnalysisConfig) -> Self {
        ReportContext {
            catalog,
            registry,
            config,
        }
    }

    /// Look up and validate a design.
    pub fn design(&self, id: &str) -> CalcResult<&'a TankDesign> {
        let design = self.catalog.get(id)?;
        design.validate(self.registry)?;
        Ok(design)
    }

    /// Stress report at the working pressure
    pub fn stress_report(&self, id: &str) -> CalcResult<StressReport> {
        let design = self.design(id)?;
        self.stress_report_for(design, &design.operating_load())
    }

    /// Stress report at an arbitrary load case
    pub fn stress_report_at(&self, id: &str, load: &LoadCase) -> CalcResult<StressReport> {
        let design = self.design(id)?;
        self.stress_report_for(design, load)
    }

    fn stress_report_for(&self, design: &TankDesign, load: &LoadCase) -> CalcResult<StressReport> {
        let analysis = analyze_laminate(&design.geometry, &design.layers, load, self.registry, &self.config.stress)?;
        let regions = scan_regions(&analysis.layers, &design.layers, &design.geometry, &self.config.scf);

        let peak = regions
            .iter()
            .max_by(|a, b| a.state.sigma1_mpa.abs().total_cmp(&b.state.sigma1_mpa.abs()))
            .copied()
            .ok_or_else(|| CalcError::Internal {
                message: "region scan returned no stresses".to_string(),
            })?;
        let layer = design
            .layers
            .iter()
            .find(|l| l.layer_index == peak.state.layer_index)
            .ok_or_else(|| CalcError::Internal {
                message: format!("no layer with index {}", peak.state.layer_index),
            })?;
        let material = self.registry.get(&layer.material_id)?;
        let value = peak.state.sigma1_mpa;
        let (stress_type, allowable) = if value >= 0.0 {
            (StressType::FiberTension, material.xt_mpa)
        } else {
            (StressType::FiberCompression, material.xc_mpa)
        };

        let margin_percent = (1.0 - value.abs() / allowable) * 100.0;

        tracing::debug!(
            design = %design.id,
            peak = %format_stress(value),
            margin = %format_percent(margin_percent),
            region = %peak.region,
            "stress report"
        );

        Ok(StressReport {
            design_id: design.id.clone(),
            load_case: *load,
            load_pressure_bar: load.pressure_bar,
            stress_type,
            max_stress: MaxStress {
                value_mpa: value,
                location: layer.label(),
                layer_index: layer.layer_index,
                region: peak.region,
                allowable_mpa: allowable,
                margin_percent,
            },
            nominal: analysis.nominal,
            thin_wall_valid: analysis.thin_wall_valid,
            per_layer_stress: analysis.layers,
            region_stress: regions,
        })
    }

    /// Failure report at the working pressure
    pub fn failure_report(&self, id: &str) -> CalcResult<FailureReport> {
        let design = self.design(id)?;
        let nwp = design.nominal_working_pressure_bar;
        let load = design.operating_load();
        let analysis = analyze_laminate(&design.geometry, &design.layers, &load, self.registry, &self.config.stress)?;

        let laminate = evaluate_laminate(&analysis.layers, &design.layers, nwp, self.registry, &self.config.failure)?;
        let governing_mode = laminate
            .layers
            .iter()
            .find(|r| r.layer_index == laminate.critical_layer)
            .map(|r| r.hashin_mode)
            .unwrap_or(FailureMode::None);

        let mut region_peak = RegionFailure {
            region: Region::Cylinder,
            layer_index: laminate.critical_layer,
            tsai_wu_index: laminate.max_index,
        };
        for entry in scan_regions(&analysis.layers, &design.layers, &design.geometry, &self.config.scf) {
            let Some(layer) = design.layers.iter().find(|l| l.layer_index == entry.state.layer_index) else {
                continue;
            };
            let index = tsai_wu_index(
                &entry.state,
                self.registry.get(&layer.material_id)?,
                self.config.failure.interaction_coefficient,
            );
            if index > region_peak.tsai_wu_index {
                region_peak = RegionFailure {
                    region: entry.region,
                    layer_index: layer.layer_index,
                    tsai_wu_index: index,
                };
            }
        }

        let progressive = progressive_failure(&design.geometry, &design.layers, nwp, self.registry, self.config)?;
        let burst = burst_pressure(&analysis.layers, &design.layers, nwp, self.registry, &self.config.failure)?;
        let burst_ratio = burst.pressure_bar / nwp;
        let required = self.config.reliability.required_burst_ratio;

        tracing::debug!(
            design = %design.id,
            max_index = laminate.max_index,
            burst = %format_pressure(burst.pressure_bar),
            "failure report"
        );

        Ok(FailureReport {
            design_id: design.id.clone(),
            pressure_bar: nwp,
            interaction_coefficient: self.config.failure.interaction_coefficient,
            max_index: laminate.max_index,
            critical_layer: laminate.critical_layer,
            governing_mode,
            region_peak,
            first_ply_failure_bar: progressive.first_ply_bar,
            last_ply_failure_bar: progressive.last_ply_bar,
            progressive_sequence: progressive.steps,
            burst,
            burst_ratio,
            required_burst_ratio: required,
            meets_burst_ratio: burst_ratio >= required,
            layers: laminate.layers,
        })
    }

    /// Monte Carlo reliability report.
    ///
    /// Unset options fall back to `[reliability]`; the limit defaults to the
    /// working pressure times the required burst ratio.
    pub fn reliability_report(&self, id: &str, options: &ReliabilityOptions) -> CalcResult<ReliabilityReport> {
        let design = self.design(id)?;
        let mut input = ReliabilityInput::for_design(design, &self.config.reliability);
        if let Some(n) = options.sample_count {
            input.sample_count = n;
        }
        if let Some(seed) = options.seed {
            input.seed = seed;
        }
        if let Some(limit) = options.limit_pressure_bar {
            input.limit_pressure_bar = limit;
        }

        let summary = run_monte_carlo(design, self.registry, self.config, &input)?;
        Ok(ReliabilityReport {
            design_id: design.id.clone(),
            p_failure: summary.probability_of_failure,
            mean_burst_bar: summary.mean_burst_bar,
            std_dev: summary.std_dev_bar,
            confidence_interval: summary.confidence_interval,
            confidence_level: summary.confidence_level,
            sample_count: summary.sample_count,
            valid_samples: summary.valid_samples,
            discarded_samples: summary.discarded_samples,
            mean_burst_ci: summary.mean_burst_ci,
            min_burst_bar: summary.min_burst_bar,
            max_burst_bar: summary.max_burst_bar,
            reliability_index: summary.reliability_index,
            seed: summary.seed,
            limit_pressure_bar: summary.limit_pressure_bar,
            criterion: summary.criterion,
        })
    }

    /// Mass, envelope and burst summary
    pub fn summary(&self, id: &str) -> CalcResult<DesignSummary> {
        let design = self.design(id)?;
        let load = design.operating_load();
        let analysis = analyze_laminate(&design.geometry, &design.layers, &load, self.registry, &self.config.stress)?;
        let burst = burst_pressure(
            &analysis.layers,
            &design.layers,
            design.nominal_working_pressure_bar,
            self.registry,
            &self.config.failure,
        )?;
        let g = &design.geometry;

        Ok(DesignSummary {
            design_id: design.id.clone(),
            name: design.name.clone(),
            nominal_working_pressure_bar: design.nominal_working_pressure_bar,
            layer_count: design.layers.len(),
            overall_length_mm: g.overall_length_mm(),
            outer_diameter_mm: 2.0 * g.outer_radius_mm(),
            radius_thickness_ratio: g.radius_thickness_ratio(),
            thin_wall_valid: analysis.thin_wall_valid,
            mass: mass_summary(design, self.registry, load.temperature_c)?,
            burst_pressure_bar: burst.pressure_bar,
            burst_ratio: burst.pressure_bar / design.nominal_working_pressure_bar,
        })
    }
}
