//! # Reliability Sampler
//!
//! Monte Carlo estimate of burst-pressure scatter and probability of failure.
//!
//! Each sample perturbs material strengths and moduli (one draw per material
//! id, as a production batch would), ply thickness and winding angle (one
//! draw per layer) and the inner radius, then repeats the stress solve and
//! the burst criterion.
//!
//! ## Determinism
//!
//! Sample `i` seeds its own generator from `(seed, i)`. Samples run in
//! parallel but are collected and reduced in index order, so a run is
//! bit-for-bit reproducible for any thread count.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::calculations::reliability::{run_monte_carlo, ReliabilityInput};
//! use tank_core::catalog::reference_designs;
//! use tank_core::config::AnalysisConfig;
//! use tank_core::materials::MaterialRegistry;
//!
//! let registry = MaterialRegistry::standard();
//! let config = AnalysisConfig::default();
//! let design = &reference_designs()[0];
//! let input = ReliabilityInput {
//!     sample_count: 200,
//!     seed: 42,
//!     limit_pressure_bar: design.nominal_working_pressure_bar,
//!     design_pressure_bar: design.nominal_working_pressure_bar,
//! };
//! let summary = run_monte_carlo(design, &registry, &config, &input).unwrap();
//! assert_eq!(summary.sample_count, 200);
//! ```

use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calculations::failure::burst_pressure;
use crate::calculations::stress::analyze_sampled;
use crate::config::{AnalysisConfig, BurstCriterion, Distribution, ReliabilityConfig, Uncertainty};
use crate::design::{layup_thickness_mm, LayerSpec, LoadCase, TankDesign, VesselGeometry};
use crate::errors::{require_positive, CalcError, CalcResult};
use crate::materials::{MaterialProperties, MaterialRegistry};
use crate::units::{format_pressure, format_probability};

// ============================================================================
// Input / Output
// ============================================================================

/// Run parameters.
///
/// ## JSON Example
///
/// ```json
/// {
///   "sample_count": 10000,
///   "seed": 42,
///   "limit_pressure_bar": 1575.0,
///   "design_pressure_bar": 700.0
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityInput {
    pub sample_count: usize,
    pub seed: u64,
    /// A sample fails when its burst pressure is below this
    pub limit_pressure_bar: f64,
    /// Pressure the stress solve runs at; burst scales from it
    pub design_pressure_bar: f64,
}

impl ReliabilityInput {
    /// Configured defaults for a design: limit = working pressure × required burst ratio
    pub fn for_design(design: &TankDesign, config: &ReliabilityConfig) -> Self {
        ReliabilityInput {
            sample_count: config.sample_count,
            seed: config.seed,
            limit_pressure_bar: design.nominal_working_pressure_bar * config.required_burst_ratio,
            design_pressure_bar: design.nominal_working_pressure_bar,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.sample_count < 1 {
            return Err(CalcError::invalid_input(
                "sample_count",
                self.sample_count.to_string(),
                "At least one sample is required",
            ));
        }
        require_positive("limit_pressure_bar", self.limit_pressure_bar)?;
        require_positive("design_pressure_bar", self.design_pressure_bar)?;
        Ok(())
    }
}

/// One perturbed design and its burst pressure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilitySample {
    pub index: usize,
    pub geometry: VesselGeometry,
    pub layers: Vec<LayerSpec>,
    /// Perturbed properties of every material the layup uses
    pub materials: Vec<MaterialProperties>,
    /// `None` when the sample was discarded
    pub burst_pressure_bar: Option<f64>,
}

/// Two-sided interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Aggregate statistics of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilitySummary {
    pub sample_count: usize,
    pub valid_samples: usize,
    pub discarded_samples: usize,
    pub probability_of_failure: f64,
    /// Wilson score interval on the probability of failure
    pub confidence_interval: Interval,
    pub confidence_level: f64,
    pub mean_burst_bar: f64,
    /// Normal interval on the mean burst pressure
    pub mean_burst_ci: Interval,
    pub std_dev_bar: f64,
    pub min_burst_bar: f64,
    pub max_burst_bar: f64,
    /// Cornell index (mean − limit) / std; `None` without scatter
    pub reliability_index: Option<f64>,
    pub seed: u64,
    pub limit_pressure_bar: f64,
    pub design_pressure_bar: f64,
    pub criterion: BurstCriterion,
}

// ============================================================================
// Sampling
// ============================================================================

/// Per-sample generator seed (SplitMix64 finaliser over seed and index)
fn sample_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed.wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Standard normal deviate (Box-Muller)
fn standard_normal(rng: &mut StdRng) -> f64 {
    // 1 - [0, 1) keeps ln away from zero
    let u1 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Multiplicative factor with mean 1 and the given CoV.
///
/// Always consumes the same number of draws, so changing one uncertainty
/// does not reshuffle the others.
fn draw_factor(uncertainty: &Uncertainty, rng: &mut StdRng) -> f64 {
    let z = standard_normal(rng);
    let u: f64 = rng.gen();
    let cov = uncertainty.cov;
    match uncertainty.distribution {
        Distribution::Normal => 1.0 + cov * z,
        Distribution::Lognormal => {
            let variance = (1.0 + cov * cov).ln();
            (-variance / 2.0 + variance.sqrt() * z).exp()
        }
        Distribution::Uniform => 1.0 + cov * 3f64.sqrt() * (2.0 * u - 1.0),
    }
}

/// Monte Carlo run over one design
pub struct MonteCarlo<'a> {
    design: &'a TankDesign,
    registry: &'a MaterialRegistry,
    config: &'a AnalysisConfig,
    input: ReliabilityInput,
    material_ids: Vec<String>,
}

impl<'a> MonteCarlo<'a> {
    /// Validate everything up front so samples only fail on sampled values.
    pub fn new(
        design: &'a TankDesign,
        registry: &'a MaterialRegistry,
        config: &'a AnalysisConfig,
        input: ReliabilityInput,
    ) -> CalcResult<Self> {
        input.validate()?;
        config.validate()?;
        design.validate(registry)?;
        let material_ids: BTreeSet<&str> = design.layers.iter().map(|l| l.material_id.as_str()).collect();
        Ok(MonteCarlo {
            design,
            registry,
            config,
            input,
            material_ids: material_ids.into_iter().map(String::from).collect(),
        })
    }

    /// Draw and evaluate sample `index`.
    pub fn draw(&self, index: usize) -> ReliabilitySample {
        let u = &self.config.reliability.uncertainties;
        let mut rng = StdRng::seed_from_u64(sample_seed(self.input.seed, index as u64));

        let radius_factor = draw_factor(&u.inner_radius, &mut rng);

        let mut materials = Vec::with_capacity(self.material_ids.len());
        for id in &self.material_ids {
            let fiber = draw_factor(&u.fiber_strength, &mut rng);
            let matrix = draw_factor(&u.matrix_strength, &mut rng);
            let modulus = draw_factor(&u.modulus, &mut rng);
            // Ids were checked in new()
            if let Ok(nominal) = self.registry.get(id) {
                let mut m = nominal.clone();
                m.xt_mpa *= fiber;
                m.xc_mpa *= fiber;
                m.yt_mpa *= matrix;
                m.yc_mpa *= matrix;
                m.s_mpa *= matrix;
                m.e1_mpa *= modulus;
                m.e2_mpa *= modulus;
                m.g12_mpa *= modulus;
                materials.push(m);
            }
        }

        let layers: Vec<LayerSpec> = self
            .design
            .layers
            .iter()
            .map(|layer| {
                let thickness = draw_factor(&u.ply_thickness, &mut rng);
                let angle_offset = u.winding_angle_std_dev_deg * standard_normal(&mut rng);
                LayerSpec {
                    thickness_mm: layer.thickness_mm * thickness,
                    angle_deg: (layer.angle_deg + angle_offset).clamp(0.0, 90.0),
                    ..layer.clone()
                }
            })
            .collect();

        let mut geometry = self.design.geometry.clone();
        geometry.inner_radius_mm *= radius_factor;
        geometry.wall_thickness_mm *= layup_thickness_mm(&layers) / layup_thickness_mm(&self.design.layers);

        let burst_pressure_bar = match self.evaluate(&geometry, &layers, &materials) {
            Ok(p) if p.is_finite() && p > 0.0 => Some(p),
            Ok(p) => {
                tracing::debug!(index, burst = p, "discarding non-physical sample");
                None
            }
            Err(e) => {
                tracing::debug!(index, error = %e, "discarding degenerate sample");
                None
            }
        };

        ReliabilitySample {
            index,
            geometry,
            layers,
            materials,
            burst_pressure_bar,
        }
    }

    fn evaluate(
        &self,
        geometry: &VesselGeometry,
        layers: &[LayerSpec],
        materials: &[MaterialProperties],
    ) -> CalcResult<f64> {
        let registry = MaterialRegistry::from_materials(materials.iter().cloned())?;
        let load = LoadCase::operating(self.input.design_pressure_bar);
        let analysis = analyze_sampled(geometry, layers, &load, &registry, &self.config.stress)?;
        let burst = burst_pressure(
            &analysis.layers,
            layers,
            self.input.design_pressure_bar,
            &registry,
            &self.config.failure,
        )?;
        Ok(burst.pressure_bar)
    }

    /// Run every sample and aggregate.
    pub fn run(&self, cancel: Option<&AtomicBool>) -> CalcResult<ReliabilitySummary> {
        let n = self.input.sample_count;
        tracing::info!(
            design = %self.design.id,
            samples = n,
            seed = self.input.seed,
            limit_bar = self.input.limit_pressure_bar,
            "starting Monte Carlo run"
        );

        let cancelled = || cancel.is_some_and(|flag| flag.load(Ordering::Relaxed));
        let bursts: Vec<Option<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                if cancelled() {
                    return Err(CalcError::Cancelled {
                        operation: "monte carlo".to_string(),
                    });
                }
                Ok(self.draw(i).burst_pressure_bar)
            })
            .collect::<CalcResult<Vec<_>>>()?;

        let summary = summarize(&bursts, &self.input, self.config)?;
        if summary.discarded_samples > 0 {
            tracing::warn!(discarded = summary.discarded_samples, samples = n, "samples discarded");
        }
        tracing::info!(
            p_failure = %format_probability(summary.probability_of_failure),
            mean_burst = %format_pressure(summary.mean_burst_bar),
            std_dev_bar = summary.std_dev_bar,
            "Monte Carlo run finished"
        );
        Ok(summary)
    }
}

/// Run a Monte Carlo reliability analysis.
pub fn run_monte_carlo(
    design: &TankDesign,
    registry: &MaterialRegistry,
    config: &AnalysisConfig,
    input: &ReliabilityInput,
) -> CalcResult<ReliabilitySummary> {
    MonteCarlo::new(design, registry, config, *input)?.run(None)
}

/// Same as [`run_monte_carlo`], abandoned with `Cancelled` once `cancel` is set.
pub fn run_monte_carlo_cancellable(
    design: &TankDesign,
    registry: &MaterialRegistry,
    config: &AnalysisConfig,
    input: &ReliabilityInput,
    cancel: &AtomicBool,
) -> CalcResult<ReliabilitySummary> {
    MonteCarlo::new(design, registry, config, *input)?.run(Some(cancel))
}

// ============================================================================
// Statistics
// ============================================================================

fn summarize(
    bursts: &[Option<f64>],
    input: &ReliabilityInput,
    config: &AnalysisConfig,
) -> CalcResult<ReliabilitySummary> {
    let valid: Vec<f64> = bursts.iter().flatten().copied().collect();
    let n = valid.len();
    if n == 0 {
        return Err(CalcError::numeric_degeneracy(
            "monte carlo",
            format!("all {} samples were discarded", bursts.len()),
        ));
    }
    let nf = n as f64;

    let mean = valid.iter().sum::<f64>() / nf;
    let mut std_dev = if n > 1 {
        (valid.iter().map(|b| (b - mean).powi(2)).sum::<f64>() / (nf - 1.0)).sqrt()
    } else {
        0.0
    };
    // Identical samples leave round-off in the mean
    if std_dev <= 1e-12 * mean.abs() {
        std_dev = 0.0;
    }
    let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
    let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let failures = valid.iter().filter(|b| **b < input.limit_pressure_bar).count();
    let p = failures as f64 / nf;

    let level = config.reliability.confidence_level;
    let z = normal_quantile(1.0 - (1.0 - level) / 2.0);
    let half_width = z * std_dev / nf.sqrt();

    Ok(ReliabilitySummary {
        sample_count: bursts.len(),
        valid_samples: n,
        discarded_samples: bursts.len() - n,
        probability_of_failure: p,
        confidence_interval: wilson_interval(failures, n, z),
        confidence_level: level,
        mean_burst_bar: mean,
        mean_burst_ci: Interval {
            lower: mean - half_width,
            upper: mean + half_width,
        },
        std_dev_bar: std_dev,
        min_burst_bar: min,
        max_burst_bar: max,
        reliability_index: (std_dev > 0.0).then(|| (mean - input.limit_pressure_bar) / std_dev),
        seed: input.seed,
        limit_pressure_bar: input.limit_pressure_bar,
        design_pressure_bar: input.design_pressure_bar,
        criterion: config.failure.burst_criterion,
    })
}

/// Wilson score interval for `successes` out of `n` at normal quantile `z`
pub fn wilson_interval(successes: usize, n: usize, z: f64) -> Interval {
    if n == 0 {
        return Interval { lower: 0.0, upper: 1.0 };
    }
    let nf = n as f64;
    let p = successes as f64 / nf;
    let z2 = z * z;
    let denom = 1.0 + z2 / nf;
    let center = (p + z2 / (2.0 * nf)) / denom;
    let half = z / denom * (p * (1.0 - p) / nf + z2 / (4.0 * nf * nf)).sqrt();
    Interval {
        lower: if successes == 0 { 0.0 } else { (center - half).max(0.0) },
        upper: if successes >= n { 1.0 } else { (center + half).min(1.0) },
    }
}

/// Inverse standard normal CDF (Acklam's rational approximation, |ε| < 1.2e-9)
pub fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_690e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}
