//! # Failure Criteria
//!
//! Ply failure indices for a stress state, laminate first-ply failure,
//! progressive (ply-discount) failure and burst pressure estimates.
//!
//! ## Tsai-Wu
//!
//! ```text
//! f(σ) = F1σ1 + F2σ2 + F11σ1² + F22σ2² + F66τ12² + 2F12σ1σ2
//! F1 = 1/Xt − 1/Xc     F11 = 1/(Xt·Xc)
//! F2 = 1/Yt − 1/Yc     F22 = 1/(Yt·Yc)
//! F66 = 1/S²           F12 = k·sqrt(F11·F22)
//! ```
//!
//! The reported index is the inverse strength ratio `1/R` where `f(R·σ) = 1`.
//! It is 1.0 exactly where `f` is, and it grows linearly with load, so
//! `P / index` is the first-ply failure pressure.
//!
//! ## Hashin (plane stress)
//!
//! | Mode               | Active when | Index                                          |
//! |--------------------|-------------|------------------------------------------------|
//! | fiber tension      | σ1 ≥ 0      | (σ1/Xt)² + (τ12/S)²                            |
//! | fiber compression  | σ1 < 0      | (σ1/Xc)²                                       |
//! | matrix tension     | σ2 ≥ 0      | (σ2/Yt)² + (τ12/S)²                            |
//! | matrix compression | σ2 < 0      | (σ2/2S)² + ((Yc/2S)² − 1)·σ2/Yc + (τ12/S)²     |
//!
//! ## References
//!
//! - Tsai & Wu, J. Composite Materials 5 (1971) 58-80
//! - Hashin, J. Applied Mechanics 47 (1980) 329-334

use serde::{Deserialize, Serialize};

use crate::calculations::stress::{analyze_with_retained_stiffness, StressState};
use crate::config::{AnalysisConfig, BurstCriterion, FailureConfig};
use crate::design::{LayerSpec, LoadCase, VesselGeometry};
use crate::errors::{require_positive, CalcError, CalcResult};
use crate::materials::{MaterialProperties, MaterialRegistry};

/// Hashin damage mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureMode {
    FiberTension,
    FiberCompression,
    MatrixTension,
    MatrixCompression,
    /// Unloaded ply
    None,
}

impl FailureMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            FailureMode::FiberTension => "fiber tension",
            FailureMode::FiberCompression => "fiber compression",
            FailureMode::MatrixTension => "matrix tension",
            FailureMode::MatrixCompression => "matrix compression",
            FailureMode::None => "none",
        }
    }

    pub fn is_fiber(&self) -> bool {
        matches!(self, FailureMode::FiberTension | FailureMode::FiberCompression)
    }
}

impl std::fmt::Display for FailureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Tsai-Wu
// ============================================================================

/// Tsai-Wu strength tensor terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TsaiWuCoefficients {
    pub f1: f64,
    pub f2: f64,
    pub f11: f64,
    pub f22: f64,
    pub f66: f64,
    pub f12: f64,
}

impl TsaiWuCoefficients {
    pub fn new(material: &MaterialProperties, interaction_coefficient: f64) -> Self {
        let f11 = 1.0 / (material.xt_mpa * material.xc_mpa);
        let f22 = 1.0 / (material.yt_mpa * material.yc_mpa);
        TsaiWuCoefficients {
            f1: 1.0 / material.xt_mpa - 1.0 / material.xc_mpa,
            f2: 1.0 / material.yt_mpa - 1.0 / material.yc_mpa,
            f11,
            f22,
            f66: 1.0 / (material.s_mpa * material.s_mpa),
            f12: interaction_coefficient * (f11 * f22).sqrt(),
        }
    }

    /// Linear and quadratic parts (A, B) of f(σ)
    fn split(&self, s: &StressState) -> (f64, f64) {
        let (s1, s2, t12) = (s.sigma1_mpa, s.sigma2_mpa, s.tau12_mpa);
        let linear = self.f1 * s1 + self.f2 * s2;
        let quadratic =
            self.f11 * s1 * s1 + self.f22 * s2 * s2 + self.f66 * t12 * t12 + 2.0 * self.f12 * s1 * s2;
        (linear, quadratic)
    }

    /// Polynomial value f(σ)
    pub fn polynomial(&self, s: &StressState) -> f64 {
        let (a, b) = self.split(s);
        a + b
    }

    /// Inverse strength ratio 1/R, R being the positive root of B·R² + A·R − 1 = 0
    pub fn index(&self, s: &StressState) -> f64 {
        let (a, b) = self.split(s);
        // B ≥ 0 for k in [-1, 0); the clamp only absorbs rounding
        let b = b.max(0.0);
        (a + (a * a + 4.0 * b).sqrt()) / 2.0
    }
}

/// Tsai-Wu polynomial value f(σ) (1.0 at failure)
pub fn tsai_wu_polynomial(stress: &StressState, material: &MaterialProperties, interaction_coefficient: f64) -> f64 {
    TsaiWuCoefficients::new(material, interaction_coefficient).polynomial(stress)
}

/// Tsai-Wu failure index (inverse strength ratio, linear in load)
pub fn tsai_wu_index(stress: &StressState, material: &MaterialProperties, interaction_coefficient: f64) -> f64 {
    TsaiWuCoefficients::new(material, interaction_coefficient).index(stress)
}

// ============================================================================
// Hashin
// ============================================================================

/// Hashin index per mode (inactive modes are zero)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HashinIndices {
    pub fiber_tension: f64,
    pub fiber_compression: f64,
    pub matrix_tension: f64,
    pub matrix_compression: f64,
}

impl HashinIndices {
    /// Governing (largest) mode and its index
    pub fn governing(&self) -> (FailureMode, f64) {
        let candidates = [
            (FailureMode::FiberTension, self.fiber_tension),
            (FailureMode::FiberCompression, self.fiber_compression),
            (FailureMode::MatrixTension, self.matrix_tension),
            (FailureMode::MatrixCompression, self.matrix_compression),
        ];
        candidates
            .into_iter()
            .fold((FailureMode::None, 0.0), |best, c| if c.1 > best.1 { c } else { best })
    }

    /// Largest fiber-mode index
    pub fn fiber(&self) -> f64 {
        self.fiber_tension.max(self.fiber_compression)
    }
}

/// Hashin (1980) plane-stress indices
pub fn hashin_indices(stress: &StressState, material: &MaterialProperties) -> HashinIndices {
    let (s1, s2, t12) = (stress.sigma1_mpa, stress.sigma2_mpa, stress.tau12_mpa);
    let shear = (t12 / material.s_mpa).powi(2);
    let mut out = HashinIndices::default();

    if s1 >= 0.0 {
        out.fiber_tension = (s1 / material.xt_mpa).powi(2) + shear;
    } else {
        out.fiber_compression = (s1 / material.xc_mpa).powi(2);
    }

    if s2 >= 0.0 {
        out.matrix_tension = (s2 / material.yt_mpa).powi(2) + shear;
    } else {
        let two_s = 2.0 * material.s_mpa;
        let value = (s2 / two_s).powi(2)
            + ((material.yc_mpa / two_s).powi(2) - 1.0) * s2 / material.yc_mpa
            + shear;
        out.matrix_compression = value.max(0.0);
    }
    out
}

// ============================================================================
// Ply Evaluation
// ============================================================================

/// Failure assessment of one layer.
///
/// ## JSON Example
///
/// ```json
/// {
///   "layer_index": 4,
///   "tsai_wu_index": 0.72,
///   "tsai_wu_value": 0.61,
///   "hashin_index": 0.55,
///   "hashin_mode": "matrix-tension",
///   "margin_percent": 28.0,
///   "failed": false
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailureResult {
    pub layer_index: usize,
    pub tsai_wu_index: f64,
    /// Raw polynomial value f(σ)
    pub tsai_wu_value: f64,
    pub hashin_index: f64,
    pub hashin_mode: FailureMode,
    /// (1 − Tsai-Wu index) × 100
    pub margin_percent: f64,
    pub failed: bool,
}

/// Evaluate both criteria for one stress state.
///
/// ```rust
/// use tank_core::calculations::failure::evaluate_failure;
/// use tank_core::calculations::stress::StressState;
/// use tank_core::config::FailureConfig;
/// use tank_core::materials::MaterialRegistry;
///
/// let registry = MaterialRegistry::standard();
/// let stress = StressState {
///     layer_index: 0, angle_deg: 89.0,
///     hoop_stress_mpa: 1000.0, axial_stress_mpa: 0.0, shear_stress_mpa: 0.0,
///     sigma1_mpa: 1000.0, sigma2_mpa: 0.0, tau12_mpa: 0.0,
/// };
/// let result = evaluate_failure(&stress, registry.get("T700S").unwrap(), &FailureConfig::default());
/// assert!(!result.failed);
/// ```
pub fn evaluate_failure(stress: &StressState, material: &MaterialProperties, criteria: &FailureConfig) -> FailureResult {
    let coefficients = TsaiWuCoefficients::new(material, criteria.interaction_coefficient);
    let index = coefficients.index(stress);
    let (hashin_mode, hashin_index) = hashin_indices(stress, material).governing();
    FailureResult {
        layer_index: stress.layer_index,
        tsai_wu_index: index,
        tsai_wu_value: coefficients.polynomial(stress),
        hashin_index,
        hashin_mode,
        margin_percent: (1.0 - index) * 100.0,
        failed: index >= 1.0,
    }
}

/// Laminate-level assessment at one pressure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaminateFailure {
    pub pressure_bar: f64,
    pub layers: Vec<FailureResult>,
    pub max_index: f64,
    /// `layer_index` of the layer with the highest Tsai-Wu index
    pub critical_layer: usize,
    /// Pressure / max index; `None` for an unloaded laminate
    pub first_ply_failure_bar: Option<f64>,
}

/// Evaluate every layer. `states` and `layers` must be in the same order.
pub fn evaluate_laminate(
    states: &[StressState],
    layers: &[LayerSpec],
    pressure_bar: f64,
    registry: &MaterialRegistry,
    criteria: &FailureConfig,
) -> CalcResult<LaminateFailure> {
    if states.is_empty() || states.len() != layers.len() {
        return Err(CalcError::invalid_input(
            "layers",
            format!("{} states / {} layers", states.len(), layers.len()),
            "Need one stress state per layer",
        ));
    }
    let mut results = Vec::with_capacity(states.len());
    for (state, layer) in states.iter().zip(layers) {
        let material = registry.get(&layer.material_id)?;
        results.push(evaluate_failure(state, material, criteria));
    }

    let critical = results
        .iter()
        .fold(&results[0], |best, r| if r.tsai_wu_index > best.tsai_wu_index { r } else { best });
    let max_index = critical.tsai_wu_index;
    let first_ply_failure_bar = (max_index > 0.0).then(|| pressure_bar / max_index);

    Ok(LaminateFailure {
        pressure_bar,
        critical_layer: critical.layer_index,
        max_index,
        first_ply_failure_bar,
        layers: results,
    })
}

// ============================================================================
// Progressive Failure
// ============================================================================

/// One ply failure in the discount sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveStep {
    pub step: usize,
    pub layer_index: usize,
    pub pressure_bar: f64,
    pub mode: FailureMode,
}

/// Ply-discount failure sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveFailure {
    pub steps: Vec<ProgressiveStep>,
    pub first_ply_bar: f64,
    /// Ultimate burst estimate
    pub last_ply_bar: f64,
}

/// Fail plies one at a time, discounting each failed ply's stiffness and
/// redistributing the load, until no loaded ply is left.
///
/// Pressures never decrease: a ply overloaded by redistribution fails at the
/// pressure of the step that overloaded it.
pub fn progressive_failure(
    geometry: &VesselGeometry,
    layers: &[LayerSpec],
    design_pressure_bar: f64,
    registry: &MaterialRegistry,
    config: &AnalysisConfig,
) -> CalcResult<ProgressiveFailure> {
    require_positive("design_pressure_bar", design_pressure_bar)?;
    let load = LoadCase::operating(design_pressure_bar);
    let degradation = config.failure.degradation_factor;
    let k = config.failure.interaction_coefficient;

    let n = layers.len();
    let mut retained = vec![1.0; n];
    let mut failed = vec![false; n];
    let mut steps: Vec<ProgressiveStep> = Vec::with_capacity(n);
    let mut current = 0.0_f64;

    while steps.len() < n {
        let analysis = analyze_with_retained_stiffness(geometry, layers, &load, registry, &config.stress, &retained)?;

        let mut next: Option<(usize, f64)> = None;
        for (pos, (state, layer)) in analysis.layers.iter().zip(layers).enumerate() {
            if failed[pos] {
                continue;
            }
            let index = tsai_wu_index(state, registry.get(&layer.material_id)?, k);
            if index > 0.0 && next.map_or(true, |(_, best)| index > best) {
                next = Some((pos, index));
            }
        }
        let Some((pos, index)) = next else {
            tracing::debug!(remaining = n - steps.len(), "no loaded plies left");
            break;
        };

        let pressure = (design_pressure_bar / index).max(current);
        let state = analysis.layers[pos].scaled(pressure / design_pressure_bar);
        let (mode, _) = hashin_indices(&state, registry.get(&layers[pos].material_id)?).governing();

        steps.push(ProgressiveStep {
            step: steps.len() + 1,
            layer_index: layers[pos].layer_index,
            pressure_bar: pressure,
            mode,
        });
        failed[pos] = true;
        retained[pos] = degradation;
        current = pressure;
    }

    let (first, last) = match (steps.first(), steps.last()) {
        (Some(first), Some(last)) => (first.pressure_bar, last.pressure_bar),
        _ => {
            return Err(CalcError::numeric_degeneracy(
                "progressive failure",
                "no ply is loaded at the design pressure",
            ))
        }
    };
    tracing::debug!(steps = steps.len(), first_ply_bar = first, last_ply_bar = last, "progressive failure done");

    Ok(ProgressiveFailure {
        steps,
        first_ply_bar: first,
        last_ply_bar: last,
    })
}

// ============================================================================
// Burst Pressure
// ============================================================================

const BRACKET_DOUBLINGS: usize = 64;
const BISECTION_ITERATIONS: usize = 200;
const BISECTION_TOLERANCE: f64 = 1e-9;

/// Burst pressure estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstEstimate {
    pub pressure_bar: f64,
    pub criterion: BurstCriterion,
    pub critical_layer: usize,
    pub mode: FailureMode,
}

/// Burst pressure from stress states computed at `design_pressure_bar`.
///
/// Stresses are linear in pressure, so no further laminate solves are needed.
pub fn burst_pressure(
    states: &[StressState],
    layers: &[LayerSpec],
    design_pressure_bar: f64,
    registry: &MaterialRegistry,
    failure: &FailureConfig,
) -> CalcResult<BurstEstimate> {
    require_positive("design_pressure_bar", design_pressure_bar)?;
    let mut materials = Vec::with_capacity(layers.len());
    for layer in layers {
        materials.push(registry.get(&layer.material_id)?);
    }
    if states.is_empty() || states.len() != materials.len() {
        return Err(CalcError::invalid_input(
            "layers",
            format!("{} states / {} layers", states.len(), layers.len()),
            "Need one stress state per layer",
        ));
    }

    let unloaded = || CalcError::numeric_degeneracy("burst search", "no ply is loaded at the design pressure");

    match failure.burst_criterion {
        BurstCriterion::TsaiWu => {
            let (pos, index) = argmax(states.iter().zip(&materials).map(|(s, m)| {
                tsai_wu_index(s, m, failure.interaction_coefficient)
            }));
            if index <= 0.0 {
                return Err(unloaded());
            }
            let pressure = design_pressure_bar / index;
            let (mode, _) = hashin_indices(&states[pos].scaled(1.0 / index), materials[pos]).governing();
            Ok(BurstEstimate {
                pressure_bar: pressure,
                criterion: failure.burst_criterion,
                critical_layer: states[pos].layer_index,
                mode,
            })
        }
        BurstCriterion::HashinFiber => {
            let (pos, index) = argmax(states.iter().zip(&materials).map(|(s, m)| hashin_indices(s, m).fiber()));
            if index <= 0.0 {
                return Err(unloaded());
            }
            let mode = if states[pos].sigma1_mpa >= 0.0 {
                FailureMode::FiberTension
            } else {
                FailureMode::FiberCompression
            };
            Ok(BurstEstimate {
                pressure_bar: design_pressure_bar / index.sqrt(),
                criterion: failure.burst_criterion,
                critical_layer: states[pos].layer_index,
                mode,
            })
        }
        BurstCriterion::Hashin => {
            let worst = |scale: f64| -> (usize, f64) {
                argmax(states.iter().zip(&materials).map(|(s, m)| hashin_indices(&s.scaled(scale), m).governing().1))
            };

            let mut hi = 1.0;
            let mut doublings = 0;
            while worst(hi).1 < 1.0 {
                hi *= 2.0;
                doublings += 1;
                if doublings > BRACKET_DOUBLINGS {
                    return Err(CalcError::numeric_degeneracy(
                        "burst search",
                        "could not bracket the Hashin failure pressure",
                    ));
                }
            }
            let mut lo = 0.0;
            let mut converged = false;
            for _ in 0..BISECTION_ITERATIONS {
                let mid = 0.5 * (lo + hi);
                if worst(mid).1 >= 1.0 {
                    hi = mid;
                } else {
                    lo = mid;
                }
                if hi - lo <= BISECTION_TOLERANCE * hi {
                    converged = true;
                    break;
                }
            }
            if !converged {
                return Err(CalcError::numeric_degeneracy(
                    "burst search",
                    "Hashin bisection did not converge",
                ));
            }

            let (pos, _) = worst(hi);
            let (mode, _) = hashin_indices(&states[pos].scaled(hi), materials[pos]).governing();
            Ok(BurstEstimate {
                pressure_bar: design_pressure_bar * hi,
                criterion: failure.burst_criterion,
                critical_layer: states[pos].layer_index,
                mode,
            })
        }
    }
}

/// Position and value of the largest entry (first wins on ties)
fn argmax(values: impl Iterator<Item = f64>) -> (usize, f64) {
    values
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::stress::analyze_laminate;
    use approx::assert_relative_eq;

    fn t700() -> MaterialProperties {
        MaterialRegistry::standard().get("T700S").unwrap().clone()
    }

    fn state(s1: f64, s2: f64, t12: f64) -> StressState {
        StressState {
            layer_index: 0,
            angle_deg: 15.0,
            hoop_stress_mpa: 0.0,
            axial_stress_mpa: 0.0,
            shear_stress_mpa: 0.0,
            sigma1_mpa: s1,
            sigma2_mpa: s2,
            tau12_mpa: t12,
        }
    }

    fn layup() -> Vec<LayerSpec> {
        (0..12)
            .map(|i| {
                if i % 2 == 0 {
                    LayerSpec::helical(i, 15.0, 1.0, "T700S")
                } else {
                    LayerSpec::hoop(i, 1.5, "T700S")
                }
            })
            .collect()
    }

    #[test]
    fn test_uniaxial_strength_gives_unit_index() {
        let m = t700();
        let k = -0.5;
        assert_relative_eq!(tsai_wu_index(&state(m.xt_mpa, 0.0, 0.0), &m, k), 1.0, max_relative = 1e-12);
        assert_relative_eq!(tsai_wu_index(&state(-m.xc_mpa, 0.0, 0.0), &m, k), 1.0, max_relative = 1e-12);
        assert_relative_eq!(tsai_wu_index(&state(0.0, m.yt_mpa, 0.0), &m, k), 1.0, max_relative = 1e-12);
        assert_relative_eq!(tsai_wu_index(&state(0.0, 0.0, m.s_mpa), &m, k), 1.0, max_relative = 1e-12);
        assert_relative_eq!(tsai_wu_polynomial(&state(m.xt_mpa, 0.0, 0.0), &m, k), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_index_is_linear_in_load() {
        let m = t700();
        let s = state(800.0, 30.0, 20.0);
        let base = tsai_wu_index(&s, &m, -0.5);
        for factor in [0.25, 0.5, 2.0, 3.0] {
            assert_relative_eq!(tsai_wu_index(&s.scaled(factor), &m, -0.5), base * factor, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_index_matches_polynomial_at_failure() {
        let m = t700();
        let s = state(900.0, 40.0, 35.0);
        let index = tsai_wu_index(&s, &m, -0.5);
        let at_failure = s.scaled(1.0 / index);
        assert_relative_eq!(tsai_wu_polynomial(&at_failure, &m, -0.5), 1.0, max_relative = 1e-9);
    }

    #[test]
    fn test_failure_boundary() {
        let m = t700();
        let config = FailureConfig::default();
        let s = state(900.0, 40.0, 35.0);
        let index = tsai_wu_index(&s, &m, config.interaction_coefficient);

        let safe = evaluate_failure(&s.scaled(0.999 / index), &m, &config);
        assert!(!safe.failed);
        assert!(safe.margin_percent > 0.0);

        let failed = evaluate_failure(&s.scaled(1.001 / index), &m, &config);
        assert!(failed.failed);
        assert!(failed.margin_percent < 0.0);
    }

    #[test]
    fn test_evaluate_failure_is_deterministic() {
        let m = t700();
        let s = state(1200.0, 55.0, -20.0);
        let config = FailureConfig::default();
        let a = evaluate_failure(&s, &m, &config);
        let b = evaluate_failure(&s, &m, &config);
        assert_eq!(a, b);
        assert_eq!(a.tsai_wu_index.to_bits(), b.tsai_wu_index.to_bits());
    }

    #[test]
    fn test_unloaded_ply() {
        let m = t700();
        let result = evaluate_failure(&state(0.0, 0.0, 0.0), &m, &FailureConfig::default());
        assert_eq!(result.tsai_wu_index, 0.0);
        assert_eq!(result.hashin_mode, FailureMode::None);
        assert_eq!(result.margin_percent, 100.0);
    }

    #[test]
    fn test_hashin_modes() {
        let m = t700();
        assert_eq!(hashin_indices(&state(m.xt_mpa, 0.0, 0.0), &m).governing(), (FailureMode::FiberTension, 1.0));
        assert_eq!(
            hashin_indices(&state(-m.xc_mpa, 0.0, 0.0), &m).governing(),
            (FailureMode::FiberCompression, 1.0)
        );
        assert_eq!(hashin_indices(&state(0.0, m.yt_mpa, 0.0), &m).governing(), (FailureMode::MatrixTension, 1.0));

        let (mode, index) = hashin_indices(&state(0.0, -m.yc_mpa, 0.0), &m).governing();
        assert_eq!(mode, FailureMode::MatrixCompression);
        assert_relative_eq!(index, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_hashin_matrix_compression_never_negative() {
        let m = t700();
        let h = hashin_indices(&state(0.0, -1.0, 0.0), &m);
        assert!(h.matrix_compression >= 0.0);
    }

    #[test]
    fn test_laminate_evaluation() {
        let registry = MaterialRegistry::standard();
        let config = AnalysisConfig::default();
        let geometry = VesselGeometry::cylinder(200.0, 15.0, 800.0);
        let layers = layup();
        let analysis =
            analyze_laminate(&geometry, &layers, &LoadCase::operating(350.0), &registry, &config.stress).unwrap();
        let result = evaluate_laminate(&analysis.layers, &layers, 350.0, &registry, &config.failure).unwrap();

        assert_eq!(result.layers.len(), 12);
        let max = result.layers.iter().map(|r| r.tsai_wu_index).fold(0.0, f64::max);
        assert_eq!(result.max_index, max);
        let critical = result.layers.iter().find(|r| r.layer_index == result.critical_layer).unwrap();
        assert_eq!(critical.tsai_wu_index, max);
        assert_relative_eq!(result.first_ply_failure_bar.unwrap(), 350.0 / max, max_relative = 1e-12);
    }

    #[test]
    fn test_index_monotone_in_pressure() {
        let registry = MaterialRegistry::standard();
        let config = AnalysisConfig::default();
        let geometry = VesselGeometry::cylinder(200.0, 15.0, 800.0);
        let layers = layup();
        let mut previous: Option<Vec<f64>> = None;
        for p in [50.0, 200.0, 350.0, 700.0, 1000.0] {
            let analysis =
                analyze_laminate(&geometry, &layers, &LoadCase::operating(p), &registry, &config.stress).unwrap();
            let result = evaluate_laminate(&analysis.layers, &layers, p, &registry, &config.failure).unwrap();
            let indices: Vec<f64> = result.layers.iter().map(|r| r.tsai_wu_index).collect();
            if let Some(prev) = &previous {
                for (a, b) in prev.iter().zip(&indices) {
                    assert!(b > a, "index fell or stalled: {} -> {}", a, b);
                }
            }
            previous = Some(indices);
        }
    }

    #[test]
    fn test_progressive_failure_is_ordered() {
        let registry = MaterialRegistry::standard();
        let config = AnalysisConfig::default();
        let geometry = VesselGeometry::cylinder(200.0, 15.0, 800.0);
        let layers = layup();
        let result = progressive_failure(&geometry, &layers, 350.0, &registry, &config).unwrap();

        assert_eq!(result.steps.len(), layers.len());
        for pair in result.steps.windows(2) {
            assert!(pair[1].pressure_bar >= pair[0].pressure_bar);
        }
        let mut failed: Vec<usize> = result.steps.iter().map(|s| s.layer_index).collect();
        failed.sort();
        failed.dedup();
        assert_eq!(failed.len(), layers.len());

        let analysis =
            analyze_laminate(&geometry, &layers, &LoadCase::operating(350.0), &registry, &config.stress).unwrap();
        let fpf = evaluate_laminate(&analysis.layers, &layers, 350.0, &registry, &config.failure).unwrap();
        assert_relative_eq!(result.first_ply_bar, fpf.first_ply_failure_bar.unwrap(), max_relative = 1e-9);
        assert!(result.last_ply_bar >= result.first_ply_bar);
    }

    #[test]
    fn test_burst_criteria() {
        let registry = MaterialRegistry::standard();
        let config = AnalysisConfig::default();
        let geometry = VesselGeometry::cylinder(200.0, 15.0, 800.0);
        let layers = layup();
        let analysis =
            analyze_laminate(&geometry, &layers, &LoadCase::operating(350.0), &registry, &config.stress).unwrap();

        let tsai_config = FailureConfig {
            burst_criterion: BurstCriterion::TsaiWu,
            ..FailureConfig::default()
        };
        let tsai = burst_pressure(&analysis.layers, &layers, 350.0, &registry, &tsai_config).unwrap();
        let fpf = evaluate_laminate(&analysis.layers, &layers, 350.0, &registry, &config.failure).unwrap();
        assert_relative_eq!(tsai.pressure_bar, 350.0 / fpf.max_index, max_relative = 1e-12);
        assert_eq!(tsai.critical_layer, fpf.critical_layer);

        let hashin_config = FailureConfig {
            burst_criterion: BurstCriterion::Hashin,
            ..FailureConfig::default()
        };
        let hashin = burst_pressure(&analysis.layers, &layers, 350.0, &registry, &hashin_config).unwrap();
        let at_burst: Vec<StressState> =
            analysis.layers.iter().map(|s| s.scaled(hashin.pressure_bar / 350.0)).collect();
        let worst = at_burst
            .iter()
            .zip(&layers)
            .map(|(s, l)| hashin_indices(s, registry.get(&l.material_id).unwrap()).governing().1)
            .fold(0.0, f64::max);
        assert_relative_eq!(worst, 1.0, max_relative = 1e-6);

        let fiber = burst_pressure(&analysis.layers, &layers, 350.0, &registry, &config.failure).unwrap();
        assert_eq!(config.failure.burst_criterion, BurstCriterion::HashinFiber);
        assert!(fiber.mode.is_fiber());
        assert!(fiber.pressure_bar > tsai.pressure_bar);
    }

    #[test]
    fn test_burst_of_unloaded_laminate_is_degenerate() {
        let registry = MaterialRegistry::standard();
        let layers = layup();
        let states: Vec<StressState> = layers.iter().map(|l| StressState { layer_index: l.layer_index, ..state(0.0, 0.0, 0.0) }).collect();
        for criterion in [BurstCriterion::TsaiWu, BurstCriterion::Hashin, BurstCriterion::HashinFiber] {
            let config = FailureConfig {
                burst_criterion: criterion,
                ..FailureConfig::default()
            };
            let err = burst_pressure(&states, &layers, 350.0, &registry, &config).unwrap_err();
            assert_eq!(err.error_code(), "NUMERIC_DEGENERACY");
        }
    }
}
