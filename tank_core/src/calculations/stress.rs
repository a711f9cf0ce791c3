//! # Laminate Stress Solver
//!
//! Per-layer stresses in the cylindrical section of a filament-wound vessel
//! under internal pressure.
//!
//! ## Method
//!
//! 1. Thin-wall membrane stresses at the mean radius give the hoop and axial
//!    resultants `N_h = σ_h·t`, `N_a = σ_a·t`.
//! 2. The wall strains as one body. Helical layers are balanced ±θ pairs with
//!    stiffness `Q̄(θ)`; hoop layers only stiffen the hoop direction. Solving
//!    `A·ε = N` gives the common hoop and axial strain.
//! 3. Each layer's stress is its stiffness times the strain, scaled by the
//!    through-thickness gradient factor.
//! 4. Stresses are rotated into fiber axes with ψ = 90° − winding angle.
//!
//! ## Assumptions
//!
//! - Membrane action only (no bending, no end effects)
//! - Zero in-plane shear strain (balanced layup)
//! - The liner carries no load
//!
//! ## Example
//!
//! ```rust
//! use tank_core::calculations::stress::compute_layer_stresses;
//! use tank_core::config::StressConfig;
//! use tank_core::design::{LayerSpec, LoadCase, VesselGeometry};
//! use tank_core::materials::MaterialRegistry;
//!
//! let registry = MaterialRegistry::standard();
//! let geometry = VesselGeometry::cylinder(200.0, 10.0, 800.0);
//! let layers: Vec<LayerSpec> = (0..4)
//!     .map(|i| if i % 2 == 0 {
//!         LayerSpec::helical(i, 15.0, 1.0, "T700S")
//!     } else {
//!         LayerSpec::hoop(i, 1.5, "T700S")
//!     })
//!     .collect();
//!
//! let states = compute_layer_stresses(
//!     &geometry, &layers, &LoadCase::operating(350.0), &registry, &StressConfig::default(),
//! ).unwrap();
//! assert_eq!(states.len(), 4);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::StressConfig;
use crate::design::{layup_thickness_mm, validate_layup, LayerSpec, LoadCase, VesselGeometry, WindingType};
use crate::equations::{
    cylinder_axial_stress, cylinder_hoop_stress, off_axis_modulus, reduced_stiffness, rotate_to_material_axes,
    sphere_membrane_stress, transformed_stiffness, TransformedStiffness,
};
use crate::errors::{CalcError, CalcResult};
use crate::materials::MaterialRegistry;

/// Walls thinner than this (mm) cannot be solved
const MIN_WALL_THICKNESS_MM: f64 = 1e-6;

/// Relative tolerance on the membrane stiffness determinant
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Stress in one layer, in vessel and fiber axes (MPa).
///
/// ## JSON Example
///
/// ```json
/// {
///   "layer_index": 0,
///   "angle_deg": 15.0,
///   "hoop_stress_mpa": 212.4,
///   "axial_stress_mpa": 480.1,
///   "shear_stress_mpa": 98.7,
///   "sigma1_mpa": 530.2,
///   "sigma2_mpa": 62.3,
///   "tau12_mpa": -12.0
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressState {
    pub layer_index: usize,
    pub angle_deg: f64,
    pub hoop_stress_mpa: f64,
    pub axial_stress_mpa: f64,
    /// In-plane shear in vessel axes (the +θ ply of a helical pair)
    pub shear_stress_mpa: f64,
    /// Along the fibers
    pub sigma1_mpa: f64,
    /// Transverse to the fibers
    pub sigma2_mpa: f64,
    pub tau12_mpa: f64,
}

impl StressState {
    /// Same state with every component multiplied by `factor`.
    ///
    /// Stresses are linear in pressure, so this is the state at `factor × P`.
    pub fn scaled(&self, factor: f64) -> Self {
        StressState {
            hoop_stress_mpa: self.hoop_stress_mpa * factor,
            axial_stress_mpa: self.axial_stress_mpa * factor,
            shear_stress_mpa: self.shear_stress_mpa * factor,
            sigma1_mpa: self.sigma1_mpa * factor,
            sigma2_mpa: self.sigma2_mpa * factor,
            tau12_mpa: self.tau12_mpa * factor,
            ..*self
        }
    }

    /// Largest absolute principal-axis component, with its sign
    pub fn peak_component_mpa(&self) -> f64 {
        [self.sigma1_mpa, self.sigma2_mpa, self.tau12_mpa]
            .into_iter()
            .fold(0.0, |acc: f64, v| if v.abs() > acc.abs() { v } else { acc })
    }
}

/// Closed-form membrane stresses before load sharing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NominalStress {
    pub mean_radius_mm: f64,
    pub hoop_mpa: f64,
    pub axial_mpa: f64,
    /// Spherical dome membrane stress at the same radius
    pub dome_mpa: f64,
}

/// Complete output of one laminate solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaminateAnalysis {
    pub pressure_bar: f64,
    pub nominal: NominalStress,
    pub strain_hoop: f64,
    pub strain_axial: f64,
    /// One entry per layer, inner → outer
    pub layers: Vec<StressState>,
    /// False when inner radius / wall is below the configured ratio
    pub thin_wall_valid: bool,
}

impl LaminateAnalysis {
    /// Layer with the largest |σ1|
    pub fn max_fiber_stress(&self) -> Option<&StressState> {
        self.layers
            .iter()
            .max_by(|a, b| a.sigma1_mpa.abs().total_cmp(&b.sigma1_mpa.abs()))
    }
}

/// Per-layer stresses for a geometry, layup and load case.
pub fn compute_layer_stresses(
    geometry: &VesselGeometry,
    layers: &[LayerSpec],
    load: &LoadCase,
    registry: &MaterialRegistry,
    config: &StressConfig,
) -> CalcResult<Vec<StressState>> {
    Ok(analyze_laminate(geometry, layers, load, registry, config)?.layers)
}

/// Full laminate solve: nominal stresses, strains, per-layer states.
pub fn analyze_laminate(
    geometry: &VesselGeometry,
    layers: &[LayerSpec],
    load: &LoadCase,
    registry: &MaterialRegistry,
    config: &StressConfig,
) -> CalcResult<LaminateAnalysis> {
    let retained = vec![1.0; layers.len()];
    solve(geometry, layers, load, registry, config, &retained, true)
}

/// Laminate solve where layer `k` keeps `retained[k]` of its stiffness.
///
/// Used by progressive failure to discount failed plies. Geometry warnings
/// are left to [`analyze_laminate`].
pub(crate) fn analyze_with_retained_stiffness(
    geometry: &VesselGeometry,
    layers: &[LayerSpec],
    load: &LoadCase,
    registry: &MaterialRegistry,
    config: &StressConfig,
    retained: &[f64],
) -> CalcResult<LaminateAnalysis> {
    solve(geometry, layers, load, registry, config, retained, false)
}

/// Intact laminate solve without geometry warnings.
///
/// Sampled designs repeat the nominal design's warnings thousands of times.
pub(crate) fn analyze_sampled(
    geometry: &VesselGeometry,
    layers: &[LayerSpec],
    load: &LoadCase,
    registry: &MaterialRegistry,
    config: &StressConfig,
) -> CalcResult<LaminateAnalysis> {
    let retained = vec![1.0; layers.len()];
    solve(geometry, layers, load, registry, config, &retained, false)
}

fn solve(
    geometry: &VesselGeometry,
    layers: &[LayerSpec],
    load: &LoadCase,
    registry: &MaterialRegistry,
    config: &StressConfig,
    retained: &[f64],
    warn: bool,
) -> CalcResult<LaminateAnalysis> {
    geometry.validate()?;
    load.validate()?;
    validate_layup(layers, registry)?;
    if retained.len() != layers.len() {
        return Err(CalcError::Internal {
            message: format!("{} stiffness factors for {} layers", retained.len(), layers.len()),
        });
    }

    let t = geometry.wall_thickness_mm;
    if t < MIN_WALL_THICKNESS_MM {
        return Err(CalcError::numeric_degeneracy(
            "laminate solve",
            format!("wall thickness {} mm is below tolerance", t),
        ));
    }

    let thin_wall_valid = geometry.is_thin_wall(config.min_radius_thickness_ratio);
    if warn && !thin_wall_valid {
        tracing::warn!(
            ratio = geometry.radius_thickness_ratio(),
            min_ratio = config.min_radius_thickness_ratio,
            "radius/thickness below thin-wall range, membrane results are approximate"
        );
    }

    let stack = layup_thickness_mm(layers);
    if warn && ((stack - t) / t).abs() > config.thickness_tolerance {
        tracing::warn!(
            layup_mm = stack,
            wall_mm = t,
            "summed ply thickness does not match the wall thickness"
        );
    }

    let p = load.pressure_mpa();
    let r = geometry.mean_radius_mm();
    let nominal = NominalStress {
        mean_radius_mm: r,
        hoop_mpa: cylinder_hoop_stress(p, r, t),
        axial_mpa: cylinder_axial_stress(p, r, t),
        dome_mpa: sphere_membrane_stress(p, r, t),
    };
    let n_hoop = nominal.hoop_mpa * t;
    let n_axial = nominal.axial_mpa * t;

    // Membrane stiffness per layer, in vessel axes
    let mut stiffness = Vec::with_capacity(layers.len());
    for (layer, factor) in layers.iter().zip(retained) {
        let material = registry.get(&layer.material_id)?;
        let psi = (90.0 - layer.angle_deg).to_radians();
        let q = match layer.winding_type {
            WindingType::Helical => transformed_stiffness(&reduced_stiffness(material), psi),
            WindingType::Hoop => TransformedStiffness {
                q11: off_axis_modulus(material, psi),
                q12: 0.0,
                q22: 0.0,
                q16: 0.0,
                q26: 0.0,
                q66: 0.0,
            },
        };
        stiffness.push(scale_stiffness(&q, *factor));
    }

    let (mut a11, mut a12, mut a22) = (0.0, 0.0, 0.0);
    for (layer, q) in layers.iter().zip(&stiffness) {
        a11 += q.q11 * layer.thickness_mm;
        a12 += q.q12 * layer.thickness_mm;
        a22 += q.q22 * layer.thickness_mm;
    }

    if !(a11 + a22).is_finite() || a11 + a22 < f64::EPSILON {
        return Err(CalcError::numeric_degeneracy("laminate solve", "total layer stiffness is zero"));
    }
    let det = a11 * a22 - a12 * a12;
    if !det.is_finite() || det <= SINGULAR_TOLERANCE * a11 * a22 || a22 <= 0.0 {
        return Err(CalcError::numeric_degeneracy(
            "laminate solve",
            "no layer carries axial load (membrane stiffness is singular)",
        ));
    }
    let strain_hoop = (n_hoop * a22 - n_axial * a12) / det;
    let strain_axial = (n_axial * a11 - n_hoop * a12) / det;

    let n = layers.len();
    let states = layers
        .iter()
        .zip(&stiffness)
        .enumerate()
        .map(|(k, (layer, q))| {
            let g = config.gradient.factor(k, n);
            let (hoop, axial, shear) = q.stress(strain_hoop, strain_axial);
            let (hoop, axial, shear) = (hoop * g, axial * g, shear * g);
            let psi = (90.0 - layer.angle_deg).to_radians();
            let (sigma1, sigma2, tau12) = rotate_to_material_axes(hoop, axial, shear, psi);
            StressState {
                layer_index: layer.layer_index,
                angle_deg: layer.angle_deg,
                hoop_stress_mpa: hoop,
                axial_stress_mpa: axial,
                shear_stress_mpa: shear,
                sigma1_mpa: sigma1,
                sigma2_mpa: sigma2,
                tau12_mpa: tau12,
            }
        })
        .collect();

    tracing::debug!(
        pressure_bar = load.pressure_bar,
        hoop_mpa = nominal.hoop_mpa,
        axial_mpa = nominal.axial_mpa,
        strain_hoop,
        strain_axial,
        layers = n,
        "laminate solved"
    );

    Ok(LaminateAnalysis {
        pressure_bar: load.pressure_bar,
        nominal,
        strain_hoop,
        strain_axial,
        layers: states,
        thin_wall_valid,
    })
}

fn scale_stiffness(q: &TransformedStiffness, factor: f64) -> TransformedStiffness {
    TransformedStiffness {
        q11: q.q11 * factor,
        q12: q.q12 * factor,
        q22: q.q22 * factor,
        q16: q.q16 * factor,
        q26: q.q26 * factor,
        q66: q.q66 * factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradientCurve;
    use approx::assert_relative_eq;

    fn alternating(pairs: usize, helical_t: f64, hoop_t: f64) -> Vec<LayerSpec> {
        (0..pairs * 2)
            .map(|i| {
                if i % 2 == 0 {
                    LayerSpec::helical(i, 15.0, helical_t, "T700S")
                } else {
                    LayerSpec::hoop(i, hoop_t, "T700S")
                }
            })
            .collect()
    }

    fn uniform() -> StressConfig {
        StressConfig {
            gradient: GradientCurve::Uniform,
            ..StressConfig::default()
        }
    }

    #[test]
    fn test_nominal_stresses_at_mean_radius() {
        // Mean radius 75 mm, t = 15 mm, 700 bar → 350 / 175 MPa
        let registry = MaterialRegistry::standard();
        let geometry = VesselGeometry::cylinder(67.5, 15.0, 300.0);
        let layers = alternating(6, 1.0, 1.5);
        let result =
            analyze_laminate(&geometry, &layers, &LoadCase::operating(700.0), &registry, &uniform()).unwrap();
        assert_relative_eq!(result.nominal.hoop_mpa, 350.0, max_relative = 1e-12);
        assert_relative_eq!(result.nominal.axial_mpa, 175.0, max_relative = 1e-12);
        assert_eq!(result.nominal.hoop_mpa / result.nominal.axial_mpa, 2.0);
        assert!(!result.thin_wall_valid);

        let peak = result.max_fiber_stress().unwrap();
        assert!(result.layers.iter().all(|s| s.sigma1_mpa.abs() <= peak.sigma1_mpa.abs()));
    }

    #[test]
    fn test_resultants_balance_without_gradient() {
        let registry = MaterialRegistry::standard();
        let geometry = VesselGeometry::cylinder(200.0, 15.0, 800.0);
        let layers = alternating(6, 1.0, 1.5);
        let result =
            analyze_laminate(&geometry, &layers, &LoadCase::operating(700.0), &registry, &uniform()).unwrap();

        let n_hoop: f64 = result.layers.iter().zip(&layers).map(|(s, l)| s.hoop_stress_mpa * l.thickness_mm).sum();
        let n_axial: f64 = result.layers.iter().zip(&layers).map(|(s, l)| s.axial_stress_mpa * l.thickness_mm).sum();
        assert_relative_eq!(n_hoop, result.nominal.hoop_mpa * 15.0, max_relative = 1e-9);
        assert_relative_eq!(n_axial, result.nominal.axial_mpa * 15.0, max_relative = 1e-9);
        assert!(result.thin_wall_valid);
    }

    #[test]
    fn test_hoop_layers_carry_no_axial_load() {
        let registry = MaterialRegistry::standard();
        let geometry = VesselGeometry::cylinder(200.0, 15.0, 800.0);
        let layers = alternating(6, 1.0, 1.5);
        let states =
            compute_layer_stresses(&geometry, &layers, &LoadCase::operating(700.0), &registry, &uniform()).unwrap();
        for (state, layer) in states.iter().zip(&layers) {
            match layer.winding_type {
                WindingType::Hoop => {
                    assert_eq!(state.axial_stress_mpa, 0.0);
                    assert_eq!(state.shear_stress_mpa, 0.0);
                    assert!(state.sigma1_mpa > 0.0);
                }
                WindingType::Helical => {
                    assert!(state.axial_stress_mpa > 0.0);
                    assert!(state.shear_stress_mpa.abs() > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_gradient_decays_outwards() {
        let registry = MaterialRegistry::standard();
        let geometry = VesselGeometry::cylinder(200.0, 15.0, 800.0);
        let layers = alternating(6, 1.0, 1.5);
        let states = compute_layer_stresses(
            &geometry,
            &layers,
            &LoadCase::operating(700.0),
            &registry,
            &StressConfig::default(),
        )
        .unwrap();
        // Layers 1 and 11 are identical hoop layers
        let inner = states[1].sigma1_mpa;
        let outer = states[11].sigma1_mpa;
        assert!(outer < inner);
        assert_relative_eq!(outer / inner, 0.85 / (1.0 - 0.15 / 11.0), max_relative = 1e-9);
    }

    #[test]
    fn test_stresses_scale_with_pressure() {
        let registry = MaterialRegistry::standard();
        let geometry = VesselGeometry::cylinder(200.0, 15.0, 800.0);
        let layers = alternating(6, 1.0, 1.5);
        let config = StressConfig::default();
        let a = compute_layer_stresses(&geometry, &layers, &LoadCase::operating(350.0), &registry, &config).unwrap();
        let b = compute_layer_stresses(&geometry, &layers, &LoadCase::operating(700.0), &registry, &config).unwrap();
        for (sa, sb) in a.iter().zip(&b) {
            assert_relative_eq!(sa.scaled(2.0).sigma1_mpa, sb.sigma1_mpa, max_relative = 1e-9);
            assert_relative_eq!(sa.scaled(2.0).tau12_mpa, sb.tau12_mpa, max_relative = 1e-9, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_pressure_gives_zero_stress() {
        let registry = MaterialRegistry::standard();
        let geometry = VesselGeometry::cylinder(200.0, 15.0, 800.0);
        let layers = alternating(2, 3.0, 4.5);
        let states =
            compute_layer_stresses(&geometry, &layers, &LoadCase::operating(0.0), &registry, &uniform()).unwrap();
        assert!(states.iter().all(|s| s.sigma1_mpa == 0.0 && s.sigma2_mpa == 0.0));
    }

    #[test]
    fn test_zero_layers_rejected() {
        let registry = MaterialRegistry::standard();
        let geometry = VesselGeometry::cylinder(200.0, 15.0, 800.0);
        let err = compute_layer_stresses(&geometry, &[], &LoadCase::operating(700.0), &registry, &uniform())
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let registry = MaterialRegistry::standard();
        let geometry = VesselGeometry::cylinder(200.0, 15.0, 800.0);
        let layers = alternating(2, 3.0, 4.5);
        let config = uniform();

        let err = compute_layer_stresses(&geometry, &layers, &LoadCase::operating(-1.0), &registry, &config);
        assert_eq!(err.unwrap_err().error_code(), "INVALID_INPUT");

        let mut bad_angle = layers.clone();
        bad_angle[0].angle_deg = 95.0;
        let err = compute_layer_stresses(&geometry, &bad_angle, &LoadCase::operating(700.0), &registry, &config);
        assert_eq!(err.unwrap_err().error_code(), "INVALID_INPUT");

        let thin = VesselGeometry::cylinder(200.0, 0.0, 800.0);
        let err = compute_layer_stresses(&thin, &layers, &LoadCase::operating(700.0), &registry, &config);
        assert_eq!(err.unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_near_zero_wall_is_degenerate() {
        let registry = MaterialRegistry::standard();
        let geometry = VesselGeometry::cylinder(200.0, 1e-9, 800.0);
        let layers = vec![LayerSpec::helical(0, 15.0, 1e-9, "T700S")];
        let err = compute_layer_stresses(&geometry, &layers, &LoadCase::operating(700.0), &registry, &uniform())
            .unwrap_err();
        assert_eq!(err.error_code(), "NUMERIC_DEGENERACY");
    }

    #[test]
    fn test_hoop_only_layup_is_singular() {
        let registry = MaterialRegistry::standard();
        let geometry = VesselGeometry::cylinder(200.0, 3.0, 800.0);
        let layers = vec![LayerSpec::hoop(0, 1.5, "T700S"), LayerSpec::hoop(1, 1.5, "T700S")];
        let err = compute_layer_stresses(&geometry, &layers, &LoadCase::operating(700.0), &registry, &uniform())
            .unwrap_err();
        assert_eq!(err.error_code(), "NUMERIC_DEGENERACY");
    }

    #[test]
    fn test_retained_stiffness_shifts_load() {
        let registry = MaterialRegistry::standard();
        let geometry = VesselGeometry::cylinder(200.0, 15.0, 800.0);
        let layers = alternating(6, 1.0, 1.5);
        let load = LoadCase::operating(700.0);
        let config = uniform();
        let intact = analyze_laminate(&geometry, &layers, &load, &registry, &config).unwrap();

        let mut retained = vec![1.0; layers.len()];
        retained[0] = 0.01;
        let degraded =
            analyze_with_retained_stiffness(&geometry, &layers, &load, &registry, &config, &retained).unwrap();
        assert!(degraded.layers[0].sigma1_mpa < intact.layers[0].sigma1_mpa);
        assert!(degraded.layers[2].sigma1_mpa > intact.layers[2].sigma1_mpa);
        assert!(degraded.strain_axial > intact.strain_axial);
    }

    #[test]
    fn test_peak_component_keeps_sign() {
        let s = StressState {
            layer_index: 0,
            angle_deg: 15.0,
            hoop_stress_mpa: 0.0,
            axial_stress_mpa: 0.0,
            shear_stress_mpa: 0.0,
            sigma1_mpa: 10.0,
            sigma2_mpa: -40.0,
            tau12_mpa: 5.0,
        };
        assert_eq!(s.peak_component_mpa(), -40.0);
    }
}
