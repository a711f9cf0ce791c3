//! # Analysis Configuration
//!
//! Tunable parameters for the calculations, loaded from TOML. Every section
//! and every field has a default, so an empty file is a valid configuration.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::config::{AnalysisConfig, GradientCurve};
//!
//! let config = AnalysisConfig::from_toml_str(r#"
//!     [stress.gradient]
//!     kind = "linear"
//!     outer_factor = 0.9
//!
//!     [reliability]
//!     sample_count = 2000
//! "#).unwrap();
//!
//! assert_eq!(config.stress.gradient, GradientCurve::Linear { outer_factor: 0.9 });
//! assert_eq!(config.reliability.sample_count, 2000);
//! assert_eq!(config.failure.interaction_coefficient, -0.5);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calculations::scf::ScfTable;
use crate::errors::{CalcError, CalcResult};

// ============================================================================
// Stress
// ============================================================================

/// Through-thickness stress gradient applied after load sharing.
///
/// Factors are 1.0 on the innermost layer and decay outwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GradientCurve {
    /// No gradient
    Uniform,
    /// Straight line from 1.0 (inner) to `outer_factor` (outer)
    Linear { outer_factor: f64 },
    /// `ratio^k`, never below `floor`
    Geometric { ratio: f64, floor: f64 },
    /// Explicit factors per layer; the last entry repeats for deeper stacks
    Table { factors: Vec<f64> },
}

impl Default for GradientCurve {
    fn default() -> Self {
        GradientCurve::Linear { outer_factor: 0.85 }
    }
}

impl GradientCurve {
    /// Factor for layer `k` (0 = innermost) of `n`
    pub fn factor(&self, k: usize, n: usize) -> f64 {
        match self {
            GradientCurve::Uniform => 1.0,
            GradientCurve::Linear { outer_factor } => {
                if n <= 1 {
                    1.0
                } else {
                    1.0 - (1.0 - outer_factor) * k as f64 / (n - 1) as f64
                }
            }
            GradientCurve::Geometric { ratio, floor } => ratio.powi(k as i32).max(*floor),
            GradientCurve::Table { factors } => match factors.get(k).or(factors.last()) {
                Some(f) => *f,
                None => 1.0,
            },
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        let in_unit = |v: f64| v.is_finite() && v > 0.0 && v <= 1.0;
        match self {
            GradientCurve::Uniform => Ok(()),
            GradientCurve::Linear { outer_factor } => {
                if in_unit(*outer_factor) {
                    Ok(())
                } else {
                    Err(CalcError::config_error("stress.gradient.outer_factor", "Must be in (0, 1]"))
                }
            }
            GradientCurve::Geometric { ratio, floor } => {
                if !in_unit(*ratio) {
                    return Err(CalcError::config_error("stress.gradient.ratio", "Must be in (0, 1]"));
                }
                if !in_unit(*floor) {
                    return Err(CalcError::config_error("stress.gradient.floor", "Must be in (0, 1]"));
                }
                Ok(())
            }
            GradientCurve::Table { factors } => {
                if factors.is_empty() {
                    return Err(CalcError::config_error("stress.gradient.factors", "Table must not be empty"));
                }
                if factors.iter().any(|f| !in_unit(*f)) {
                    return Err(CalcError::config_error("stress.gradient.factors", "Every factor must be in (0, 1]"));
                }
                Ok(())
            }
        }
    }
}

/// `[stress]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub gradient: GradientCurve,
    /// Below this inner radius / wall ratio results are flagged as outside thin-wall theory
    pub min_radius_thickness_ratio: f64,
    /// Allowed relative mismatch between summed ply thickness and wall thickness
    pub thickness_tolerance: f64,
}

impl Default for StressConfig {
    fn default() -> Self {
        StressConfig {
            gradient: GradientCurve::default(),
            min_radius_thickness_ratio: 10.0,
            thickness_tolerance: 0.05,
        }
    }
}

// ============================================================================
// Failure
// ============================================================================

/// How a burst pressure is derived from a stress state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BurstCriterion {
    /// First-ply failure by Tsai-Wu, `P / max index`
    TsaiWu,
    /// First-ply failure by Hashin (any mode), found by bisection
    Hashin,
    /// Fiber rupture by Hashin fiber modes, `P / sqrt(max fiber index)`.
    /// Matches the meaning of `required_burst_ratio`.
    #[default]
    HashinFiber,
}

impl BurstCriterion {
    pub fn display_name(&self) -> &'static str {
        match self {
            BurstCriterion::TsaiWu => "Tsai-Wu first-ply",
            BurstCriterion::Hashin => "Hashin first-ply",
            BurstCriterion::HashinFiber => "Hashin fiber rupture",
        }
    }
}

/// `[failure]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureConfig {
    /// Normalised Tsai-Wu interaction coefficient k, F12 = k·sqrt(F11·F22)
    pub interaction_coefficient: f64,
    /// Stiffness retained by a failed ply during progressive failure
    pub degradation_factor: f64,
    pub burst_criterion: BurstCriterion,
}

impl Default for FailureConfig {
    fn default() -> Self {
        FailureConfig {
            interaction_coefficient: -0.5,
            degradation_factor: 0.01,
            burst_criterion: BurstCriterion::HashinFiber,
        }
    }
}

// ============================================================================
// Reliability
// ============================================================================

/// Sampling distribution for an uncertain input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    #[default]
    Normal,
    Lognormal,
    Uniform,
}

/// Distribution plus coefficient of variation (std dev / mean)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Uncertainty {
    #[serde(default)]
    pub distribution: Distribution,
    pub cov: f64,
}

impl Uncertainty {
    pub fn normal(cov: f64) -> Self {
        Uncertainty {
            distribution: Distribution::Normal,
            cov,
        }
    }

    /// No scatter
    pub fn none() -> Self {
        Self::normal(0.0)
    }

    fn validate(&self, key: &str) -> CalcResult<()> {
        if !self.cov.is_finite() || self.cov < 0.0 {
            return Err(CalcError::config_error(key, "CoV must be a non-negative number"));
        }
        // Uniform with cov ≥ 1/sqrt(3) can reach zero or below
        if self.distribution == Distribution::Uniform && self.cov * 3f64.sqrt() >= 1.0 {
            return Err(CalcError::config_error(key, "Uniform CoV must be below 0.577"));
        }
        if self.cov >= 1.0 {
            return Err(CalcError::config_error(key, "CoV must be below 1.0"));
        }
        Ok(())
    }
}

/// `[reliability.uncertainties]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Uncertainties {
    /// Scales Xt and Xc together
    pub fiber_strength: Uncertainty,
    /// Scales Yt, Yc and S together
    pub matrix_strength: Uncertainty,
    /// Scales E1, E2 and G12 together
    pub modulus: Uncertainty,
    /// Drawn independently per layer
    pub ply_thickness: Uncertainty,
    pub inner_radius: Uncertainty,
    /// Absolute scatter of each layer's winding angle
    pub winding_angle_std_dev_deg: f64,
}

impl Default for Uncertainties {
    fn default() -> Self {
        Uncertainties {
            fiber_strength: Uncertainty::normal(0.05),
            matrix_strength: Uncertainty::normal(0.08),
            modulus: Uncertainty::normal(0.03),
            ply_thickness: Uncertainty::normal(0.02),
            inner_radius: Uncertainty::normal(0.005),
            winding_angle_std_dev_deg: 0.5,
        }
    }
}

impl Uncertainties {
    /// Every input at its nominal value
    pub fn none() -> Self {
        Uncertainties {
            fiber_strength: Uncertainty::none(),
            matrix_strength: Uncertainty::none(),
            modulus: Uncertainty::none(),
            ply_thickness: Uncertainty::none(),
            inner_radius: Uncertainty::none(),
            winding_angle_std_dev_deg: 0.0,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        self.fiber_strength.validate("reliability.uncertainties.fiber_strength")?;
        self.matrix_strength.validate("reliability.uncertainties.matrix_strength")?;
        self.modulus.validate("reliability.uncertainties.modulus")?;
        self.ply_thickness.validate("reliability.uncertainties.ply_thickness")?;
        self.inner_radius.validate("reliability.uncertainties.inner_radius")?;
        if !self.winding_angle_std_dev_deg.is_finite() || self.winding_angle_std_dev_deg < 0.0 {
            return Err(CalcError::config_error(
                "reliability.uncertainties.winding_angle_std_dev_deg",
                "Must be a non-negative number",
            ));
        }
        Ok(())
    }
}

/// `[reliability]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliabilityConfig {
    pub sample_count: usize,
    pub seed: u64,
    /// Two-sided confidence level for reported intervals
    pub confidence_level: f64,
    /// Default limit pressure as a multiple of the working pressure
    pub required_burst_ratio: f64,
    pub uncertainties: Uncertainties,
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        ReliabilityConfig {
            sample_count: 10_000,
            seed: 42,
            confidence_level: 0.95,
            required_burst_ratio: 2.25,
            uncertainties: Uncertainties::default(),
        }
    }
}

// ============================================================================
// Top Level
// ============================================================================

/// Complete analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub stress: StressConfig,
    pub scf: ScfTable,
    pub failure: FailureConfig,
    pub reliability: ReliabilityConfig,
}

impl AnalysisConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> CalcResult<Self> {
        let config: AnalysisConfig =
            toml::from_str(content).map_err(|e| CalcError::config_error("toml", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> CalcResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML (used to write a starter file).
    pub fn to_toml_string(&self) -> CalcResult<String> {
        toml::to_string_pretty(self).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        self.stress.gradient.validate()?;
        if !self.stress.min_radius_thickness_ratio.is_finite() || self.stress.min_radius_thickness_ratio < 0.0 {
            return Err(CalcError::config_error(
                "stress.min_radius_thickness_ratio",
                "Must be a non-negative number",
            ));
        }
        if !self.stress.thickness_tolerance.is_finite() || self.stress.thickness_tolerance < 0.0 {
            return Err(CalcError::config_error(
                "stress.thickness_tolerance",
                "Must be a non-negative number",
            ));
        }

        self.scf.validate()?;

        let k = self.failure.interaction_coefficient;
        if !(-1.0..0.0).contains(&k) {
            return Err(CalcError::config_error(
                "failure.interaction_coefficient",
                "Must be in [-1, 0)",
            ));
        }
        let d = self.failure.degradation_factor;
        if !(d > 0.0 && d <= 1.0) {
            return Err(CalcError::config_error("failure.degradation_factor", "Must be in (0, 1]"));
        }

        let r = &self.reliability;
        if r.sample_count < 1 {
            return Err(CalcError::config_error("reliability.sample_count", "Must be at least 1"));
        }
        if !(r.confidence_level > 0.0 && r.confidence_level < 1.0) {
            return Err(CalcError::config_error("reliability.confidence_level", "Must be in (0, 1)"));
        }
        if !r.required_burst_ratio.is_finite() || r.required_burst_ratio <= 0.0 {
            return Err(CalcError::config_error("reliability.required_burst_ratio", "Must be positive"));
        }
        r.uncertainties.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reliability.required_burst_ratio, 2.25);
        assert_eq!(config.failure.degradation_factor, 0.01);
        assert_eq!(config.failure.burst_criterion, BurstCriterion::HashinFiber);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_linear_gradient() {
        let g = GradientCurve::Linear { outer_factor: 0.85 };
        assert_eq!(g.factor(0, 5), 1.0);
        assert_relative_eq!(g.factor(4, 5), 0.85, max_relative = 1e-12);
        assert_relative_eq!(g.factor(2, 5), 0.925, max_relative = 1e-12);
        assert_eq!(g.factor(0, 1), 1.0);
    }

    #[test]
    fn test_geometric_and_table_gradients() {
        let g = GradientCurve::Geometric { ratio: 0.9, floor: 0.7 };
        assert_eq!(g.factor(0, 10), 1.0);
        assert_relative_eq!(g.factor(1, 10), 0.9);
        assert_eq!(g.factor(9, 10), 0.7);

        let t = GradientCurve::Table { factors: vec![1.0, 0.95, 0.9] };
        assert_eq!(t.factor(1, 6), 0.95);
        assert_eq!(t.factor(5, 6), 0.9);
        assert_eq!(GradientCurve::Uniform.factor(7, 8), 1.0);
    }

    #[test]
    fn test_gradient_validation() {
        assert!(GradientCurve::Linear { outer_factor: 1.2 }.validate().is_err());
        assert!(GradientCurve::Linear { outer_factor: 0.0 }.validate().is_err());
        assert!(GradientCurve::Table { factors: vec![] }.validate().is_err());
        assert!(GradientCurve::Table { factors: vec![1.0, -0.1] }.validate().is_err());
        assert!(GradientCurve::Geometric { ratio: 0.95, floor: 0.5 }.validate().is_ok());
    }

    #[test]
    fn test_parse_sections() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            [stress.gradient]
            kind = "table"
            factors = [1.0, 0.9]

            [scf]
            severity = 0.5

            [failure]
            interaction_coefficient = -1.0
            burst_criterion = "tsai-wu"

            [reliability]
            seed = 7
            confidence_level = 0.99

            [reliability.uncertainties]
            winding_angle_std_dev_deg = 1.0

            [reliability.uncertainties.fiber_strength]
            distribution = "lognormal"
            cov = 0.07
            "#,
        )
        .unwrap();
        assert_eq!(config.scf.severity, 0.5);
        assert_eq!(config.failure.burst_criterion, BurstCriterion::TsaiWu);
        assert_eq!(config.reliability.seed, 7);
        assert_eq!(config.reliability.uncertainties.fiber_strength.distribution, Distribution::Lognormal);
        // Untouched fields keep their defaults
        assert_eq!(config.reliability.uncertainties.modulus, Uncertainty::normal(0.03));
        assert_eq!(config.reliability.sample_count, 10_000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad = [
            "[failure]\ninteraction_coefficient = 0.0",
            "[failure]\ninteraction_coefficient = -1.5",
            "[failure]\ndegradation_factor = 0.0",
            "[reliability]\nsample_count = 0",
            "[reliability]\nconfidence_level = 1.0",
            "[reliability.uncertainties.modulus]\ncov = -0.1",
            "[reliability.uncertainties.modulus]\ndistribution = \"uniform\"\ncov = 0.6",
            "[stress]\nmin_radius_thickness_ratio = -1.0",
        ];
        for toml in bad {
            let err = AnalysisConfig::from_toml_str(toml).unwrap_err();
            assert_eq!(err.error_code(), "CONFIG_ERROR", "accepted: {}", toml);
        }
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AnalysisConfig::default();
        let toml = config.to_toml_string().unwrap();
        let parsed = AnalysisConfig::from_toml_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalysisConfig::load(Path::new("/nonexistent/tank.toml")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
