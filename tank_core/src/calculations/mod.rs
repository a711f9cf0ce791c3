//! # Vessel Calculations
//!
//! Each calculation is a pure function over a geometry, a layup, a load and
//! an explicit [`MaterialRegistry`](crate::materials::MaterialRegistry):
//!
//! - inputs are the design record types from [`crate::design`]
//! - results are plain serializable structs
//! - failures are [`CalcError`](crate::errors::CalcError) values, never panics
//!
//! ## Pipeline
//!
//! ```text
//! stress ──► failure ──► burst pressure
//!    │          ▲
//!    └─► scf ───┘            reliability repeats the pipeline per sample
//! ```
//!
//! ## Available Calculations
//!
//! - [`stress`] - Laminate stress solver (per-layer stresses)
//! - [`failure`] - Tsai-Wu and Hashin indices, progressive failure, burst
//! - [`scf`] - Stress concentration factors by region
//! - [`reliability`] - Monte Carlo burst scatter and probability of failure
//! - [`mass`] - Volume, mass, cost and hydrogen capacity

pub mod failure;
pub mod mass;
pub mod reliability;
pub mod scf;
pub mod stress;

// Re-export commonly used types
pub use failure::{
    burst_pressure,
    evaluate_failure,
    evaluate_laminate,
    hashin_indices,
    progressive_failure,
    tsai_wu_index,
    BurstEstimate,
    FailureMode,
    FailureResult,
    LaminateFailure,
    ProgressiveFailure,
};
pub use mass::{mass_summary, MassSummary};
pub use reliability::{run_monte_carlo, ReliabilityInput, ReliabilitySummary};
pub use scf::{apply_scf, scan_regions, Region, ScfTable};
pub use stress::{analyze_laminate, compute_layer_stresses, LaminateAnalysis, StressState};
