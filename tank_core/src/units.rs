//! # Unit Types
//!
//! Type-safe wrappers for the units used at the tank_core boundary. These are
//! plain f64 newtypes that serialize as bare numbers.
//!
//! ## Conventions
//!
//! - Pressure: bar at the boundary, MPa inside formulas (1 bar = 0.1 MPa)
//! - Stress: MPa
//! - Length: mm at the boundary, m for volume/mass calculations
//! - Angle: degrees at the boundary, radians inside formulas
//!
//! ## Example
//!
//! ```rust
//! use tank_core::units::{Bar, Mpa, Millimeters, Meters};
//!
//! let nwp = Bar(700.0);
//! let p: Mpa = nwp.into();
//! assert!((p.0 - 70.0).abs() < 1e-12);
//!
//! let r: Meters = Millimeters(250.0).into();
//! assert_eq!(r.0, 0.25);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// MPa per bar
pub const MPA_PER_BAR: f64 = 0.1;

// ============================================================================
// Pressure / Stress Units
// ============================================================================

/// Pressure in bar
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bar(pub f64);

/// Pressure or stress in megapascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mpa(pub f64);

impl From<Bar> for Mpa {
    fn from(bar: Bar) -> Self {
        Mpa(bar.0 * MPA_PER_BAR)
    }
}

impl From<Mpa> for Bar {
    fn from(mpa: Mpa) -> Self {
        Bar(mpa.0 / MPA_PER_BAR)
    }
}

/// Convert bar to MPa
pub fn bar_to_mpa(bar: f64) -> f64 {
    Mpa::from(Bar(bar)).0
}

/// Convert MPa to bar
pub fn mpa_to_bar(mpa: f64) -> f64 {
    Bar::from(Mpa(mpa)).0
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

/// Convert millimeters to meters
pub fn mm_to_m(mm: f64) -> f64 {
    Meters::from(Millimeters(mm)).0
}

/// Convert meters to millimeters
pub fn m_to_mm(m: f64) -> f64 {
    Millimeters::from(Meters(m)).0
}

// ============================================================================
// Angle Units
// ============================================================================

/// Angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

impl Degrees {
    /// Angle in radians
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Bar);
impl_arithmetic!(Mpa);
impl_arithmetic!(Millimeters);
impl_arithmetic!(Meters);
impl_arithmetic!(Degrees);

// ============================================================================
// Formatting
// ============================================================================

/// Format a pressure for display, e.g. `700.0 bar`
pub fn format_pressure(bar: f64) -> String {
    format!("{:.1} bar", bar)
}

/// Format a stress for display, e.g. `350.0 MPa`
pub fn format_stress(mpa: f64) -> String {
    format!("{:.1} MPa", mpa)
}

/// Format a percentage value, e.g. `12.3%`
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Format a probability, switching to scientific notation for small values
pub fn format_probability(p: f64) -> String {
    if p != 0.0 && p.abs() < 1e-3 {
        format!("{:.2e}", p)
    } else {
        format!("{:.4}", p)
    }
}
