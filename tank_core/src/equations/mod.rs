//! # Pressure Vessel and Lamina Equations
//!
//! Closed-form formulas used by the calculations. Keeping them in one place
//! makes them easy to check against textbook references.
//!
//! ## Modules
//!
//! - [`vessel`] - Thin-wall membrane stresses, dome volume and surface area
//! - [`lamina`] - Ply stiffness, off-axis modulus and stress transformation
//!
//! ## Sign Conventions
//!
//! - **Stress**: Positive in tension
//! - **Angles**: Winding angle measured from the vessel axis; transformations
//!   use ψ = 90° − angle (measured from the hoop direction)
//! - **Directions**: 1 = fiber, 2 = transverse; h = hoop, a = axial
//!
//! ## References
//!
//! - Roark's Formulas for Stress and Strain, 8th Edition, Table 13.1
//! - Jones, Mechanics of Composite Materials, 2nd Edition, Ch. 2 and 4
//! - Peters, Composite Filament Winding, ASM International

pub mod lamina;
pub mod vessel;

pub use lamina::{
    off_axis_modulus,
    reduced_stiffness,
    rotate_to_material_axes,
    transformed_stiffness,
    ReducedStiffness,
    TransformedStiffness,
};

pub use vessel::{
    cylinder_axial_stress,
    cylinder_hoop_stress,
    dome_surface_area,
    dome_volume,
    sphere_membrane_stress,
};
