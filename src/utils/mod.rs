//! # Utilities Module
//!
//! Grid geometry and flood-fill helpers shared by the generators and the
//! transit planner.

pub mod flood_fill;
pub mod math;

pub use flood_fill::*;
pub use math::*;
