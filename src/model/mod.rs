//! Objective and feasibility model built from a `ModelSpec`.

pub mod constraints;
pub mod utility;

pub use constraints::{normalize_budget, ConstraintSet, ConstraintViolation};
pub use utility::{TermContribution, UtilityFunction};
