//! Simulated annealing over an ensemble of candidate allocations.
//!
//! Plain simulated annealing with one extra acceptance criterion: a worse
//! candidate rejected by the Metropolis test may still be accepted with a
//! "tunneling" probability that shrinks with the score gap and move length.

pub mod acceptance;
pub mod annealer;
pub mod diagnostics;
pub mod ensemble;
pub mod schedule;

pub use acceptance::{Acceptance, AcceptanceRule};
pub use annealer::{optimize, AllocationResult, Translator};
pub use diagnostics::{IterationRecord, RunStats};
pub use ensemble::{CandidateState, Ensemble};
pub use schedule::CoolingSchedule;
