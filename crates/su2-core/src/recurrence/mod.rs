//! Generic three-term recurrence engine.
//!
//! `relation` holds the coefficient triple and single-step transitions,
//! `sequence` drives them across an index range in either direction, and
//! `stability` compares both directions against reference values.

pub mod racah;
pub mod relation;
pub mod sequence;
pub mod stability;

pub use racah::{reference_6j_sequence, Racah6jRecurrence};
pub use relation::{
    Coefficients, RecurrenceError, RecurrenceRelation, StepDirection, ThreeTermRecurrence,
};
pub use sequence::{compute_backward, compute_forward, ensure_finite, first_non_finite, Sequence};
pub use stability::{
    analyze_stability, local_condition_number, Recommendation, StabilityConfig, StabilityReport,
    StabilitySummary, CONDITION_EPSILON, DIRECTION_SEPARATION_FACTOR,
};
