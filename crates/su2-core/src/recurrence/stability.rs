use super::relation::{RecurrenceError, RecurrenceRelation};
use super::sequence::{compute_backward, compute_forward, ensure_finite, Sequence};
use crate::numerics::stable_mean;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One direction is recommended only when its worst error is below this
/// fraction of the other direction's worst error (a 10x separation).
pub const DIRECTION_SEPARATION_FACTOR: f64 = 0.1;

/// Guard added to `|c(k)|` in the local condition estimate.
pub const CONDITION_EPSILON: f64 = 1.0e-15;

/// Numeric knobs of a stability analysis, passed explicitly per call.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct StabilityConfig {
    #[serde(rename = "conditionEpsilon", default = "default_condition_epsilon")]
    pub condition_epsilon: f64,
    #[serde(rename = "separationFactor", default = "default_separation_factor")]
    pub separation_factor: f64,
}

fn default_condition_epsilon() -> f64 {
    CONDITION_EPSILON
}

fn default_separation_factor() -> f64 {
    DIRECTION_SEPARATION_FACTOR
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            condition_epsilon: CONDITION_EPSILON,
            separation_factor: DIRECTION_SEPARATION_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Forward,
    Backward,
    Both,
}

impl Recommendation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Both => "both",
        }
    }
}

impl Display for Recommendation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Reduced statistics of a [`StabilityReport`], the values downstream
/// reporting consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StabilitySummary {
    pub max_forward_error: f64,
    pub max_backward_error: f64,
    pub mean_condition_number: Option<f64>,
    pub recommended_direction: Recommendation,
}

/// Both computed sequences with their per-index errors and interior
/// condition numbers. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityReport {
    forward: Sequence,
    backward: Sequence,
    forward_errors: Vec<f64>,
    backward_errors: Vec<f64>,
    condition_numbers: Vec<f64>,
    separation_factor: f64,
}

impl StabilityReport {
    pub fn forward(&self) -> &Sequence {
        &self.forward
    }

    pub fn backward(&self) -> &Sequence {
        &self.backward
    }

    /// First overflowed or NaN entry of the forward sequence, then the
    /// backward sequence, then the error vectors (a non-finite reference).
    pub fn ensure_finite(&self) -> Result<(), RecurrenceError> {
        self.forward.ensure_finite()?;
        self.backward.ensure_finite()?;
        ensure_finite(&self.forward_errors)?;
        ensure_finite(&self.backward_errors)
    }

    pub fn forward_errors(&self) -> &[f64] {
        &self.forward_errors
    }

    pub fn backward_errors(&self) -> &[f64] {
        &self.backward_errors
    }

    /// Condition estimates for `k = 1..k_max-1`; entry `i` belongs to index `i + 1`.
    pub fn condition_numbers(&self) -> &[f64] {
        &self.condition_numbers
    }

    pub fn max_forward_error(&self) -> f64 {
        max_propagating_nan(&self.forward_errors)
    }

    pub fn max_backward_error(&self) -> f64 {
        max_propagating_nan(&self.backward_errors)
    }

    /// `None` when the range has no interior index (`k_max == 1`).
    pub fn mean_condition_number(&self) -> Option<f64> {
        stable_mean(&self.condition_numbers)
    }

    /// A NaN error on either side makes both comparisons false, so such a
    /// report never favours a direction.
    pub fn recommend_direction(&self) -> Recommendation {
        let forward = self.max_forward_error();
        let backward = self.max_backward_error();

        if forward < self.separation_factor * backward {
            Recommendation::Forward
        } else if backward < self.separation_factor * forward {
            Recommendation::Backward
        } else {
            Recommendation::Both
        }
    }

    pub fn summary(&self) -> StabilitySummary {
        StabilitySummary {
            max_forward_error: self.max_forward_error(),
            max_backward_error: self.max_backward_error(),
            mean_condition_number: self.mean_condition_number(),
            recommended_direction: self.recommend_direction(),
        }
    }
}

fn max_propagating_nan(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |acc, &value| {
        if acc.is_nan() || value.is_nan() {
            f64::NAN
        } else {
            acc.max(value)
        }
    })
}

/// `max(|a|, |b|, |c|) / (|c| + epsilon)` at index `k`.
///
/// A coarse amplification proxy for the forward step, not an error bound.
pub fn local_condition_number<R>(relation: &R, k: usize, epsilon: f64) -> f64
where
    R: RecurrenceRelation + ?Sized,
{
    let coefficients = relation.coefficients(k);
    coefficients.max_magnitude() / (coefficients.c.abs() + epsilon)
}

fn absolute_errors(computed: &[f64], reference: &[f64]) -> Vec<f64> {
    computed
        .iter()
        .zip(reference)
        .map(|(value, exact)| (value - exact).abs())
        .collect()
}

/// Runs both recursion directions against `reference_values` and measures
/// their per-index errors.
///
/// Forward recursion starts from `y0`, `y1`. Backward recursion starts from
/// the two highest reference values, so its error is independent of the
/// forward pass. Either direction failing fails the whole analysis.
pub fn analyze_stability<R>(
    relation: &R,
    reference_values: &[f64],
    y0: f64,
    y1: f64,
    config: &StabilityConfig,
) -> Result<StabilityReport, RecurrenceError>
where
    R: RecurrenceRelation + ?Sized,
{
    let k_max = reference_values.len().saturating_sub(1);
    if k_max < 1 {
        return Err(RecurrenceError::InvalidRange { k_max });
    }

    let forward = compute_forward(relation, y0, y1, k_max)?;
    let backward = compute_backward(
        relation,
        reference_values[k_max],
        reference_values[k_max - 1],
        k_max,
    )?;

    let forward_errors = absolute_errors(forward.as_slice(), reference_values);
    let backward_errors = absolute_errors(backward.as_slice(), reference_values);
    let condition_numbers = (1..k_max)
        .map(|k| local_condition_number(relation, k, config.condition_epsilon))
        .collect();

    let report = StabilityReport {
        forward,
        backward,
        forward_errors,
        backward_errors,
        condition_numbers,
        separation_factor: config.separation_factor,
    };

    tracing::debug!(
        k_max,
        max_forward_error = report.max_forward_error(),
        max_backward_error = report.max_backward_error(),
        recommendation = %report.recommend_direction(),
        "recurrence stability analysed"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::{
        analyze_stability, local_condition_number, Recommendation, StabilityConfig,
        CONDITION_EPSILON, DIRECTION_SEPARATION_FACTOR,
    };
    use crate::recurrence::{
        compute_forward, RecurrenceError, StepDirection, ThreeTermRecurrence,
    };

    #[test]
    fn fibonacci_is_exact_in_both_directions() {
        let fibonacci = ThreeTermRecurrence::new(|_| -1.0, |_| -1.0, |_| 1.0);
        let reference = [0.0, 1.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0];

        let report = analyze_stability(&fibonacci, &reference, 0.0, 1.0, &StabilityConfig::default())
            .expect("analysis should succeed");

        assert!(report.max_forward_error() < 1.0e-10);
        assert!(report.max_backward_error() < 1.0e-10);
        assert_eq!(report.forward_errors().len(), reference.len());
        assert_eq!(report.condition_numbers().len(), reference.len() - 2);
    }

    #[test]
    fn self_generated_reference_never_recommends_backward() {
        let relation = ThreeTermRecurrence::new(|_| 1.0, |_| -2.0, |_| 1.0);
        let reference = compute_forward(&relation, 1.0, 2.0, 10).expect("forward should succeed");

        let report = analyze_stability(
            &relation,
            reference.as_slice(),
            1.0,
            2.0,
            &StabilityConfig::default(),
        )
        .expect("analysis should succeed");

        assert_eq!(report.max_forward_error(), 0.0);
        assert_ne!(report.recommend_direction(), Recommendation::Backward);
    }

    #[test]
    fn condition_numbers_are_bounded_for_second_difference() {
        let relation = ThreeTermRecurrence::new(|_| 1.0, |_| -2.0, |_| 1.0);
        let reference = compute_forward(&relation, 1.0, 2.0, 5).expect("forward should succeed");
        let report = analyze_stability(
            &relation,
            reference.as_slice(),
            1.0,
            2.0,
            &StabilityConfig::default(),
        )
        .expect("analysis should succeed");

        assert!(!report.condition_numbers().is_empty());
        assert!(report.condition_numbers().iter().all(|value| *value >= 0.0));
        let mean = report.mean_condition_number().expect("interior indices exist");
        assert!(mean > 0.0 && mean < 100.0);
        assert!((mean - 2.0).abs() < 1.0e-12);
    }

    #[test]
    fn recommendation_follows_ten_fold_separation() {
        // Solutions 10^k and 0.1^k. Tracking the recessive 0.1^k forward
        // amplifies a seed error; backward from exact tail values damps it.
        let relation = ThreeTermRecurrence::new(|_| 1.0, |_| -10.1, |_| 1.0);
        let exact: Vec<f64> = (0..12).map(|k| 0.1_f64.powi(k)).collect();

        let report = analyze_stability(
            &relation,
            &exact,
            exact[0],
            exact[1] * (1.0 + 1.0e-6),
            &StabilityConfig::default(),
        )
        .expect("analysis should succeed");

        assert!(report.max_forward_error() > 1.0);
        assert!(report.max_backward_error() < 1.0e-10);
        assert_eq!(report.recommend_direction(), Recommendation::Backward);
        assert_eq!(report.summary().recommended_direction, Recommendation::Backward);
    }

    #[test]
    fn forward_is_recommended_when_backward_amplifies() {
        // Dominant solution 10^k: forward from exact seeds is stable, backward
        // from a perturbed tail drifts toward the recessive solution.
        let relation = ThreeTermRecurrence::new(|_| 1.0, |_| -10.1, |_| 1.0);
        let exact: Vec<f64> = (0..12).map(|k| 10.0_f64.powi(k)).collect();
        let mut reference = exact.clone();
        reference[10] *= 1.0 + 1.0e-3;

        let report = analyze_stability(
            &relation,
            &reference,
            exact[0],
            exact[1],
            &StabilityConfig::default(),
        )
        .expect("analysis should succeed");

        assert!(report.backward_errors()[0] > 10.0 * report.forward_errors()[0]);
        assert_eq!(report.recommend_direction(), Recommendation::Forward);
    }

    #[test]
    fn comparable_errors_recommend_both() {
        let relation = ThreeTermRecurrence::new(|_| -1.0, |_| -1.0, |_| 1.0);
        let reference = [0.0, 1.0, 1.0, 2.0, 3.0, 5.0];
        let report = analyze_stability(&relation, &reference, 0.0, 1.0, &StabilityConfig::default())
            .expect("analysis should succeed");

        assert_eq!(report.recommend_direction(), Recommendation::Both);
    }

    #[test]
    fn separation_factor_is_configurable() {
        let relation = ThreeTermRecurrence::new(|_| 1.0, |_| -10.1, |_| 1.0);
        let exact: Vec<f64> = (0..8).map(|k| 0.1_f64.powi(k)).collect();
        let config = StabilityConfig {
            separation_factor: 0.0,
            ..StabilityConfig::default()
        };

        let report = analyze_stability(&relation, &exact, exact[0], exact[1] * 1.01, &config)
            .expect("analysis should succeed");
        assert_eq!(report.recommend_direction(), Recommendation::Both);
        assert_eq!(DIRECTION_SEPARATION_FACTOR, 0.1);
    }

    #[test]
    fn single_step_range_has_no_mean_condition_number() {
        let relation = ThreeTermRecurrence::new(|_| 1.0, |_| 1.0, |_| 1.0);
        let report = analyze_stability(&relation, &[1.0, 2.0], 1.0, 2.0, &StabilityConfig::default())
            .expect("analysis should succeed");

        assert!(report.condition_numbers().is_empty());
        assert_eq!(report.mean_condition_number(), None);
    }

    #[test]
    fn short_reference_is_an_invalid_range() {
        let relation = ThreeTermRecurrence::new(|_| 1.0, |_| 1.0, |_| 1.0);
        let config = StabilityConfig::default();
        assert_eq!(
            analyze_stability(&relation, &[1.0], 1.0, 2.0, &config),
            Err(RecurrenceError::InvalidRange { k_max: 0 })
        );
        assert_eq!(
            analyze_stability(&relation, &[], 1.0, 2.0, &config),
            Err(RecurrenceError::InvalidRange { k_max: 0 })
        );
    }

    #[test]
    fn backward_failure_propagates() {
        let relation = ThreeTermRecurrence::new(|k| if k == 2 { 0.0 } else { 1.0 }, |_| -2.0, |_| 1.0);
        let reference = [1.0, 2.0, 3.0, 4.0, 5.0];
        let error = analyze_stability(&relation, &reference, 1.0, 2.0, &StabilityConfig::default())
            .expect_err("a(2) = 0 should fail the analysis");

        assert_eq!(
            error,
            RecurrenceError::DegenerateCoefficient {
                direction: StepDirection::Backward,
                index: 2,
            }
        );
    }

    #[test]
    fn condition_estimate_guards_zero_c() {
        let relation = ThreeTermRecurrence::new(|_| 2.0, |_| -3.0, |_| 0.0);
        let value = local_condition_number(&relation, 1, CONDITION_EPSILON);
        assert!(value.is_finite());
        assert!((value - 3.0 / CONDITION_EPSILON).abs() / value < 1.0e-12);
    }

    #[test]
    fn nan_errors_never_pick_a_direction() {
        let relation = ThreeTermRecurrence::new(|_| 1.0, |_| -2.0, |_| 1.0);
        let reference = [1.0, 2.0, f64::NAN, 4.0];
        let report = analyze_stability(&relation, &reference, 1.0, 2.0, &StabilityConfig::default())
            .expect("steps succeed even with a NaN reference");

        assert!(report.max_forward_error().is_nan());
        assert_eq!(report.recommend_direction(), Recommendation::Both);
        assert!(matches!(
            report.ensure_finite(),
            Err(RecurrenceError::NonFiniteResult { .. })
        ));
    }

    #[test]
    fn overflow_is_kept_and_reported_by_ensure_finite() {
        let relation = ThreeTermRecurrence::new(|_| 1.0, |_| -1.0e200, |_| 1.0);
        let reference = [1.0; 6];
        let report = analyze_stability(&relation, &reference, 1.0, 1.0, &StabilityConfig::default())
            .expect("no coefficient vanishes");

        assert_eq!(report.forward()[3], f64::INFINITY);
        assert_eq!(
            report.ensure_finite(),
            Err(RecurrenceError::NonFiniteResult {
                index: 3,
                value: f64::INFINITY,
            })
        );
    }
}
