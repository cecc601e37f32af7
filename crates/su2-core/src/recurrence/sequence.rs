use super::relation::{RecurrenceError, RecurrenceRelation, StepDirection};
use std::ops::Index;

/// Values `y[0..=k_max]` produced by exactly one recursion direction.
///
/// Storage is always in ascending index order, whichever direction built it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    direction: StepDirection,
    values: Vec<f64>,
}

impl Sequence {
    pub const fn direction(&self) -> StepDirection {
        self.direction
    }

    pub fn k_max(&self) -> usize {
        self.values.len() - 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// `(y[k_max], y[k_max - 1])`, the seeds a backward pass would start from.
    pub fn tail_seeds(&self) -> (f64, f64) {
        let k_max = self.k_max();
        (self.values[k_max], self.values[k_max - 1])
    }

    pub fn ensure_finite(&self) -> Result<(), RecurrenceError> {
        ensure_finite(&self.values)
    }
}

impl Index<usize> for Sequence {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

fn validate_range(k_max: usize) -> Result<(), RecurrenceError> {
    if k_max < 1 {
        return Err(RecurrenceError::InvalidRange { k_max });
    }
    Ok(())
}

/// Forward recursion from the low-index seeds `y[0]`, `y[1]`.
pub fn compute_forward<R>(
    relation: &R,
    y0: f64,
    y1: f64,
    k_max: usize,
) -> Result<Sequence, RecurrenceError>
where
    R: RecurrenceRelation + ?Sized,
{
    validate_range(k_max)?;

    let mut values = Vec::with_capacity(k_max + 1);
    values.push(y0);
    values.push(y1);
    for k in 1..k_max {
        let next = relation.forward_step(k, values[k - 1], values[k])?;
        values.push(next);
    }

    Ok(Sequence {
        direction: StepDirection::Forward,
        values,
    })
}

/// Backward recursion from the high-index seeds `y[k_max]`, `y[k_max - 1]`.
///
/// The result is filled from the top index down, so it comes back in
/// ascending order without a reversal pass.
pub fn compute_backward<R>(
    relation: &R,
    y_final: f64,
    y_final_minus_1: f64,
    k_max: usize,
) -> Result<Sequence, RecurrenceError>
where
    R: RecurrenceRelation + ?Sized,
{
    validate_range(k_max)?;

    let mut values = vec![0.0; k_max + 1];
    values[k_max] = y_final;
    values[k_max - 1] = y_final_minus_1;
    for k in (1..k_max).rev() {
        values[k - 1] = relation.backward_step(k, values[k], values[k + 1])?;
    }

    Ok(Sequence {
        direction: StepDirection::Backward,
        values,
    })
}

pub fn first_non_finite(values: &[f64]) -> Option<usize> {
    values.iter().position(|value| !value.is_finite())
}

/// Reports the first overflowed or NaN entry. Values are never clamped.
pub fn ensure_finite(values: &[f64]) -> Result<(), RecurrenceError> {
    match first_non_finite(values) {
        Some(index) => Err(RecurrenceError::NonFiniteResult {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{compute_backward, compute_forward, ensure_finite, first_non_finite};
    use crate::recurrence::{RecurrenceError, StepDirection, ThreeTermRecurrence};

    #[test]
    fn forward_reproduces_fibonacci_numbers() {
        let fibonacci = ThreeTermRecurrence::new(|_| -1.0, |_| -1.0, |_| 1.0);
        let sequence = compute_forward(&fibonacci, 0.0, 1.0, 9).expect("forward should succeed");

        assert_eq!(sequence.direction(), StepDirection::Forward);
        assert_eq!(
            sequence.as_slice(),
            &[0.0, 1.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0]
        );
    }

    #[test]
    fn forward_handles_geometric_growth_with_zero_a() {
        let ratio = 2.0;
        let geometric = ThreeTermRecurrence::new(|_| 0.0, move |_| -ratio, |_| 1.0);
        let sequence = compute_forward(&geometric, 1.0, ratio, 6).expect("forward should succeed");

        for (k, value) in sequence.as_slice().iter().enumerate() {
            assert!((value - ratio.powi(k as i32)).abs() < 1.0e-10);
        }
    }

    #[test]
    fn backward_returns_ascending_order() {
        let relation = ThreeTermRecurrence::new(|_| 1.0, |_| -2.0, |_| 1.0);
        let sequence = compute_backward(&relation, 6.0, 5.0, 5).expect("backward should succeed");

        assert_eq!(sequence.direction(), StepDirection::Backward);
        assert_eq!(sequence.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(sequence.tail_seeds(), (6.0, 5.0));
    }

    #[test]
    fn minimal_range_returns_seeds_only() {
        let relation = ThreeTermRecurrence::new(|_| 0.0, |_| 1.0, |_| 0.0);
        let forward = compute_forward(&relation, 2.0, 3.0, 1).expect("no step is taken");
        let backward = compute_backward(&relation, 3.0, 2.0, 1).expect("no step is taken");

        assert_eq!(forward.as_slice(), &[2.0, 3.0]);
        assert_eq!(backward.as_slice(), &[2.0, 3.0]);
    }

    #[test]
    fn zero_k_max_is_rejected_in_both_directions() {
        let relation = ThreeTermRecurrence::new(|_| 1.0, |_| 1.0, |_| 1.0);
        assert_eq!(
            compute_forward(&relation, 0.0, 1.0, 0),
            Err(RecurrenceError::InvalidRange { k_max: 0 })
        );
        assert_eq!(
            compute_backward(&relation, 0.0, 1.0, 0),
            Err(RecurrenceError::InvalidRange { k_max: 0 })
        );
    }

    #[test]
    fn forward_stops_at_first_degenerate_index() {
        let relation = ThreeTermRecurrence::new(|_| 1.0, |_| 1.0, |k| if k == 3 { 0.0 } else { 1.0 });
        let error = compute_forward(&relation, 1.0, 1.0, 8).expect_err("c(3) = 0 should stop");
        assert_eq!(
            error,
            RecurrenceError::DegenerateCoefficient {
                direction: StepDirection::Forward,
                index: 3,
            }
        );
    }

    #[test]
    fn backward_stops_at_first_degenerate_index() {
        let relation = ThreeTermRecurrence::new(|k| if k == 2 { 0.0 } else { 1.0 }, |_| 1.0, |_| 1.0);
        let error = compute_backward(&relation, 1.0, 1.0, 6).expect_err("a(2) = 0 should stop");
        assert_eq!(
            error,
            RecurrenceError::DegenerateCoefficient {
                direction: StepDirection::Backward,
                index: 2,
            }
        );
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let relation = ThreeTermRecurrence::new(
            |k| (k as f64).sqrt(),
            |k| -1.0 / (k as f64 + 0.5),
            |k| (k as f64 + 1.0).ln(),
        );
        let first = compute_forward(&relation, 0.25, -1.5, 40).expect("forward should succeed");
        let second = compute_forward(&relation, 0.25, -1.5, 40).expect("forward should succeed");

        let first_bits: Vec<u64> = first.as_slice().iter().map(|value| value.to_bits()).collect();
        let second_bits: Vec<u64> = second.as_slice().iter().map(|value| value.to_bits()).collect();
        assert_eq!(first_bits, second_bits);
    }

    #[test]
    fn overflow_is_reported_not_clamped() {
        let explosive = ThreeTermRecurrence::new(|_| 0.0, |_| -1.0e200, |_| 1.0);
        let sequence = compute_forward(&explosive, 1.0, 1.0, 4).expect("steps themselves succeed");

        assert_eq!(first_non_finite(sequence.as_slice()), Some(3));
        assert!(sequence[3].is_infinite());
        assert!(matches!(
            sequence.ensure_finite(),
            Err(RecurrenceError::NonFiniteResult { index: 3, .. })
        ));
        assert!(ensure_finite(&[0.0, 1.0, -2.5]).is_ok());
    }
}
