use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Direction of a single recurrence step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepDirection {
    Forward,
    Backward,
}

impl StepDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }

    /// Name of the coefficient that divides the step in this direction.
    pub const fn pivot_coefficient(self) -> &'static str {
        match self {
            Self::Forward => "c",
            Self::Backward => "a",
        }
    }
}

impl Display for StepDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RecurrenceError {
    #[error(
        "{}({index}) = 0, cannot continue {direction} recursion at index {index}",
        .direction.pivot_coefficient()
    )]
    DegenerateCoefficient {
        direction: StepDirection,
        index: usize,
    },
    #[error("k_max must be at least 1, got {k_max}")]
    InvalidRange { k_max: usize },
    #[error("recurrence produced a non-finite value {value} at index {index}")]
    NonFiniteResult { index: usize, value: f64 },
}

/// The coefficient triple of `a(k) y[k-1] + b(k) y[k] + c(k) y[k+1] = 0` at one index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Coefficients {
    pub fn max_magnitude(&self) -> f64 {
        self.a.abs().max(self.b.abs()).max(self.c.abs())
    }
}

/// A three-term linear recurrence
/// `a(k) y[k-1] + b(k) y[k] + c(k) y[k+1] = 0`.
///
/// Implementors only provide the coefficient functions; the single-step
/// transitions are shared. Both steps are pure functions of the coefficients
/// and the supplied neighbour values.
pub trait RecurrenceRelation {
    fn a(&self, k: usize) -> f64;
    fn b(&self, k: usize) -> f64;
    fn c(&self, k: usize) -> f64;

    fn coefficients(&self, k: usize) -> Coefficients {
        Coefficients {
            a: self.a(k),
            b: self.b(k),
            c: self.c(k),
        }
    }

    /// `y[k+1] = -(a(k) y[k-1] + b(k) y[k]) / c(k)`.
    fn forward_step(&self, k: usize, y_prev: f64, y_curr: f64) -> Result<f64, RecurrenceError> {
        let Coefficients { a, b, c } = self.coefficients(k);
        if c == 0.0 {
            return Err(RecurrenceError::DegenerateCoefficient {
                direction: StepDirection::Forward,
                index: k,
            });
        }

        Ok(-(a * y_prev + b * y_curr) / c)
    }

    /// `y[k-1] = -(b(k) y[k] + c(k) y[k+1]) / a(k)`.
    fn backward_step(&self, k: usize, y_curr: f64, y_next: f64) -> Result<f64, RecurrenceError> {
        let Coefficients { a, b, c } = self.coefficients(k);
        if a == 0.0 {
            return Err(RecurrenceError::DegenerateCoefficient {
                direction: StepDirection::Backward,
                index: k,
            });
        }

        Ok(-(b * y_curr + c * y_next) / a)
    }
}

impl<R> RecurrenceRelation for &R
where
    R: RecurrenceRelation + ?Sized,
{
    fn a(&self, k: usize) -> f64 {
        (**self).a(k)
    }

    fn b(&self, k: usize) -> f64 {
        (**self).b(k)
    }

    fn c(&self, k: usize) -> f64 {
        (**self).c(k)
    }
}

/// Recurrence assembled from three independent coefficient functions.
///
/// Any `Fn(usize) -> f64` works: closures, function pointers, or a method
/// bound on a coefficient table. They must be deterministic in the index.
#[derive(Debug, Clone, Copy)]
pub struct ThreeTermRecurrence<A, B, C> {
    a: A,
    b: B,
    c: C,
}

impl<A, B, C> ThreeTermRecurrence<A, B, C>
where
    A: Fn(usize) -> f64,
    B: Fn(usize) -> f64,
    C: Fn(usize) -> f64,
{
    pub fn new(a: A, b: B, c: C) -> Self {
        Self { a, b, c }
    }
}

impl<A, B, C> RecurrenceRelation for ThreeTermRecurrence<A, B, C>
where
    A: Fn(usize) -> f64,
    B: Fn(usize) -> f64,
    C: Fn(usize) -> f64,
{
    fn a(&self, k: usize) -> f64 {
        (self.a)(k)
    }

    fn b(&self, k: usize) -> f64 {
        (self.b)(k)
    }

    fn c(&self, k: usize) -> f64 {
        (self.c)(k)
    }
}
