use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Angular momentum quantum number stored as the doubled value `2j`.
///
/// Every non-negative integer `2j` is a valid spin, so integer and
/// half-integer spins share one exact representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "SpinLiteral", into = "String")]
pub struct Spin {
    twice: u32,
}

impl Spin {
    pub const ZERO: Self = Self { twice: 0 };

    /// Largest spin accepted from text or numbers, `j = 10^6`.
    pub const MAX: Self = Self {
        twice: 2_000_000,
    };

    pub const fn from_twice(twice: u32) -> Self {
        Self { twice }
    }

    pub const fn integer(value: u32) -> Self {
        Self { twice: 2 * value }
    }

    pub const fn twice(self) -> u32 {
        self.twice
    }

    pub fn value(self) -> f64 {
        f64::from(self.twice) / 2.0
    }

    pub const fn is_integer(self) -> bool {
        self.twice % 2 == 0
    }

    /// Multiplicity `2j + 1`.
    pub const fn dimension(self) -> u64 {
        self.twice as u64 + 1
    }

    /// Integer spin `value`, rejected above [`Spin::MAX`].
    pub fn try_integer(value: u64) -> Result<Self, SpinError> {
        let twice = value.checked_mul(2).unwrap_or(u64::MAX);
        Self::checked_from_twice(twice, value.to_string())
    }

    fn checked_from_twice(twice: u64, input: impl Into<String>) -> Result<Self, SpinError> {
        match u32::try_from(twice) {
            Ok(twice) if twice <= Self::MAX.twice => Ok(Self::from_twice(twice)),
            _ => Err(SpinError::OutOfRange {
                value: input.into(),
                max: Self::MAX,
            }),
        }
    }

    pub fn from_f64(value: f64) -> Result<Self, SpinError> {
        if !is_valid_spin(value) {
            return Err(SpinError::NotHalfInteger {
                value: value.to_string(),
            });
        }
        if value < 0.0 {
            return Err(SpinError::Negative {
                value: value.to_string(),
            });
        }

        let twice = (2.0 * value).round();
        if twice > f64::from(Self::MAX.twice) {
            return Err(SpinError::OutOfRange {
                value: value.to_string(),
                max: Self::MAX,
            });
        }
        Ok(Self::from_twice(twice as u32))
    }
}

impl Display for Spin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.twice / 2)
        } else {
            write!(f, "{}/2", self.twice)
        }
    }
}

impl From<Spin> for String {
    fn from(spin: Spin) -> Self {
        spin.to_string()
    }
}

impl FromStr for Spin {
    type Err = SpinError;

    /// Accepts `"3/2"`, `"1"`, `"0.5"` and reducible fractions such as `"2/4"`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let unparseable = || SpinError::Unparseable {
            input: input.to_string(),
        };

        let Some((numerator, denominator)) = trimmed.split_once('/') else {
            let value = trimmed.parse::<f64>().map_err(|_| unparseable())?;
            return Self::from_f64(value);
        };

        let numerator = numerator.trim().parse::<i64>().map_err(|_| unparseable())?;
        let denominator = denominator.trim().parse::<i64>().map_err(|_| unparseable())?;
        let numerator = numerator
            .checked_mul(2)
            .ok_or_else(|| SpinError::OutOfRange {
                value: trimmed.to_string(),
                max: Self::MAX,
            })?;
        if denominator == 0 {
            return Err(unparseable());
        }
        if (numerator < 0) != (denominator < 0) && numerator != 0 {
            return Err(SpinError::Negative {
                value: trimmed.to_string(),
            });
        }

        let doubled = numerator.unsigned_abs();
        let denominator = denominator.unsigned_abs();
        if doubled % denominator != 0 {
            return Err(SpinError::NotHalfInteger {
                value: trimmed.to_string(),
            });
        }
        Self::checked_from_twice(doubled / denominator, trimmed)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SpinLiteral {
    Number(f64),
    Text(String),
}

impl TryFrom<SpinLiteral> for Spin {
    type Error = SpinError;

    fn try_from(literal: SpinLiteral) -> Result<Self, Self::Error> {
        match literal {
            SpinLiteral::Number(value) => Self::from_f64(value),
            SpinLiteral::Text(text) => text.parse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpinError {
    #[error("invalid spin '{input}': expected a number or a fraction such as 3/2")]
    Unparseable { input: String },
    #[error("invalid spin {value}: 2*j must be an integer")]
    NotHalfInteger { value: String },
    #[error("invalid spin {value}: must be non-negative")]
    Negative { value: String },
    #[error("invalid spin {value}: must not exceed {max}")]
    OutOfRange { value: String, max: Spin },
    #[error("triangle inequality violated for triangle {triad}: {a}, {b}, {c}")]
    TriangleViolation {
        triad: &'static str,
        a: Spin,
        b: Spin,
        c: Spin,
    },
    #[error("triangle {triad} has a half-integer perimeter: {a}, {b}, {c}")]
    ParityViolation {
        triad: &'static str,
        a: Spin,
        b: Spin,
        c: Spin,
    },
    #[error("expected 6 spins for a 6j symbol or 9 for a 9j symbol, got {actual}")]
    ArgumentCount { actual: usize },
}

/// True when `2j` is an integer. Sign is checked separately by [`Spin::from_f64`].
pub fn is_valid_spin(value: f64) -> bool {
    value.is_finite() && (2.0 * value).fract() == 0.0
}

/// `|a - b| <= c <= a + b`.
pub fn triangle_inequality(a: Spin, b: Spin, c: Spin) -> bool {
    let (a, b, c) = (u64::from(a.twice), u64::from(b.twice), u64::from(c.twice));
    a.abs_diff(b) <= c && c <= a + b
}

/// Triangle inequality plus an integer perimeter `a + b + c`.
pub fn is_admissible_triad(a: Spin, b: Spin, c: Spin) -> bool {
    let perimeter = u64::from(a.twice) + u64::from(b.twice) + u64::from(c.twice);
    triangle_inequality(a, b, c) && perimeter % 2 == 0
}

fn check_triad(triad: &'static str, a: Spin, b: Spin, c: Spin) -> Result<(), SpinError> {
    if !triangle_inequality(a, b, c) {
        return Err(SpinError::TriangleViolation { triad, a, b, c });
    }
    if !is_admissible_triad(a, b, c) {
        return Err(SpinError::ParityViolation { triad, a, b, c });
    }
    Ok(())
}

/// Validates the four triads of `{j1 j2 j3; j4 j5 j6}`.
pub fn validate_6j_spins(spins: &[Spin; 6]) -> Result<(), SpinError> {
    let [j1, j2, j3, j4, j5, j6] = *spins;
    check_triad("(j1,j2,j3)", j1, j2, j3)?;
    check_triad("(j1,j5,j6)", j1, j5, j6)?;
    check_triad("(j4,j2,j6)", j4, j2, j6)?;
    check_triad("(j4,j5,j3)", j4, j5, j3)
}

/// Validates the rows and columns of a 9j symbol given in row-major order.
pub fn validate_9j_spins(spins: &[Spin; 9]) -> Result<(), SpinError> {
    let [j1, j2, j3, j4, j5, j6, j7, j8, j9] = *spins;
    check_triad("row 1", j1, j2, j3)?;
    check_triad("row 2", j4, j5, j6)?;
    check_triad("row 3", j7, j8, j9)?;
    check_triad("col 1", j1, j4, j7)?;
    check_triad("col 2", j2, j5, j8)?;
    check_triad("col 3", j3, j6, j9)
}

pub fn parse_spins(inputs: &[impl AsRef<str>]) -> Result<Vec<Spin>, SpinError> {
    inputs.iter().map(|input| input.as_ref().parse()).collect()
}
