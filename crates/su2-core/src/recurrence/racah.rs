use super::relation::RecurrenceRelation;
use crate::symbols::{Spin, SpinError, Wigner6jInput, WignerSymbolsApi};

/// Three-term recurrence in `j6` for `{j1 j2 j3; j4 j5 j6}` with the other
/// five spins fixed.
///
/// The coefficients form a model family:
///
/// - `a(j6) = j6 (j6 + 1)` for `j6 > 0`, otherwise `0`
/// - `b(j6) = -(2 j6 (j6 + 1) + j1 + j2 + j4 + j5)`
/// - `c(j6) = (j6 + 1)(j6 + 2)`
///
/// They are not the physical Racah coefficients, so sequences they generate
/// drift away from true 6j values. The stability survey uses them to
/// exercise the engine against exact reference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Racah6jRecurrence {
    spins: [Spin; 5],
}

impl Racah6jRecurrence {
    pub fn new(j1: Spin, j2: Spin, j3: Spin, j4: Spin, j5: Spin) -> Self {
        Self {
            spins: [j1, j2, j3, j4, j5],
        }
    }

    pub fn from_spins(spins: [Spin; 5]) -> Self {
        Self { spins }
    }

    /// `[j1, j2, j3, j4, j5]`.
    pub fn spins(&self) -> [Spin; 5] {
        self.spins
    }

    fn outer_spin_sum(&self) -> f64 {
        let [j1, j2, _, j4, j5] = self.spins;
        j1.value() + j2.value() + j4.value() + j5.value()
    }
}

fn j6_product(k: usize) -> f64 {
    let k = k as f64;
    k * (k + 1.0)
}

impl RecurrenceRelation for Racah6jRecurrence {
    fn a(&self, k: usize) -> f64 {
        if k == 0 { 0.0 } else { j6_product(k) }
    }

    fn b(&self, k: usize) -> f64 {
        -(2.0 * j6_product(k) + self.outer_spin_sum())
    }

    fn c(&self, k: usize) -> f64 {
        let k = k as f64;
        (k + 1.0) * (k + 2.0)
    }
}

/// `{j1 j2 j3; j4 j5 j6}` for integer `j6 = 0..=j6_max`.
///
/// Inadmissible `j6` values contribute exact zeros, as the evaluator does.
/// `j6_max` above [`Spin::MAX`] is rejected before anything is evaluated.
pub fn reference_6j_sequence<S>(
    symbols: &S,
    fixed: [Spin; 5],
    j6_max: usize,
) -> Result<Vec<f64>, SpinError>
where
    S: WignerSymbolsApi + ?Sized,
{
    let top = Spin::try_integer(u64::try_from(j6_max).unwrap_or(u64::MAX))?;
    let [j1, j2, j3, j4, j5] = fixed;
    Ok((0..=top.twice() / 2)
        .map(|j6| symbols.wigner_6j(Wigner6jInput::new(j1, j2, j3, j4, j5, Spin::integer(j6))))
        .collect())
}
