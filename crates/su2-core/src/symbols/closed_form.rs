//! Closed-form hypergeometric product formula over an edge chain.
//!
//! Each edge `e` with spin `j_e` contributes
//! `2F1(-2j_e, 1/2; 1; -rho_e) / (2j_e)!`. The series terminates after
//! `2j_e + 1` terms, so it is summed exactly term by term.

use super::spin::Spin;
use crate::numerics::stable_sum;
use serde::Serialize;

pub const DEFAULT_SYMMETRY_TOLERANCE: f64 = 1.0e-8;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ClosedFormError {
    #[error("length mismatch: {spins} spins but {rhos} rho values")]
    LengthMismatch { spins: usize, rhos: usize },
    #[error("rho value {value} at edge {edge} is not finite")]
    NonFiniteRho { edge: usize, value: f64 },
}

/// Outcome of comparing `f(j)` with `f(reverse(j))` under the same rho values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionCheck {
    pub symmetric: bool,
    pub difference: f64,
    pub original: f64,
    pub reflected: f64,
}

fn fibonacci(n: usize) -> f64 {
    let (mut current, mut next) = (0.0_f64, 1.0_f64);
    for _ in 0..n {
        (current, next) = (next, current + next);
    }
    current
}

/// Ratios of consecutive Fibonacci numbers, `rho_e = F(n + 2 - e) / F(n + 3 - e)`
/// for `e = 1..=n`.
pub fn build_rhos(edge_count: usize) -> Vec<f64> {
    (1..=edge_count)
        .map(|edge| fibonacci(edge_count + 2 - edge) / fibonacci(edge_count + 3 - edge))
        .collect()
}

/// Terminating `2F1(-n, 1/2; 1; z)`.
pub fn terminating_hypergeometric(n: u32, z: f64) -> f64 {
    let mut terms = Vec::with_capacity(n as usize + 1);
    let mut term = 1.0;
    terms.push(term);
    for k in 0..n {
        let k = f64::from(k);
        term *= (k - f64::from(n)) * (k + 0.5) / ((k + 1.0) * (k + 1.0)) * z;
        terms.push(term);
    }
    stable_sum(&terms)
}

fn factorial(n: u32) -> f64 {
    (1..=n).map(f64::from).product()
}

/// Evaluates the product formula. Without explicit rho values the Fibonacci
/// ratios from [`build_rhos`] are used.
pub fn calculate_3nj(spins: &[Spin], rhos: Option<&[f64]>) -> Result<f64, ClosedFormError> {
    let default_rhos;
    let rhos = match rhos {
        Some(rhos) => rhos,
        None => {
            default_rhos = build_rhos(spins.len());
            &default_rhos
        }
    };

    if spins.len() != rhos.len() {
        return Err(ClosedFormError::LengthMismatch {
            spins: spins.len(),
            rhos: rhos.len(),
        });
    }
    if let Some((edge, &value)) = rhos.iter().enumerate().find(|(_, rho)| !rho.is_finite()) {
        return Err(ClosedFormError::NonFiniteRho { edge, value });
    }

    Ok(spins
        .iter()
        .zip(rhos)
        .map(|(spin, rho)| {
            terminating_hypergeometric(spin.twice(), -rho) / factorial(spin.twice())
        })
        .product())
}

pub fn check_reflection_symmetry(
    spins: &[Spin],
    rhos: Option<&[f64]>,
    tolerance: f64,
) -> Result<ReflectionCheck, ClosedFormError> {
    let original = calculate_3nj(spins, rhos)?;
    let reversed: Vec<Spin> = spins.iter().rev().copied().collect();
    let reflected = calculate_3nj(&reversed, rhos)?;
    let difference = (original - reflected).abs();

    tracing::debug!(
        edges = spins.len(),
        original,
        reflected,
        difference,
        "closed-form reflection check"
    );

    Ok(ReflectionCheck {
        symmetric: difference < tolerance,
        difference,
        original,
        reflected,
    })
}
