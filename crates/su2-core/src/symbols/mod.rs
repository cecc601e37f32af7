//! Spin arithmetic, Wigner symbol evaluators and the closed-form product formula.

pub mod closed_form;
pub mod spin;
pub mod wigner;

pub use closed_form::{
    build_rhos, calculate_3nj, check_reflection_symmetry, terminating_hypergeometric,
    ClosedFormError, ReflectionCheck, DEFAULT_SYMMETRY_TOLERANCE,
};
pub use spin::{
    is_admissible_triad, is_valid_spin, parse_spins, triangle_inequality, validate_6j_spins,
    validate_9j_spins, Spin, SpinError,
};
pub use wigner::{
    wigner_3j, wigner_6j, wigner_9j, RacahSummation, Wigner3jInput, Wigner6jInput, Wigner9jInput,
    WignerSymbolsApi,
};

use crate::domain::SymbolKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolValue {
    pub kind: SymbolKind,
    pub value: f64,
}

/// Validates and evaluates a 6j (six spins) or 9j (nine spins) symbol.
///
/// Unlike the raw evaluators, which return `0` for inadmissible arguments,
/// triangle and parity failures are reported as errors here.
pub fn evaluate_symbol<S>(symbols: &S, spins: &[Spin]) -> Result<SymbolValue, SpinError>
where
    S: WignerSymbolsApi + ?Sized,
{
    let kind = SymbolKind::from_spin_count(spins.len()).ok_or(SpinError::ArgumentCount {
        actual: spins.len(),
    })?;

    let value = match kind {
        SymbolKind::SixJ => {
            let spins: [Spin; 6] = spins.try_into().map_err(|_| SpinError::ArgumentCount {
                actual: spins.len(),
            })?;
            validate_6j_spins(&spins)?;
            symbols.wigner_6j(Wigner6jInput { spins })
        }
        SymbolKind::NineJ => {
            let spins: [Spin; 9] = spins.try_into().map_err(|_| SpinError::ArgumentCount {
                actual: spins.len(),
            })?;
            validate_9j_spins(&spins)?;
            symbols.wigner_9j(Wigner9jInput { spins })
        }
    };

    Ok(SymbolValue { kind, value })
}

#[cfg(test)]
mod tests {
    use super::{evaluate_symbol, parse_spins, RacahSummation, SpinError};
    use crate::domain::SymbolKind;

    #[test]
    fn six_spins_evaluate_a_6j_symbol() {
        let spins = parse_spins(&["1", "1", "1", "1", "1", "1"]).expect("spins should parse");
        let symbol = evaluate_symbol(&RacahSummation, &spins).expect("admissible 6j");
        assert_eq!(symbol.kind, SymbolKind::SixJ);
        assert!((symbol.value - 1.0 / 6.0).abs() < 1.0e-14);
    }

    #[test]
    fn nine_spins_evaluate_a_9j_symbol() {
        let spins = parse_spins(&["1/2", "1/2", "1", "1/2", "1/2", "1", "1", "1", "0"])
            .expect("spins should parse");
        let symbol = evaluate_symbol(&RacahSummation, &spins).expect("admissible 9j");
        assert_eq!(symbol.kind, SymbolKind::NineJ);
        assert!((symbol.value + 1.0 / 18.0).abs() < 1.0e-14);
    }

    #[test]
    fn wrong_count_and_inadmissible_triads_are_errors() {
        let spins = parse_spins(&["1", "1", "1"]).expect("spins should parse");
        assert_eq!(
            evaluate_symbol(&RacahSummation, &spins),
            Err(SpinError::ArgumentCount { actual: 3 })
        );

        let spins = parse_spins(&["1", "1", "3", "1", "1", "1"]).expect("spins should parse");
        assert!(matches!(
            evaluate_symbol(&RacahSummation, &spins),
            Err(SpinError::TriangleViolation { .. })
        ));
    }

    #[test]
    fn oversized_spins_are_rejected_before_evaluation() {
        assert!(matches!(
            parse_spins(&["2000000000"; 6]),
            Err(SpinError::OutOfRange { .. })
        ));

        let largest = parse_spins(&["1000000", "1000000", "0", "1000000", "1000000", "0"])
            .expect("the maximum spin parses");
        let symbol = evaluate_symbol(&RacahSummation, &largest).expect("admissible 6j");
        assert!(symbol.value.is_finite());
    }
}
