use super::CliError;
use std::path::Path;
use su2_core::domain::SymbolKind;
use su2_core::numerics::{load_stability_policy, StabilityPolicy};
use su2_core::survey::{default_cases, load_stability_cases, StabilityCase};
use su2_core::symbols::{parse_spins, Spin};

pub(super) fn parse_spin_arguments(raw: &[String]) -> Result<Vec<Spin>, CliError> {
    parse_spins(raw).map_err(CliError::compute)
}

pub(super) fn load_policy(policy_path: Option<&Path>) -> Result<StabilityPolicy, CliError> {
    match policy_path {
        Some(path) => load_stability_policy(path).map_err(CliError::compute),
        None => Ok(StabilityPolicy::default()),
    }
}

pub(super) fn load_cases(cases_path: Option<&Path>) -> Result<Vec<StabilityCase>, CliError> {
    match cases_path {
        Some(path) => load_stability_cases(path).map_err(CliError::compute),
        None => Ok(default_cases()),
    }
}

/// Numeric overrides must be finite and strictly positive.
pub(super) fn positive_override(option: &str, value: Option<f64>) -> Result<Option<f64>, CliError> {
    match value {
        Some(value) if !value.is_finite() || value <= 0.0 => Err(CliError::Usage(format!(
            "invalid value '{value}' for '{option}': must be finite and positive"
        ))),
        other => Ok(other),
    }
}

/// `{j1 j2 j3; j4 j5 j6}` style rendering, one row per three spins.
pub(super) fn format_symbol_layout(kind: SymbolKind, spins: &[Spin]) -> String {
    let rows = spins
        .chunks(3)
        .map(|row| {
            row.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("; ");
    format!("{kind} {{{rows}}}")
}
