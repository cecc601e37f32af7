use crate::recurrence::{StabilityConfig, CONDITION_EPSILON, DIRECTION_SEPARATION_FACTOR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const STABILITY_POLICY_PATH: &str = "tasks/stability-policy.json";

/// Tolerance category used when a recurrence sequence is compared with exact
/// reference values in a survey.
pub const RECURRENCE_ROUNDTRIP_CATEGORY: &str = "recurrence_roundtrip";
/// Tolerance category for closed-form versus summation cross-checks.
pub const SYMBOL_CROSSCHECK_CATEGORY: &str = "symbol_crosscheck";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct NumericTolerance {
    #[serde(rename = "absTol")]
    pub abs_tol: f64,
    #[serde(rename = "relTol")]
    pub rel_tol: f64,
    #[serde(rename = "relativeFloor")]
    pub relative_floor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyToleranceComparison {
    pub abs_diff: f64,
    pub rel_diff: f64,
    pub passes: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StabilityPolicy {
    #[serde(rename = "policyVersion")]
    pub policy_version: String,
    #[serde(rename = "conditionEpsilon", default = "default_condition_epsilon")]
    pub condition_epsilon: f64,
    #[serde(rename = "separationFactor", default = "default_separation_factor")]
    pub separation_factor: f64,
    #[serde(default)]
    pub categories: Vec<ToleranceCategory>,
}

fn default_condition_epsilon() -> f64 {
    CONDITION_EPSILON
}

fn default_separation_factor() -> f64 {
    DIRECTION_SEPARATION_FACTOR
}

impl Default for StabilityPolicy {
    fn default() -> Self {
        Self {
            policy_version: "builtin".to_string(),
            condition_epsilon: CONDITION_EPSILON,
            separation_factor: DIRECTION_SEPARATION_FACTOR,
            categories: Vec::new(),
        }
    }
}

impl StabilityPolicy {
    pub fn stability_config(&self) -> StabilityConfig {
        StabilityConfig {
            condition_epsilon: self.condition_epsilon,
            separation_factor: self.separation_factor,
        }
    }

    pub fn tolerance_for_category(&self, category_id: &str) -> Option<NumericTolerance> {
        self.categories
            .iter()
            .find(|category| category.id == category_id)
            .map(|category| category.tolerance)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToleranceCategory {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub tolerance: NumericTolerance,
}

#[derive(Debug, thiserror::Error)]
pub enum StabilityPolicyError {
    #[error("failed to read stability policy '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse stability policy '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(
        "stability policy '{}' has invalid {field} {value}: must be finite and positive",
        path.display()
    )]
    InvalidValue {
        path: PathBuf,
        field: &'static str,
        value: f64,
    },
}

pub fn load_stability_policy(
    policy_path: impl AsRef<Path>,
) -> Result<StabilityPolicy, StabilityPolicyError> {
    let policy_path = policy_path.as_ref();
    let source = fs::read_to_string(policy_path).map_err(|source| StabilityPolicyError::Read {
        path: policy_path.to_path_buf(),
        source,
    })?;
    let policy: StabilityPolicy =
        serde_json::from_str(&source).map_err(|source| StabilityPolicyError::Parse {
            path: policy_path.to_path_buf(),
            source,
        })?;

    for (field, value) in [
        ("conditionEpsilon", policy.condition_epsilon),
        ("separationFactor", policy.separation_factor),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(StabilityPolicyError::InvalidValue {
                path: policy_path.to_path_buf(),
                field,
                value,
            });
        }
    }

    Ok(policy)
}

pub fn compare_with_policy_tolerance(
    baseline: f64,
    actual: f64,
    tolerance: NumericTolerance,
) -> PolicyToleranceComparison {
    let abs_diff = (actual - baseline).abs();
    let rel_denominator = baseline.abs().max(tolerance.relative_floor);
    let rel_diff = abs_diff / rel_denominator;
    let passes = abs_diff <= tolerance.abs_tol || abs_diff <= tolerance.rel_tol * rel_denominator;

    PolicyToleranceComparison {
        abs_diff,
        rel_diff,
        passes,
    }
}

pub fn format_numeric_for_policy(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }

    if value == f64::INFINITY {
        return "inf".to_string();
    }

    if value == f64::NEG_INFINITY {
        return "-inf".to_string();
    }

    format!("{value:.15E}")
}

/// Compensated (Kahan) summation.
pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for &value in values {
        let corrected = value - correction;
        let next = sum + corrected;
        correction = (next - sum) - corrected;
        sum = next;
    }

    sum
}

/// Compensated mean, `None` for an empty slice.
pub fn stable_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(stable_sum(values) / values.len() as f64)
}

pub fn relative_difference(lhs: f64, rhs: f64, relative_floor: f64) -> f64 {
    let scale = lhs.abs().max(rhs.abs()).max(relative_floor);
    (lhs - rhs).abs() / scale
}

pub fn within_tolerance(
    lhs: f64,
    rhs: f64,
    abs_tol: f64,
    rel_tol: f64,
    relative_floor: f64,
) -> bool {
    let abs_diff = (lhs - rhs).abs();
    abs_diff <= abs_tol || relative_difference(lhs, rhs, relative_floor) <= rel_tol
}
