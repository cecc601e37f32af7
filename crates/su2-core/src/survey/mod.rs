//! Batch stability survey of the model 6j recurrence.
//!
//! Each case builds exact reference values with the Racah summation,
//! analyses both recursion directions against them, and records either a
//! result row or an error row. A failing case never stops the batch.

pub mod model;
pub mod parser;

pub use model::{
    default_cases, CaseStatus, StabilityCase, SurveyMetadata, SurveyReport, SurveyRow,
    SurveySummary,
};
pub use parser::{
    load_stability_cases, parse_stability_cases, SurveyCasesError, STABILITY_CASES_PATH,
};

use crate::numerics::{
    compare_with_policy_tolerance, stable_mean, NumericTolerance, StabilityPolicy,
    RECURRENCE_ROUNDTRIP_CATEGORY,
};
use crate::recurrence::{
    analyze_stability, reference_6j_sequence, Racah6jRecurrence, RecurrenceError,
    StabilityConfig,
};
use crate::symbols::{RacahSummation, SpinError, WignerSymbolsApi};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const REPORT_DESCRIPTION: &str = "Stability analysis for 6-j recurrence relations";
const REPORT_NOTE: &str = "Recurrence coefficients are a model family, not the physical Racah coefficients";

/// Used when the policy has no `recurrence_roundtrip` category.
pub const DEFAULT_ROUNDTRIP_TOLERANCE: NumericTolerance = NumericTolerance {
    abs_tol: 1.0e-10,
    rel_tol: 1.0e-8,
    relative_floor: 1.0e-12,
};

#[derive(Debug, thiserror::Error)]
pub enum SurveyReportError {
    #[error("failed to serialize stability report: {source}")]
    Serialize { source: serde_json::Error },
    #[error("failed to write stability report '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Why one survey case produced an error row.
#[derive(Debug, thiserror::Error)]
enum CaseFailure {
    #[error(transparent)]
    Spin(#[from] SpinError),
    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),
}

pub fn run_stability_survey(cases: &[StabilityCase], policy: &StabilityPolicy) -> SurveyReport {
    run_stability_survey_with(&RacahSummation, cases, policy)
}

/// Survey with an explicit reference provider for the exact 6j values.
pub fn run_stability_survey_with<S>(
    symbols: &S,
    cases: &[StabilityCase],
    policy: &StabilityPolicy,
) -> SurveyReport
where
    S: WignerSymbolsApi + ?Sized,
{
    let config = policy.stability_config();
    let tolerance = policy
        .tolerance_for_category(RECURRENCE_ROUNDTRIP_CATEGORY)
        .unwrap_or(DEFAULT_ROUNDTRIP_TOLERANCE);

    tracing::info!(
        cases = cases.len(),
        policy = %policy.policy_version,
        "running recurrence stability survey"
    );

    let results = cases
        .iter()
        .map(|case| match survey_case(symbols, case, &config, tolerance) {
            Ok(row) => row,
            Err(error) => {
                tracing::warn!(case = %case.label, %error, "stability case failed");
                error_row(case, &error)
            }
        })
        .collect();

    SurveyReport {
        metadata: SurveyMetadata {
            description: REPORT_DESCRIPTION.to_string(),
            note: REPORT_NOTE.to_string(),
            policy_version: policy.policy_version.clone(),
            condition_epsilon: config.condition_epsilon,
            separation_factor: config.separation_factor,
        },
        results,
    }
}

fn survey_case<S>(
    symbols: &S,
    case: &StabilityCase,
    config: &StabilityConfig,
    tolerance: NumericTolerance,
) -> Result<SurveyRow, CaseFailure>
where
    S: WignerSymbolsApi + ?Sized,
{
    let reference = reference_6j_sequence(symbols, case.fixed_spins(), case.j6_max)?;
    if reference.len() < 2 {
        return Err(RecurrenceError::InvalidRange {
            k_max: case.j6_max,
        }
        .into());
    }

    let relation = Racah6jRecurrence::from_spins(case.fixed_spins());
    let report = analyze_stability(&relation, &reference, reference[0], reference[1], config)?;
    report.ensure_finite()?;
    let summary = report.summary();

    let matches_reference = |errors: &[f64]| {
        errors.iter().zip(&reference).all(|(error, exact)| {
            compare_with_policy_tolerance(*exact, exact + error, tolerance).passes
        })
    };

    tracing::debug!(
        case = %case.label,
        recommendation = %summary.recommended_direction,
        "stability case analysed"
    );

    Ok(SurveyRow {
        case: case.clone(),
        status: CaseStatus::Ok,
        max_forward_error: Some(summary.max_forward_error),
        max_backward_error: Some(summary.max_backward_error),
        mean_condition_number: summary.mean_condition_number,
        recommended_direction: Some(summary.recommended_direction),
        forward_within_tolerance: Some(matches_reference(report.forward_errors())),
        backward_within_tolerance: Some(matches_reference(report.backward_errors())),
        error: None,
    })
}

fn error_row(case: &StabilityCase, error: &CaseFailure) -> SurveyRow {
    SurveyRow {
        case: case.clone(),
        status: CaseStatus::Error,
        max_forward_error: None,
        max_backward_error: None,
        mean_condition_number: None,
        recommended_direction: None,
        forward_within_tolerance: None,
        backward_within_tolerance: None,
        error: Some(error.to_string()),
    }
}

impl SurveyReport {
    /// Averages cover the successful rows only; they are absent when every
    /// case failed.
    pub fn summary(&self) -> SurveySummary {
        let succeeded: Vec<&SurveyRow> = self.results.iter().filter(|row| !row.is_error()).collect();
        let forward: Vec<f64> = succeeded
            .iter()
            .filter_map(|row| row.max_forward_error)
            .collect();
        let backward: Vec<f64> = succeeded
            .iter()
            .filter_map(|row| row.max_backward_error)
            .collect();

        let mut recommendation_counts = BTreeMap::new();
        for row in &self.results {
            *recommendation_counts
                .entry(row.direction_label().to_string())
                .or_insert(0) += 1;
        }

        SurveySummary {
            case_count: self.results.len(),
            error_count: self.error_count(),
            average_max_forward_error: stable_mean(&forward),
            average_max_backward_error: stable_mean(&backward),
            recommendation_counts,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, SurveyReportError> {
        serde_json::to_string_pretty(self).map_err(|source| SurveyReportError::Serialize { source })
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SurveyReportError> {
        let path = path.as_ref();
        let mut rendered = self.to_json_pretty()?;
        rendered.push('\n');
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SurveyReportError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, rendered).map_err(|source| SurveyReportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn render_human_summary(&self) -> String {
        let mut output = String::new();
        for row in &self.results {
            let _ = writeln!(
                output,
                "Case: {} (j1={}, j2={}, j3={}, j4={}, j5={}, j6_max={})",
                row.case.label,
                row.case.j1,
                row.case.j2,
                row.case.j3,
                row.case.j4,
                row.case.j5,
                row.case.j6_max
            );
            match (&row.error, row.max_forward_error, row.max_backward_error) {
                (Some(error), _, _) => {
                    let _ = writeln!(output, "  ERROR: {error}");
                }
                (None, Some(forward), Some(backward)) => {
                    let _ = writeln!(output, "  Max forward error:  {forward:.2e}");
                    let _ = writeln!(output, "  Max backward error: {backward:.2e}");
                    match row.mean_condition_number {
                        Some(mean) => {
                            let _ = writeln!(output, "  Mean condition #:   {mean:.2}");
                        }
                        None => {
                            let _ = writeln!(output, "  Mean condition #:   n/a");
                        }
                    }
                    let _ = writeln!(output, "  Recommendation:     {}", row.direction_label());
                }
                (None, _, _) => {}
            }
        }

        let summary = self.summary();
        let _ = writeln!(output, "Summary");
        let _ = writeln!(
            output,
            "  Cases: {} ({} failed)",
            summary.case_count, summary.error_count
        );
        if let Some(forward) = summary.average_max_forward_error {
            let _ = writeln!(output, "  Average max forward error:  {forward:.2e}");
        }
        if let Some(backward) = summary.average_max_backward_error {
            let _ = writeln!(output, "  Average max backward error: {backward:.2e}");
        }
        let counts = summary
            .recommendation_counts
            .iter()
            .map(|(direction, count)| format!("{direction}={count}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(output, "  Direction recommendations: {counts}");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::{default_cases, run_stability_survey, CaseStatus, StabilityCase};
    use crate::numerics::StabilityPolicy;
    use crate::recurrence::Recommendation;
    use crate::symbols::Spin;

    #[test]
    fn default_survey_recommends_both_for_every_case() {
        let report = run_stability_survey(&default_cases(), &StabilityPolicy::default());

        assert!(report.passed());
        assert_eq!(report.results.len(), 5);
        for row in &report.results {
            assert_eq!(row.status, CaseStatus::Ok, "{}", row.case.label);
            assert_eq!(row.recommended_direction, Some(Recommendation::Both));
            assert_eq!(row.forward_within_tolerance, Some(false));
        }

        let uniform = &report.results[0];
        let forward = uniform.max_forward_error.expect("forward error");
        assert!((forward - 0.3611111111111111).abs() < 1.0e-12);
    }

    #[test]
    fn failing_case_becomes_error_row_without_stopping_batch() {
        let one = Spin::integer(1);
        let cases = vec![
            StabilityCase::new("too_short", [one; 5], 0),
            StabilityCase::new("uniform_1", [one; 5], 5),
        ];
        let report = run_stability_survey(&cases, &StabilityPolicy::default());

        assert!(!report.passed());
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.results[0].status, CaseStatus::Error);
        assert_eq!(report.results[0].direction_label(), "error");
        assert!(report.results[0]
            .error
            .as_deref()
            .is_some_and(|message| message.contains("k_max must be at least 1")));
        assert_eq!(report.results[1].status, CaseStatus::Ok);

        let summary = report.summary();
        assert_eq!(summary.case_count, 2);
        assert_eq!(summary.recommendation_counts.get("error"), Some(&1));
        assert_eq!(summary.recommendation_counts.get("both"), Some(&1));
    }

    #[test]
    fn overflowing_recursion_is_an_error_row() {
        let large = Spin::integer(1_000_000);
        let cases = vec![
            StabilityCase::new("large_spins", [large; 5], 300),
            StabilityCase::new("uniform_1", [Spin::integer(1); 5], 5),
        ];
        let report = run_stability_survey(&cases, &StabilityPolicy::default());

        let row = &report.results[0];
        assert_eq!(row.status, CaseStatus::Error);
        assert_eq!(row.recommended_direction, None);
        assert!(row
            .error
            .as_deref()
            .is_some_and(|message| message.contains("non-finite value")));
        assert_eq!(report.results[1].status, CaseStatus::Ok);

        let json: serde_json::Value =
            serde_json::from_str(&report.to_json_pretty().expect("serializes")).expect("json");
        assert_eq!(json["results"][0]["status"], "error");
    }

    #[test]
    fn unrepresentable_j6_range_is_an_error_row() {
        let cases = vec![StabilityCase::new("beyond_limit", [Spin::integer(1); 5], 2_000_000)];
        let report = run_stability_survey(&cases, &StabilityPolicy::default());

        assert_eq!(report.error_count(), 1);
        assert!(report.results[0]
            .error
            .as_deref()
            .is_some_and(|message| message.contains("must not exceed 1000000")));
    }

    #[test]
    fn report_serializes_metadata_and_rows() {
        let report = run_stability_survey(&default_cases()[..1], &StabilityPolicy::default());
        let json: serde_json::Value =
            serde_json::from_str(&report.to_json_pretty().expect("serializes")).expect("json");

        assert_eq!(json["metadata"]["separationFactor"], 0.1);
        assert_eq!(json["results"][0]["label"], "uniform_1");
        assert_eq!(json["results"][0]["j1"], "1");
        assert_eq!(json["results"][0]["status"], "ok");
        assert_eq!(json["results"][0]["recommended_direction"], "both");
        assert!(json["results"][0].get("error").is_none());
    }

    #[test]
    fn human_summary_lists_cases_and_counts() {
        let report = run_stability_survey(&default_cases(), &StabilityPolicy::default());
        let rendered = report.render_human_summary();

        assert!(rendered.contains("Case: half_int (j1=1/2, j2=1/2, j3=1"));
        assert!(rendered.contains("Recommendation:     both"));
        assert!(rendered.contains("Cases: 5 (0 failed)"));
        assert!(rendered.contains("Direction recommendations: both=5"));
    }
}
