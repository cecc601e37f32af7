use crate::recurrence::Recommendation;
use crate::symbols::Spin;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One survey configuration: fixed `j1..j5` and the top of the `j6` range.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StabilityCase {
    pub label: String,
    pub j1: Spin,
    pub j2: Spin,
    pub j3: Spin,
    pub j4: Spin,
    pub j5: Spin,
    pub j6_max: usize,
}

impl StabilityCase {
    pub fn new(label: impl Into<String>, spins: [Spin; 5], j6_max: usize) -> Self {
        let [j1, j2, j3, j4, j5] = spins;
        Self {
            label: label.into(),
            j1,
            j2,
            j3,
            j4,
            j5,
            j6_max,
        }
    }

    pub fn fixed_spins(&self) -> [Spin; 5] {
        [self.j1, self.j2, self.j3, self.j4, self.j5]
    }
}

/// Built-in survey used when no case file is supplied.
pub fn default_cases() -> Vec<StabilityCase> {
    let one = Spin::integer(1);
    let two = Spin::integer(2);
    let three = Spin::integer(3);
    let half = Spin::from_twice(1);

    vec![
        StabilityCase::new("uniform_1", [one; 5], 5),
        StabilityCase::new("uniform_2", [two; 5], 5),
        StabilityCase::new("mixed_1", [one, two, two, two, one], 5),
        StabilityCase::new("mixed_2", [one, two, three, three, two], 5),
        StabilityCase::new("half_int", [half, half, one, half, half], 3),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Ok,
    Error,
}

/// Result of one survey case. Numeric fields are `None` on error rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyRow {
    #[serde(flatten)]
    pub case: StabilityCase,
    pub status: CaseStatus,
    pub max_forward_error: Option<f64>,
    pub max_backward_error: Option<f64>,
    pub mean_condition_number: Option<f64>,
    pub recommended_direction: Option<Recommendation>,
    pub forward_within_tolerance: Option<bool>,
    pub backward_within_tolerance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SurveyRow {
    pub fn is_error(&self) -> bool {
        self.status == CaseStatus::Error
    }

    /// `"forward"`, `"backward"`, `"both"`, or `"error"`.
    pub fn direction_label(&self) -> &'static str {
        match self.recommended_direction {
            Some(direction) => direction.as_str(),
            None => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyMetadata {
    pub description: String,
    pub note: String,
    pub policy_version: String,
    pub condition_epsilon: f64,
    pub separation_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyReport {
    pub metadata: SurveyMetadata,
    pub results: Vec<SurveyRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummary {
    pub case_count: usize,
    pub error_count: usize,
    pub average_max_forward_error: Option<f64>,
    pub average_max_backward_error: Option<f64>,
    pub recommendation_counts: BTreeMap<String, usize>,
}

impl SurveyReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|row| !row.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|row| row.is_error()).count()
    }
}
