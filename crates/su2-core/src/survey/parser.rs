use super::model::StabilityCase;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const STABILITY_CASES_PATH: &str = "tasks/stability-cases.json";

#[derive(Debug, Deserialize)]
struct CaseFile {
    cases: Vec<StabilityCase>,
}

#[derive(Debug, thiserror::Error)]
pub enum SurveyCasesError {
    #[error("failed to read stability cases '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse stability cases '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("stability cases '{}' contain no cases", path.display())]
    Empty { path: PathBuf },
    #[error("stability cases '{}' repeat label '{label}'", path.display())]
    DuplicateLabel { path: PathBuf, label: String },
}

/// Reads `{"cases": [...]}`. Spins may be numbers or fraction strings.
pub fn load_stability_cases(
    cases_path: impl AsRef<Path>,
) -> Result<Vec<StabilityCase>, SurveyCasesError> {
    let cases_path = cases_path.as_ref();
    let source = fs::read_to_string(cases_path).map_err(|source| SurveyCasesError::Read {
        path: cases_path.to_path_buf(),
        source,
    })?;
    parse_stability_cases(&source, cases_path)
}

pub fn parse_stability_cases(
    source: &str,
    cases_path: &Path,
) -> Result<Vec<StabilityCase>, SurveyCasesError> {
    let file: CaseFile =
        serde_json::from_str(source).map_err(|source| SurveyCasesError::Parse {
            path: cases_path.to_path_buf(),
            source,
        })?;

    if file.cases.is_empty() {
        return Err(SurveyCasesError::Empty {
            path: cases_path.to_path_buf(),
        });
    }

    let mut labels = BTreeSet::new();
    for case in &file.cases {
        if !labels.insert(case.label.as_str()) {
            return Err(SurveyCasesError::DuplicateLabel {
                path: cases_path.to_path_buf(),
                label: case.label.clone(),
            });
        }
    }

    Ok(file.cases)
}
