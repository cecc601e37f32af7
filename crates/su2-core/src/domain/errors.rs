use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::numerics::StabilityPolicyError;
use crate::recurrence::RecurrenceError;
use crate::survey::{SurveyCasesError, SurveyReportError};
use crate::symbols::{ClosedFormError, SpinError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Su2ErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl Su2ErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }
}

/// Categorized application error carried across the CLI boundary.
///
/// `placeholder` is a stable dotted code (`INPUT.SPIN`, `RUN.RECURRENCE`, ...)
/// that scripts can match on without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Su2Error {
    category: Su2ErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl Su2Error {
    pub fn new(
        category: Su2ErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(Su2ErrorCategory::InputValidationError, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(Su2ErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(Su2ErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(Su2ErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> Su2ErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for Su2Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for Su2Error {}

impl From<RecurrenceError> for Su2Error {
    fn from(error: RecurrenceError) -> Self {
        match error {
            RecurrenceError::InvalidRange { .. } => {
                Self::input_validation("INPUT.RECURRENCE_RANGE", error.to_string())
            }
            RecurrenceError::DegenerateCoefficient { .. } => {
                Self::computation("RUN.RECURRENCE_DEGENERATE", error.to_string())
            }
            RecurrenceError::NonFiniteResult { .. } => {
                Self::computation("RUN.RECURRENCE_NON_FINITE", error.to_string())
            }
        }
    }
}

impl From<SpinError> for Su2Error {
    fn from(error: SpinError) -> Self {
        Self::input_validation("INPUT.SPIN", error.to_string())
    }
}

impl From<ClosedFormError> for Su2Error {
    fn from(error: ClosedFormError) -> Self {
        Self::input_validation("INPUT.CLOSED_FORM", error.to_string())
    }
}

impl From<StabilityPolicyError> for Su2Error {
    fn from(error: StabilityPolicyError) -> Self {
        match error {
            StabilityPolicyError::Read { .. } => Self::io_system("IO.POLICY", error.to_string()),
            StabilityPolicyError::Parse { .. } | StabilityPolicyError::InvalidValue { .. } => {
                Self::input_validation("INPUT.POLICY", error.to_string())
            }
        }
    }
}

impl From<SurveyReportError> for Su2Error {
    fn from(error: SurveyReportError) -> Self {
        match error {
            SurveyReportError::Serialize { .. } => {
                Self::internal("RUN.REPORT_SERIALIZE", error.to_string())
            }
            SurveyReportError::Write { .. } => Self::io_system("IO.REPORT", error.to_string()),
        }
    }
}

impl From<SurveyCasesError> for Su2Error {
    fn from(error: SurveyCasesError) -> Self {
        match error {
            SurveyCasesError::Read { .. } => Self::io_system("IO.CASES", error.to_string()),
            _ => Self::input_validation("INPUT.CASES", error.to_string()),
        }
    }
}
