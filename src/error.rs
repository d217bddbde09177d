use serde::Serialize;
use thiserror::Error;

/// Failure modes of a probit analysis
///
/// Every failure is returned as a value; the pipeline never panics on user data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("treatment data is empty: enter at least one concentration > 0")]
    EmptyTreatment,

    #[error(
        "cannot fit a regression line: need at least 2 distinct log-dose levels, found {distinct_doses}"
    )]
    DegenerateRegression { distinct_doses: usize },

    #[error("division by zero: control mortality is 100%, Abbott's correction is undefined")]
    FullControlMortality,

    #[error("division by zero: total subjects is 0 at concentration {concentration}")]
    ZeroTotal { concentration: f64 },

    #[error("division by zero: fitted slope is 0, LD50 is undefined")]
    ZeroSlope,

    #[error("fitted line gives a non-finite LD50 (log10 LD50 = {log_ld50})")]
    UnboundedLd50 { log_ld50: f64 },

    #[error("probit is undefined for proportion {proportion}")]
    UndefinedProbit { proportion: f64 },

    #[error("{field} value {value} is out of range")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Fieldless tag of an [`AnalysisError`], for matching and for the wire record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyTreatment,
    DegenerateRegression,
    FullControlMortality,
    ZeroTotal,
    ZeroSlope,
    UnboundedLd50,
    UndefinedProbit,
    OutOfRange,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyTreatment => ErrorKind::EmptyTreatment,
            Self::DegenerateRegression { .. } => ErrorKind::DegenerateRegression,
            Self::FullControlMortality => ErrorKind::FullControlMortality,
            Self::ZeroTotal { .. } => ErrorKind::ZeroTotal,
            Self::ZeroSlope => ErrorKind::ZeroSlope,
            Self::UnboundedLd50 { .. } => ErrorKind::UnboundedLd50,
            Self::UndefinedProbit { .. } => ErrorKind::UndefinedProbit,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }
}
