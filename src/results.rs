use bon::Builder;
use serde::Serialize;

use crate::{
    error::{AnalysisError, ErrorKind},
    math::round_to,
};

/// Decimal places of every reported curve coordinate
pub const POINT_DECIMALS: i32 = 4;

/// A point on the log-dose / probit plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub log_conc: f64,
    pub probit: f64,
}

impl CurvePoint {
    /// Creates a point with both coordinates rounded to [`POINT_DECIMALS`]
    pub fn rounded(log_conc: f64, probit: f64) -> Self {
        Self {
            log_conc: round_to(log_conc, POINT_DECIMALS),
            probit: round_to(probit, POINT_DECIMALS),
        }
    }
}

/// Outcome of a successful probit analysis
///
/// The serialized form carries the reported (rounded) values only; the raw fit
/// parameters are available to library callers.
#[derive(Debug, Clone, PartialEq, Serialize, Builder)]
pub struct ProbitResults {
    /// LD50 rounded to 2 decimals
    pub ld50: f64,
    pub equation: String,
    pub r_sq: String,
    pub curve_data: Vec<CurvePoint>,
    pub empirical_data: Vec<CurvePoint>,
    #[serde(skip)]
    pub slope: f64,
    #[serde(skip)]
    pub intercept: f64,
    /// Pearson correlation of log dose and probit
    #[serde(skip)]
    pub r: f64,
    #[serde(skip)]
    pub r_squared: f64,
    #[serde(skip)]
    pub log_ld50: f64,
    /// Number of input rows dropped during coercion
    #[serde(skip)]
    #[builder(default)]
    pub dropped_rows: usize,
}

impl ProbitResults {
    pub fn pprint(&self) {
        println!("LD50\t{}", self.ld50);
        println!("Equation\t{}", self.equation);
        println!("{}", self.r_sq);
        println!();
        println!("Kind\tLogConc\tProbit");
        for point in &self.empirical_data {
            println!("empirical\t{}\t{}", point.log_conc, point.probit);
        }
        for point in &self.curve_data {
            println!("fitted\t{}\t{}", point.log_conc, point.probit);
        }
    }
}

/// Wire record of an analysis, tagged by its `success` field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Success {
        success: bool,
        #[serde(flatten)]
        results: ProbitResults,
    },
    Failure {
        success: bool,
        error: String,
        kind: ErrorKind,
    },
}

impl AnalysisResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResponse::Success { .. })
    }
}

impl From<ProbitResults> for AnalysisResponse {
    fn from(results: ProbitResults) -> Self {
        AnalysisResponse::Success {
            success: true,
            results,
        }
    }
}

impl From<AnalysisError> for AnalysisResponse {
    fn from(error: AnalysisError) -> Self {
        AnalysisResponse::Failure {
            success: false,
            error: error.to_string(),
            kind: error.kind(),
        }
    }
}

impl From<Result<ProbitResults, AnalysisError>> for AnalysisResponse {
    fn from(result: Result<ProbitResults, AnalysisError>) -> Self {
        match result {
            Ok(results) => results.into(),
            Err(error) => error.into(),
        }
    }
}
