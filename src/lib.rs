//! probitld: LD50 estimation from dose-mortality bioassays
//!
//! This library implements the classical probit method for estimating the
//! median lethal dose of a substance. Observed mortalities are corrected for
//! natural (control-group) mortality with Abbott's formula, 0% and 100%
//! responses are replaced with the `1/2n` continuity correction, and a line is
//! fitted by ordinary least squares through the log10-dose / probit points.
//!
//! The main components of this library are:
//! - `ProbitAnalysis`: The analysis pipeline over one table of raw rows
//! - `RawRow`: An input row whose fields are leniently coerced to numbers
//! - `RangePolicy`: Configuration for input range checks
//! - `ProbitResults`: LD50, fitted line, and the empirical and fitted curves
//! - `AnalysisResponse`: The tagged success-or-failure wire record
//!
//! ```
//! use probitld::{analyze, RawRow};
//!
//! let rows = vec![
//!     RawRow::new("0", "20", "5"),
//!     RawRow::new("1", "20", "10"),
//!     RawRow::new("10", "20", "50"),
//!     RawRow::new("100", "20", "90"),
//! ];
//! let results = analyze(&rows).unwrap();
//! assert!(results.ld50 > 1.0 && results.ld50 < 100.0);
//! assert_eq!(results.curve_data.len(), 10);
//! ```

mod config;
mod correction;
mod error;
mod math;
mod probit;
mod results;
mod rows;

pub use config::RangePolicy;
pub use correction::{abbott, boundary_adjust, control_proportion};
pub use error::{AnalysisError, ErrorKind};
pub use math::{linear_regression, normal_quantile, probit, Regression, PROBIT_OFFSET};
pub use probit::{
    analyze, analyze_batch, analyze_dataset, fit_treatments, treatment_rows, ProbitAnalysis,
    TreatmentRow, LD50_DECIMALS, TREND_POINTS,
};
pub use results::{AnalysisResponse, CurvePoint, ProbitResults, POINT_DECIMALS};
pub use rows::{normalize, CleanDataset, DoseRow, RawRow};
