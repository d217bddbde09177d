use approx::abs_diff_eq;
use bon::Builder;
use derive_new::new;
use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::{
    config::RangePolicy,
    correction::{control_proportion, correct_row},
    error::AnalysisError,
    math::{linear_regression, linspace, probit, round_to, Regression, PROBIT_OFFSET},
    results::{CurvePoint, ProbitResults},
    rows::{normalize, CleanDataset, DoseRow, RawRow},
};

/// Number of evenly spaced points on the fitted trend line
pub const TREND_POINTS: usize = 10;

/// Decimal places of the reported LD50
pub const LD50_DECIMALS: i32 = 2;

/// Slopes closer to zero than this are treated as a flat response
const SLOPE_EPSILON: f64 = 1e-12;

/// A treatment row carried through correction and transformation
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct TreatmentRow {
    pub concentration: f64,
    pub total: f64,
    pub observed_proportion: f64,
    /// Abbott-corrected, clamped at zero
    pub corrected_proportion: f64,
    /// Boundary-adjusted, safe for the probit transform
    pub final_proportion: f64,
    pub log_dose: f64,
    pub probit_score: f64,
}

impl TreatmentRow {
    /// Corrects and transforms a row with `concentration > 0`
    pub fn transform(row: &DoseRow, control: f64) -> Result<Self, AnalysisError> {
        let (corrected, adjusted) = correct_row(row, control)?;
        let log_dose = row.concentration.log10();
        let probit_score = probit(adjusted)?;
        trace!(
            concentration = row.concentration,
            corrected,
            adjusted,
            log_dose,
            probit_score,
            "transformed treatment row"
        );
        Ok(Self::new(
            row.concentration,
            row.total,
            row.proportion(),
            corrected,
            adjusted,
            log_dose,
            probit_score,
        ))
    }
}

/// Probit analysis of a dose-mortality bioassay
///
/// Estimates the LD50 with the classical probit method: Abbott's correction
/// for control mortality, a continuity correction of 0% and 100% responses,
/// and an ordinary least squares line through the log-dose / probit points.
#[derive(Debug, Clone, Copy, Builder)]
pub struct ProbitAnalysis<'a> {
    rows: &'a [RawRow],
    #[builder(default)]
    policy: RangePolicy,
}

impl<'a> ProbitAnalysis<'a> {
    pub fn new(rows: &'a [RawRow]) -> Self {
        Self {
            rows,
            policy: RangePolicy::default(),
        }
    }

    /// Run the probit analysis
    ///
    /// The analysis is a single forward pass:
    /// 1. Coerce the raw rows and drop unusable ones
    /// 2. Extract the control mortality
    /// 3. Correct and transform each treatment row
    /// 4. Fit the regression line and build the curves
    pub fn run(&self) -> Result<ProbitResults, AnalysisError> {
        let dataset = normalize(self.rows);
        analyze_dataset(&dataset, self.policy)
    }
}

/// Analyzes rows that have already been coerced
pub fn analyze_dataset(
    dataset: &CleanDataset,
    policy: RangePolicy,
) -> Result<ProbitResults, AnalysisError> {
    policy.validate(dataset.rows())?;

    let control = control_proportion(dataset.rows());
    let treatments = treatment_rows(dataset.rows(), control)?;
    let mut results = fit_treatments(&treatments)?;
    results.dropped_rows = dataset.dropped().len();
    Ok(results)
}

/// Analyzes a raw table with the default policy
pub fn analyze(rows: &[RawRow]) -> Result<ProbitResults, AnalysisError> {
    ProbitAnalysis::new(rows).run()
}

/// Analyzes independent tables in parallel, preserving their order
pub fn analyze_batch(
    tables: &[Vec<RawRow>],
    policy: RangePolicy,
) -> Vec<Result<ProbitResults, AnalysisError>> {
    tables
        .par_iter()
        .map(|rows| {
            ProbitAnalysis::builder()
                .rows(rows.as_slice())
                .policy(policy)
                .build()
                .run()
        })
        .collect()
}

/// Corrects and transforms every row with a positive concentration
pub fn treatment_rows(rows: &[DoseRow], control: f64) -> Result<Vec<TreatmentRow>, AnalysisError> {
    for row in rows.iter().filter(|row| row.concentration < 0.0) {
        warn!(
            concentration = row.concentration,
            "ignoring row with negative concentration"
        );
    }

    let treatments = rows
        .iter()
        .filter(|row| row.is_treatment())
        .collect::<Vec<_>>();
    if treatments.is_empty() {
        return Err(AnalysisError::EmptyTreatment);
    }

    treatments
        .into_iter()
        .map(|row| TreatmentRow::transform(row, control))
        .collect()
}

/// Fits the log-dose / probit line and derives the LD50 and curves
pub fn fit_treatments(treatments: &[TreatmentRow]) -> Result<ProbitResults, AnalysisError> {
    let (log_doses, probits): (Vec<f64>, Vec<f64>) = treatments
        .iter()
        .map(|row| (row.log_dose, row.probit_score))
        .unzip();

    let regression = linear_regression(&log_doses, &probits)?;
    let log_ld50 = median_log_dose(&regression)?;
    let ld50 = 10f64.powf(log_ld50);
    if !ld50.is_finite() {
        return Err(AnalysisError::UnboundedLd50 { log_ld50 });
    }
    debug!(
        slope = regression.slope,
        intercept = regression.intercept,
        r_squared = regression.r_squared(),
        ld50,
        "fitted probit line"
    );

    let empirical_data = treatments
        .iter()
        .map(|row| CurvePoint::rounded(row.log_dose, row.probit_score))
        .collect();

    let (x_min, x_max) = log_doses
        .iter()
        .copied()
        .minmax()
        .into_option()
        .ok_or(AnalysisError::EmptyTreatment)?;
    let curve_data = linspace(x_min, x_max, TREND_POINTS)
        .into_iter()
        .map(|x| CurvePoint::rounded(x, regression.predict(x)))
        .collect();

    Ok(ProbitResults::builder()
        .ld50(round_to(ld50, LD50_DECIMALS))
        .equation(equation(&regression))
        .r_sq(format!("R² = {:.4}", regression.r_squared()))
        .curve_data(curve_data)
        .empirical_data(empirical_data)
        .slope(regression.slope)
        .intercept(regression.intercept)
        .r(regression.r)
        .r_squared(regression.r_squared())
        .log_ld50(log_ld50)
        .build())
}

/// Log dose at which the fitted line crosses probit 5
fn median_log_dose(regression: &Regression) -> Result<f64, AnalysisError> {
    if abs_diff_eq!(regression.slope, 0.0, epsilon = SLOPE_EPSILON) {
        return Err(AnalysisError::ZeroSlope);
    }
    let log_ld50 = (PROBIT_OFFSET - regression.intercept) / regression.slope;
    if !log_ld50.is_finite() {
        return Err(AnalysisError::UnboundedLd50 { log_ld50 });
    }
    Ok(log_ld50)
}

fn equation(regression: &Regression) -> String {
    let sign = if regression.intercept >= 0.0 { '+' } else { '-' };
    format!(
        "y = {:.4}x {} {:.4}",
        regression.slope,
        sign,
        regression.intercept.abs()
    )
}
