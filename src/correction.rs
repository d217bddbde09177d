use tracing::warn;

use crate::{error::AnalysisError, rows::DoseRow};

/// Mortality proportion of the first control (zero-concentration) row
///
/// Defaults to 0.0 when the dataset has no control group.
pub fn control_proportion(rows: &[DoseRow]) -> f64 {
    let control = rows
        .iter()
        .find(|row| row.is_control())
        .map_or(0.0, DoseRow::proportion);
    if !(0.0..1.0).contains(&control) {
        warn!(control, "control mortality proportion outside [0, 1)");
    }
    control
}

/// Abbott's correction of an observed proportion for background mortality
///
/// Results below zero are clamped to zero. A control proportion of exactly 1
/// leaves nothing to correct against and is reported as an error.
pub fn abbott(observed: f64, control: f64) -> Result<f64, AnalysisError> {
    if control == 1.0 {
        return Err(AnalysisError::FullControlMortality);
    }
    let corrected = (observed - control) / (1.0 - control);
    // NaN passes through unclamped
    Ok(if corrected < 0.0 { 0.0 } else { corrected })
}

/// Replaces proportions of 0 or 1 with `1 / 2n` or `1 - 1 / 2n`
///
/// Returns `None` when `total` is zero.
pub fn boundary_adjust(corrected: f64, total: f64) -> Option<f64> {
    if total == 0.0 {
        return None;
    }
    let adjusted = if corrected <= 0.0 {
        1.0 / (2.0 * total)
    } else if corrected >= 1.0 {
        1.0 - 1.0 / (2.0 * total)
    } else {
        corrected
    };
    Some(adjusted)
}

/// Runs both corrections for a single treatment row
///
/// Returns `(corrected, final)` proportions.
pub fn correct_row(row: &DoseRow, control: f64) -> Result<(f64, f64), AnalysisError> {
    let corrected = abbott(row.proportion(), control)?;
    let adjusted =
        boundary_adjust(corrected, row.total).ok_or(AnalysisError::ZeroTotal {
            concentration: row.concentration,
        })?;
    Ok((corrected, adjusted))
}
