use crate::{error::AnalysisError, rows::DoseRow};

/// How strictly row values are checked before correction
///
/// `Permissive` lets out-of-range values flow through the arithmetic; a
/// proportion that ends up outside `[0, 1]` still fails at the probit stage.
/// `Strict` rejects them up front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangePolicy {
    #[default]
    Permissive,
    Strict,
}

impl RangePolicy {
    pub fn validate(&self, rows: &[DoseRow]) -> Result<(), AnalysisError> {
        match self {
            RangePolicy::Permissive => Ok(()),
            RangePolicy::Strict => rows.iter().try_for_each(check_row),
        }
    }
}

fn check_row(row: &DoseRow) -> Result<(), AnalysisError> {
    if !(row.concentration >= 0.0 && row.concentration.is_finite()) {
        return Err(AnalysisError::OutOfRange {
            field: "concentration",
            value: row.concentration,
        });
    }
    if !(row.total > 0.0 && row.total.is_finite()) {
        return Err(AnalysisError::OutOfRange {
            field: "total",
            value: row.total,
        });
    }
    if !(0.0..=100.0).contains(&row.mortality) {
        return Err(AnalysisError::OutOfRange {
            field: "mortality",
            value: row.mortality,
        });
    }
    Ok(())
}
