use derive_new::new;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A bioassay row as supplied by the caller
///
/// Each field may hold a number, a numeric string, or anything else. Rows whose
/// fields cannot all be coerced to a real number are dropped by [`normalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Dose concentration; `0` marks the control group
    #[serde(default, alias = "Konsentrasi")]
    pub concentration: Value,
    /// Number of subjects exposed
    #[serde(default, alias = "Total")]
    pub total: Value,
    /// Observed mortality in percent
    #[serde(
        default,
        alias = "Mortalitas",
        alias = "mortalityPercent",
        alias = "mortality_percent"
    )]
    pub mortality: Value,
}

impl RawRow {
    pub fn new(
        concentration: impl Into<Value>,
        total: impl Into<Value>,
        mortality: impl Into<Value>,
    ) -> Self {
        Self {
            concentration: concentration.into(),
            total: total.into(),
            mortality: mortality.into(),
        }
    }

    /// Coerces all three fields, or `None` if any of them fails
    pub fn coerce(&self) -> Option<DoseRow> {
        Some(DoseRow::new(
            coerce_value(&self.concentration)?,
            coerce_value(&self.total)?,
            coerce_value(&self.mortality)?,
        ))
    }
}

/// A fully numeric bioassay row
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct DoseRow {
    pub concentration: f64,
    pub total: f64,
    /// Mortality in percent
    pub mortality: f64,
}

impl DoseRow {
    pub fn proportion(&self) -> f64 {
        self.mortality / 100.0
    }

    pub fn is_control(&self) -> bool {
        self.concentration == 0.0
    }

    pub fn is_treatment(&self) -> bool {
        self.concentration > 0.0
    }
}

/// Rows that survived coercion, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanDataset {
    rows: Vec<DoseRow>,
    /// Input indices of the rows that failed coercion
    dropped: Vec<usize>,
}

impl CleanDataset {
    pub fn rows(&self) -> &[DoseRow] {
        &self.rows
    }

    pub fn dropped(&self) -> &[usize] {
        &self.dropped
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<DoseRow> for CleanDataset {
    fn from_iter<I: IntoIterator<Item = DoseRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
            dropped: Vec::new(),
        }
    }
}

/// Coerces every raw row and silently excludes the ones that fail
pub fn normalize(raw: &[RawRow]) -> CleanDataset {
    let mut dataset = CleanDataset::default();
    for (index, row) in raw.iter().enumerate() {
        match row.coerce() {
            Some(row) => dataset.rows.push(row),
            None => {
                debug!(index, ?row, "dropping row with a non-numeric field");
                dataset.dropped.push(index);
            }
        }
    }
    dataset
}

/// Lenient numeric coercion of a single field
///
/// NaN is treated as a failed coercion so that it excludes the row.
fn coerce_value(value: &Value) -> Option<f64> {
    let x = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }?;
    (!x.is_nan()).then_some(x)
}
