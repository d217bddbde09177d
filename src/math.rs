use derive_new::new;
use itertools::Itertools;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::AnalysisError;

/// Offset added to the normal quantile to put probits on the classical scale
pub const PROBIT_OFFSET: f64 = 5.0;

/// Quantile function of the standard normal distribution
///
/// Returns -inf at 0, +inf at 1 and NaN outside `[0, 1]`.
pub fn normal_quantile(p: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    Normal::new(0.0, 1.0).map_or(f64::NAN, |normal| normal.inverse_cdf(p))
}

/// Probit score of a proportion: `Φ⁻¹(p) + 5`
pub fn probit(p: f64) -> Result<f64, AnalysisError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(AnalysisError::UndefinedProbit { proportion: p });
    }
    let score = normal_quantile(p) + PROBIT_OFFSET;
    if !score.is_finite() {
        return Err(AnalysisError::UndefinedProbit { proportion: p });
    }
    Ok(score)
}

/// Ordinary least squares line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient
    pub r: f64,
}

impl Regression {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn r_squared(&self) -> f64 {
        self.r * self.r
    }
}

/// Fits an OLS line through paired observations
///
/// Requires at least two distinct `x` values. The correlation coefficient is
/// zero when either variable has no spread, and is clipped to `[-1, 1]`.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<Regression, AnalysisError> {
    let distinct_doses = x.iter().map(|xi| xi.to_bits()).unique().count();
    if distinct_doses < 2 || x.len() != y.len() {
        return Err(AnalysisError::DegenerateRegression { distinct_doses });
    }

    let x_mean = arithmetic_mean(x);
    let y_mean = arithmetic_mean(y);

    let (ssxm, ssym, ssxym) = x.iter().zip(y.iter()).fold(
        (0.0, 0.0, 0.0),
        |(ssxm, ssym, ssxym), (xi, yi)| {
            let dx = xi - x_mean;
            let dy = yi - y_mean;
            (ssxm + dx * dx, ssym + dy * dy, ssxym + dx * dy)
        },
    );

    // Singular system: no usable spread in x
    if ssxm == 0.0 || !ssxm.is_finite() {
        return Err(AnalysisError::DegenerateRegression { distinct_doses });
    }

    let slope = ssxym / ssxm;
    let intercept = y_mean - slope * x_mean;
    let r = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };

    Ok(Regression::new(slope, intercept, r))
}

pub fn arithmetic_mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// `n` evenly spaced values over `[start, stop]`, both ends included
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Rounds half away from zero to `decimals` places
///
/// Ties are decided on the scaled binary value, so the last digit can differ
/// from a half-to-even rounding of the exact decimal. Values too large to scale
/// without overflow are returned unchanged.
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = x * factor;
    if !scaled.is_finite() {
        return x;
    }
    scaled.round() / factor
}
