use anyhow::Result;
use serde_json::{json, Value};

use probitld::{
    analyze, AnalysisError, AnalysisResponse, ErrorKind, ProbitAnalysis, RangePolicy, RawRow,
};

fn worked_example() -> Vec<RawRow> {
    vec![
        RawRow::new(0, 20, 5),
        RawRow::new(1, 20, 10),
        RawRow::new(10, 20, 50),
        RawRow::new(100, 20, 90),
    ]
}

/// Splits `y = {float}x {+|-} {float}` into slope, sign and intercept
fn parse_equation(equation: &str) -> Option<(f64, char, f64)> {
    let rest = equation.strip_prefix("y = ")?;
    let (slope, rest) = rest.split_once("x ")?;
    let (sign, intercept) = rest.split_once(' ')?;
    let sign = sign.chars().next()?;
    Some((slope.parse().ok()?, sign, intercept.parse().ok()?))
}

#[test]
fn worked_example_produces_finite_ld50_and_curves() -> Result<()> {
    let results = analyze(&worked_example())?;

    assert!(results.ld50.is_finite());
    assert!(results.ld50 > 1.0 && results.ld50 < 100.0);
    assert_eq!(results.empirical_data.len(), 3);
    assert_eq!(results.curve_data.len(), 10);

    let (slope, sign, intercept) =
        parse_equation(&results.equation).expect("equation is well formed");
    assert!(sign == '+' || sign == '-');
    assert!(slope > 0.0);
    assert!(intercept >= 0.0);

    for point in results.empirical_data.iter().chain(&results.curve_data) {
        assert_eq!(point.log_conc, (point.log_conc * 1e4).round() / 1e4);
    }
    Ok(())
}

#[test]
fn worked_example_reference_values() -> Result<()> {
    let results = analyze(&worked_example())?;
    assert_eq!(results.equation, "y = 1.4360x + 3.4194");
    assert_eq!(results.r_sq, "R² = 0.9978");
    assert_eq!(results.ld50, 12.61);
    Ok(())
}

#[test]
fn json_rows_with_legacy_field_names() -> Result<()> {
    let payload = json!([
        { "Konsentrasi": "0", "Total": "12", "Mortalitas": "22.25" },
        { "Konsentrasi": "1000", "Total": "12", "Mortalitas": "33.40" },
        { "Konsentrasi": "2500", "Total": "12", "Mortalitas": "61.17" },
        { "Konsentrasi": "5000", "Total": "12", "Mortalitas": "88.93" },
        { "Konsentrasi": "7500", "Total": "12", "Mortalitas": "97.23" },
    ]);
    let rows: Vec<RawRow> = serde_json::from_value(payload)?;
    let results = analyze(&rows)?;

    assert_eq!(results.empirical_data.len(), 4);
    assert!(results.ld50 > 1000.0 && results.ld50 < 7500.0);
    Ok(())
}

#[test]
fn success_response_serializes_wire_fields() -> Result<()> {
    let response = AnalysisResponse::from(analyze(&worked_example()));
    let value = serde_json::to_value(&response)?;

    assert_eq!(value["success"], json!(true));
    for key in ["ld50", "equation", "r_sq", "curve_data", "empirical_data"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    assert!(value.get("slope").is_none());
    assert!(value.get("error").is_none());

    let curve = value["curve_data"].as_array().expect("array");
    assert_eq!(curve.len(), 10);
    assert!(curve
        .iter()
        .all(|point| point.get("log_conc").is_some() && point.get("probit").is_some()));
    Ok(())
}

#[test]
fn failure_response_serializes_error() -> Result<()> {
    let rows = vec![RawRow::new(0, 20, 5), RawRow::new("abc", 20, 40)];
    let response = AnalysisResponse::from(analyze(&rows));
    let value = serde_json::to_value(&response)?;

    assert_eq!(value["success"], json!(false));
    assert_eq!(value["kind"], json!("empty_treatment"));
    assert!(matches!(value["error"], Value::String(_)));
    Ok(())
}

#[test]
fn full_control_mortality_is_reported_not_nan() {
    let rows = vec![
        RawRow::new(0, 20, 100),
        RawRow::new(1, 20, 100),
        RawRow::new(10, 20, 100),
    ];
    let error = analyze(&rows).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::FullControlMortality);
}

#[test]
fn strict_policy_reports_offending_field() {
    let rows = vec![RawRow::new(1, 20, 10), RawRow::new(10, 20, -3)];
    let result = ProbitAnalysis::builder()
        .rows(rows.as_slice())
        .policy(RangePolicy::Strict)
        .build()
        .run();
    assert_eq!(
        result,
        Err(AnalysisError::OutOfRange {
            field: "mortality",
            value: -3.0
        })
    );
}

#[test]
fn huge_ld50_is_serialized_as_a_number() -> Result<()> {
    let rows = vec![RawRow::new(1, 20, 40), RawRow::new(10, 20, 40.03179)];
    let response = AnalysisResponse::from(analyze(&rows));
    let value = serde_json::to_value(&response)?;

    assert_eq!(value["success"], json!(true));
    let ld50 = value["ld50"].as_f64().expect("ld50 is a number");
    assert!(ld50.is_finite() && ld50 > 1e307);
    Ok(())
}

#[test]
fn near_flat_response_reports_unbounded_ld50() -> Result<()> {
    let rows = vec![RawRow::new(1, 20, 40), RawRow::new(10, 20, 40.01)];
    let response = AnalysisResponse::from(analyze(&rows));
    let value = serde_json::to_value(&response)?;

    assert_eq!(value["success"], json!(false));
    assert_eq!(value["kind"], json!("unbounded_ld50"));
    Ok(())
}
