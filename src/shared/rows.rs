use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::shared::descriptor::ViewDescriptor;
use crate::utils::format::{format_date, parse_api_date};

/// One plotted or tabulated point of a view.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub timestamp: NaiveDateTime,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum RowsError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of rows")]
    NotAnArray,
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn row(object: &Map<String, Value>, descriptor: &ViewDescriptor) -> Option<Row> {
    let value = number(object.get(descriptor.number_field)?)?;
    let timestamp = parse_api_date(object.get(descriptor.date_field)?.as_str()?)?;
    Some(Row {
        timestamp,
        label: format_date(&timestamp, descriptor.date_style),
        value,
    })
}

/// Maps a response body to rows. Entries missing either field are skipped.
pub fn parse_rows(body: &str, descriptor: &ViewDescriptor) -> Result<Vec<Row>, RowsError> {
    let Value::Array(items) = serde_json::from_str::<Value>(body)? else {
        return Err(RowsError::NotAnArray);
    };
    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|o| row(o, descriptor))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::descriptor::{daily_spending, readings};

    #[test]
    fn spending_rows_are_parsed_and_labelled() {
        let body = r#"[
            {"startDateISO":"2021-03-05 00:00:00","endDateISO":"2021-03-06 00:00:00","usage":"1.25"},
            {"startDateISO":"2021-03-06 00:00:00","endDateISO":"2021-03-07 00:00:00","usage":2}
        ]"#;
        let rows = parse_rows(body, &daily_spending().table).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "5 March 2021");
        assert_eq!(rows[0].value, 1.25);
        assert_eq!(rows[1].value, 2.0);
    }

    #[test]
    fn rows_with_missing_or_bad_fields_are_skipped() {
        let body = r#"[
            {"dateISO":"2021-03-05 14:30:00","reading":"40.10"},
            {"dateISO":"not a date","reading":"39.00"},
            {"dateISO":"2021-03-06 09:00:00","reading":"n/a"},
            {"reading":"38.00"},
            7
        ]"#;
        let rows = parse_rows(body, &readings()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "05/03/2021, 14:30:00");
    }

    #[test]
    fn malformed_bodies_are_errors_not_panics() {
        let d = readings();
        assert!(matches!(parse_rows("{not json", &d), Err(RowsError::Json(_))));
        assert!(matches!(
            parse_rows(r#"{"dateISO":"2021-03-05 14:30:00"}"#, &d),
            Err(RowsError::NotAnArray)
        ));
        assert!(parse_rows("<html>login</html>", &d).is_err());
        assert_eq!(parse_rows("[]", &d).unwrap(), vec![]);
    }
}
