use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::shared::descriptor::DateStyle;

pub fn pad2(n: u32) -> String {
    if n < 10 {
        format!("0{}", n)
    } else {
        n.to_string()
    }
}

/// Parses the date formats the API hands out. Offsets are dropped: the
/// dashboard shows readings in the meter's wall-clock time.
pub fn parse_api_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn format_date(dt: &NaiveDateTime, style: DateStyle) -> String {
    match style {
        DateStyle::LongDate => dt.format("%-d %B %Y").to_string(),
        DateStyle::MonthYear => dt.format("%B %Y").to_string(),
        DateStyle::NumericDateTime => dt.format("%d/%m/%Y, %H:%M:%S").to_string(),
    }
}

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `1234.5` -> `£1,234.50`
pub fn format_currency(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!(
        "{sign}£{}.{}",
        group_thousands(cents / 100),
        pad2((cents % 100) as u32)
    )
}

/// Compact axis label: `£12`, `£12.5`, `£0.25`.
pub fn format_axis_value(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    format!("£{}", s)
}

/// `2021-03-05T14:30` from a `datetime-local` input -> `2021-03-05 14:30:00`.
pub fn datetime_local_to_iso(value: &str) -> Option<String> {
    parse_api_date(value).map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        parse_api_date(s).unwrap()
    }

    #[test]
    fn api_dates_in_every_shape() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(dt("2021-03-05 14:30:00"), expected);
        assert_eq!(dt("2021-03-05T14:30:00"), expected);
        assert_eq!(dt("2021-03-05T14:30:00+01:00"), expected);
        assert_eq!(dt("2021-03-05T14:30"), expected);
        assert_eq!(dt("2021-03-05").format("%H:%M").to_string(), "00:00");
        assert_eq!(parse_api_date("05/03/2021"), None);
    }

    #[test]
    fn date_styles_follow_en_gb() {
        let d = dt("2021-03-05 14:30:09");
        assert_eq!(format_date(&d, DateStyle::LongDate), "5 March 2021");
        assert_eq!(format_date(&d, DateStyle::MonthYear), "March 2021");
        assert_eq!(
            format_date(&d, DateStyle::NumericDateTime),
            "05/03/2021, 14:30:09"
        );
    }

    #[test]
    fn currency() {
        assert_eq!(format_currency(0.0), "£0.00");
        assert_eq!(format_currency(1.5), "£1.50");
        assert_eq!(format_currency(1234.567), "£1,234.57");
        assert_eq!(format_currency(1_000_000.0), "£1,000,000.00");
        assert_eq!(format_currency(-2.25), "-£2.25");
    }

    #[test]
    fn axis_values_are_compact() {
        assert_eq!(format_axis_value(12.0), "£12");
        assert_eq!(format_axis_value(12.5), "£12.5");
        assert_eq!(format_axis_value(0.25), "£0.25");
        assert_eq!(format_axis_value(0.0), "£0");
    }

    #[test]
    fn datetime_local_input() {
        assert_eq!(
            datetime_local_to_iso("2021-03-05T14:30").as_deref(),
            Some("2021-03-05 14:30:00")
        );
        assert_eq!(datetime_local_to_iso(""), None);
    }
}
