use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyReadingDto {
    #[serde(rename = "dateISO")]
    pub date_iso: String, // yyyy-mm-dd hh:mm:ss
    #[serde(deserialize_with = "string_or_number")]
    pub reading: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingRangeDto {
    #[serde(rename = "startDateISO")]
    pub start_date_iso: String,
    #[serde(rename = "endDateISO")]
    pub end_date_iso: String,
    pub usage: String, // two decimal places
}

/// Who the dashboard is showing. Anything that is not a parsed user is anonymous.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(UserDto),
}

impl AuthState {
    /// Interprets the body of a `/api/user` probe.
    pub fn from_probe<E>(body: Result<String, E>) -> Self {
        match body {
            Ok(text) => match serde_json::from_str::<UserDto>(&text) {
                Ok(user) => AuthState::Authenticated(user),
                Err(_) => AuthState::Anonymous,
            },
            Err(_) => AuthState::Anonymous,
        }
    }
}

// Older clients post the reading as a bare JSON number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_with_user_body_is_authenticated() {
        let body = r#"{"userName":"ada","fullName":"Ada Lovelace"}"#;
        let state = AuthState::from_probe::<()>(Ok(body.to_string()));
        assert_eq!(
            state,
            AuthState::Authenticated(UserDto {
                user_name: "ada".into(),
                full_name: "Ada Lovelace".into(),
            })
        );
    }

    #[test]
    fn probe_with_html_or_error_body_is_anonymous() {
        let html = AuthState::from_probe::<()>(Ok("<!doctype html><html></html>".into()));
        assert_eq!(html, AuthState::Anonymous);

        let error_json = AuthState::from_probe::<()>(Ok(r#"{"error":"unauthorized"}"#.into()));
        assert_eq!(error_json, AuthState::Anonymous);

        let failed = AuthState::from_probe(Err("network down"));
        assert_eq!(failed, AuthState::Anonymous);
    }

    #[test]
    fn reading_accepts_numbers_and_strings() {
        let as_number: EnergyReadingDto =
            serde_json::from_str(r#"{"dateISO":"2021-03-05 14:30:00","reading":12.5}"#).unwrap();
        assert_eq!(as_number.reading, "12.5");

        let as_text: EnergyReadingDto =
            serde_json::from_str(r#"{"dateISO":"2021-03-05 14:30:00","reading":"12.50"}"#)
                .unwrap();
        assert_eq!(as_text.reading, "12.50");
    }
}
