use dioxus::logger::tracing::{info, warn};
use dioxus::prelude::*;

use crate::api::add_reading;
use crate::components::MainContent;
use crate::shared::types::EnergyReadingDto;
use crate::utils::browser::reload;
use crate::utils::format::datetime_local_to_iso;

/// Builds the request body from the raw form inputs.
pub fn reading_from_inputs(date: &str, reading: &str) -> Result<EnergyReadingDto, String> {
    let date_iso = datetime_local_to_iso(date).ok_or_else(|| format!("invalid date '{date}'"))?;
    let value: f64 = reading
        .trim()
        .parse()
        .map_err(|_| format!("invalid reading '{reading}'"))?;
    if !value.is_finite() {
        return Err(format!("invalid reading '{reading}'"));
    }
    Ok(EnergyReadingDto {
        date_iso,
        reading: format!("{:.2}", value),
    })
}

#[allow(non_snake_case)]
#[component]
pub fn NewReadingForm() -> Element {
    let mut date = use_signal(|| chrono::Local::now().format("%Y-%m-%dT%H:%M").to_string());
    let mut reading = use_signal(|| "0.00".to_string());
    let mut problem = use_signal(|| Option::<String>::None);

    let submit = move |_| async move {
        match reading_from_inputs(&date(), &reading()) {
            Ok(dto) => match add_reading(&dto).await {
                Ok(()) => {
                    info!("[new-reading] saved {} at {}", dto.reading, dto.date_iso);
                    reload();
                }
                Err(e) => {
                    warn!("[new-reading] save failed: {e}");
                    problem.set(Some("Could not save the reading.".to_string()));
                }
            },
            Err(e) => problem.set(Some(e)),
        }
    };

    rsx! {
        MainContent { header: "New Reading".to_string(),
            div { class: "new-reading",
                input { id: "dateInput", name: "dateInput", r#type: "datetime-local", value: "{date}",
                    oninput: move |e| date.set(e.value())
                }
                input { id: "readingInput", name: "readingInput", r#type: "number", step: "0.01", value: "{reading}",
                    oninput: move |e| reading.set(e.value())
                }
                button { onclick: submit, "Submit Reading" }
                if let Some(p) = problem() {
                    span { class: "new-reading-problem", "{p}" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_become_an_api_body() {
        let dto = reading_from_inputs("2021-03-05T14:30", "42.5").unwrap();
        assert_eq!(dto.date_iso, "2021-03-05 14:30:00");
        assert_eq!(dto.reading, "42.50");
    }

    #[test]
    fn bad_inputs_are_reported() {
        assert!(reading_from_inputs("", "1").is_err());
        assert!(reading_from_inputs("2021-03-05T14:30", "lots").is_err());
        assert!(reading_from_inputs("2021-03-05T14:30", "NaN").is_err());
    }
}
