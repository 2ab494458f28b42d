use dioxus::prelude::*;

use crate::api::{last_reading, total_spending};
use crate::components::MainContent;
use crate::shared::descriptor::DateStyle;
use crate::utils::format::{format_currency, format_date, parse_api_date};

fn money(s: &str) -> String {
    s.trim()
        .parse::<f64>()
        .map(format_currency)
        .unwrap_or_else(|_| s.to_string())
}

fn when(s: &str, style: DateStyle) -> String {
    parse_api_date(s)
        .map(|d| format_date(&d, style))
        .unwrap_or_else(|| s.to_string())
}

/// Latest meter balance and spending since the first reading.
#[allow(non_snake_case)]
#[component]
pub fn SummaryCard() -> Element {
    let last = use_resource(|| async move { last_reading().await });
    let last_v = last.read_unchecked();
    let total = use_resource(|| async move { total_spending().await });
    let total_v = total.read_unchecked();

    rsx! {
        MainContent { header: "Summary".to_string(),
            div { class: "summary",
                {
                    match &*last_v {
                        Some(Some(r)) => rsx! {
                            div { class: "summary-item",
                                div { class: "summary-value", "{money(&r.reading)}" }
                                div { class: "summary-caption",
                                    "Balance as of {when(&r.date_iso, DateStyle::NumericDateTime)}"
                                }
                            }
                        },
                        Some(None) => rsx! {
                            div { class: "summary-item",
                                div { class: "summary-value", "No readings yet" }
                                div { class: "summary-caption", "Add one below or import a CSV." }
                            }
                        },
                        None => rsx! { div { class: "summary-item summary-loading" } },
                    }
                }
                {
                    match &*total_v {
                        Some(Some(s)) => rsx! {
                            div { class: "summary-item",
                                div { class: "summary-value", "{money(&s.usage)}" }
                                div { class: "summary-caption",
                                    "Spent since {when(&s.start_date_iso, DateStyle::LongDate)}"
                                }
                            }
                        },
                        _ => rsx! { Fragment {} },
                    }
                }
            }
        }
    }
}
