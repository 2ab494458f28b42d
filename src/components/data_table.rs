use dioxus::prelude::*;

use crate::api::fetch_rows;
use crate::components::MainContent;
use crate::shared::descriptor::ViewDescriptor;
use crate::shared::rows::Row;
use crate::utils::format::format_currency;
use crate::utils::media::DarkMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Date,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

pub type Sort = Option<(SortColumn, SortOrder)>;

/// Header click cycle: ascending, descending, unsorted.
pub fn next_sort(current: Sort, clicked: SortColumn) -> Sort {
    match current {
        Some((col, SortOrder::Ascending)) if col == clicked => {
            Some((clicked, SortOrder::Descending))
        }
        Some((col, SortOrder::Descending)) if col == clicked => None,
        _ => Some((clicked, SortOrder::Ascending)),
    }
}

/// Stable sort; dates compare by the raw timestamp, not the label.
pub fn sorted_rows(rows: &[Row], sort: Sort) -> Vec<Row> {
    let mut out = rows.to_vec();
    if let Some((column, order)) = sort {
        out.sort_by(|a, b| {
            let ord = match column {
                SortColumn::Date => a.timestamp.cmp(&b.timestamp),
                SortColumn::Number => a.value.total_cmp(&b.value),
            };
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
    }
    out
}

fn indicator(sort: Sort, column: SortColumn) -> &'static str {
    match sort {
        Some((c, SortOrder::Ascending)) if c == column => " ▲",
        Some((c, SortOrder::Descending)) if c == column => " ▼",
        _ => "",
    }
}

#[allow(non_snake_case)]
#[component]
pub fn DataTable(descriptor: ViewDescriptor) -> Element {
    let data = use_resource(use_reactive((&descriptor,), |(descriptor,)| async move {
        fetch_rows(&descriptor).await
    }));
    let rows = data.read_unchecked().clone().unwrap_or_default();

    let dark = try_use_context::<DarkMode>().map(|d| d.is_dark()).unwrap_or(false);
    let theme = if dark { "grid-theme-dark" } else { "grid-theme" };

    let mut sort = use_signal(|| Sort::None);
    let shown = sorted_rows(&rows, sort());

    rsx! {
        MainContent { header: descriptor.title.to_string(), extra_class: theme.to_string(),
            table { class: "grid",
                thead {
                    tr {
                        th { class: "sortable",
                            onclick: move |_| {
                                let next = next_sort(sort(), SortColumn::Date);
                                sort.set(next);
                            },
                            "{descriptor.date_column}{indicator(sort(), SortColumn::Date)}"
                        }
                        th { class: "sortable number",
                            onclick: move |_| {
                                let next = next_sort(sort(), SortColumn::Number);
                                sort.set(next);
                            },
                            "{descriptor.number_column}{indicator(sort(), SortColumn::Number)}"
                        }
                    }
                }
                tbody {
                    for (i, row) in shown.iter().enumerate() {
                        tr { key: "{i}",
                            td { "{row.label}" }
                            td { class: "number", "{format_currency(row.value)}" }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::format::parse_api_date;

    fn row(date: &str, label: &str, value: f64) -> Row {
        Row {
            timestamp: parse_api_date(date).unwrap(),
            label: label.to_string(),
            value,
        }
    }

    #[test]
    fn header_clicks_cycle_through_orders() {
        let s = next_sort(None, SortColumn::Date);
        assert_eq!(s, Some((SortColumn::Date, SortOrder::Ascending)));
        let s = next_sort(s, SortColumn::Date);
        assert_eq!(s, Some((SortColumn::Date, SortOrder::Descending)));
        assert_eq!(next_sort(s, SortColumn::Date), None);
        assert_eq!(
            next_sort(s, SortColumn::Number),
            Some((SortColumn::Number, SortOrder::Ascending))
        );
    }

    #[test]
    fn dates_sort_by_timestamp_not_label() {
        // "April" sorts before "March" alphabetically
        let rows = vec![
            row("2021-04-01 00:00:00", "April 2021", 3.0),
            row("2021-03-01 00:00:00", "March 2021", 5.0),
        ];
        let asc = sorted_rows(&rows, Some((SortColumn::Date, SortOrder::Ascending)));
        assert_eq!(asc[0].label, "March 2021");
        let desc = sorted_rows(&rows, Some((SortColumn::Date, SortOrder::Descending)));
        assert_eq!(desc[0].label, "April 2021");
    }

    #[test]
    fn number_sort_is_stable() {
        let rows = vec![
            row("2021-03-01 00:00:00", "a", 1.0),
            row("2021-03-02 00:00:00", "b", 2.0),
            row("2021-03-03 00:00:00", "c", 1.0),
        ];
        let asc = sorted_rows(&rows, Some((SortColumn::Number, SortOrder::Ascending)));
        let labels: Vec<_> = asc.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["a", "c", "b"]);
        assert_eq!(sorted_rows(&rows, None), rows);
    }
}
