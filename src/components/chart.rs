use dioxus::prelude::*;

use crate::api::fetch_rows;
use crate::components::ContentBody;
use crate::shared::descriptor::{NavigatorWindow, ViewDescriptor};
use crate::utils::format::{format_axis_value, format_currency};
use crate::utils::media::DarkMode;

/// Foreground and background colours for the current scheme.
pub fn chart_colours(dark: bool) -> (&'static str, &'static str) {
    if dark {
        ("#FFFFFF", "#000000")
    } else {
        ("#000000", "#FFFFFF")
    }
}

#[allow(non_snake_case)]
#[component]
pub fn Chart(descriptor: ViewDescriptor) -> Element {
    // Fetch data
    let data = use_resource(use_reactive((&descriptor,), |(descriptor,)| async move {
        fetch_rows(&descriptor).await
    }));
    let rows = data.read_unchecked().clone().unwrap_or_default();

    let dark = try_use_context::<DarkMode>().map(|d| d.is_dark()).unwrap_or(false);
    let (main_colour, background_colour) = chart_colours(dark);

    let initial = descriptor.navigator.unwrap_or_default();
    let mut window = use_signal(move || initial);
    // Hovered bar index (for tooltip)
    let mut hovered = use_signal(|| Option::<usize>::None);

    // Nothing until data arrives, so the navigator starts on the configured window
    if rows.is_empty() {
        return rsx! { ContentBody {} };
    }

    let range = window().slice(rows.len());
    let offset = range.start;
    let points = &rows[range];

    // Visual params
    let height = 220.0f32;
    let padding = 20.0f32;
    let axis_w = 56.0f32;
    let label_h = 70.0f32;
    let bar_w = 14.0f32;
    let bar_gap = 4.0f32;
    let n = points.len().max(1) as f32;
    let width = (n * (bar_w + bar_gap) + padding * 2.0 + axis_w).ceil();
    let max_value = points
        .iter()
        .map(|p| p.value)
        .fold(0.0f64, f64::max)
        .max(0.01) as f32;
    let view_box = format!("0 0 {} {}", width, height + padding + label_h);
    let base_y = padding + height;
    let bar_x = |i: usize| axis_w + padding + (i as f32) * (bar_w + bar_gap);
    let bar_h = |v: f64| ((v.max(0.0) as f32) / max_value * height).max(0.0);

    let (min_pct, max_pct) = {
        let w = window();
        ((w.min * 100.0).round() as i32, (w.max * 100.0).round() as i32)
    };

    rsx! {
        ContentBody {
            div { class: "chart", style: "background:{background_colour};color:{main_colour}",
                div { class: "chart-title", "{descriptor.title}" }
                div { class: "chart-scroll",
                    svg { class: "chart-svg", view_box: "{view_box}", width: "100%", height: "{height + padding + label_h}",
                        // y axis with three ticks
                        line { x1: "{axis_w}", y1: "{padding}", x2: "{axis_w}", y2: "{base_y}", stroke: "{main_colour}", stroke_width: "1" }
                        line { x1: "{axis_w}", y1: "{base_y}", x2: "{width - padding}", y2: "{base_y}", stroke: "{main_colour}", stroke_width: "1" }
                        for (k, frac) in [0.0f32, 0.5, 1.0].into_iter().enumerate() {
                            g { key: "tick-{k}",
                                line { x1: "{axis_w}", y1: "{base_y - frac * height}", x2: "{width - padding}", y2: "{base_y - frac * height}", stroke: "#333333", stroke_width: "0.5" }
                                text { x: "{axis_w - 6.0}", y: "{base_y - frac * height + 4.0}", text_anchor: "end", fill: "{main_colour}", font_size: "11",
                                    "{format_axis_value((frac * max_value) as f64)}"
                                }
                            }
                        }
                        {
                            points.iter().enumerate().map(|(i, p)| {
                                let x = bar_x(i);
                                let h = bar_h(p.value);
                                let y = base_y - h;
                                rsx!{ rect {
                                    key: "{offset + i}", class: "chart-bar", x: "{x}", y: "{y}", width: "{bar_w}", height: "{h}", rx: "2",
                                    onmouseenter: move |_| *hovered.write() = Some(i),
                                    onmouseleave: move |_| *hovered.write() = None,
                                    ontouchstart: move |_| *hovered.write() = Some(i),
                                    ontouchend: move |_| *hovered.write() = None,
                                }}
                            })
                        }
                        {
                            points.iter().enumerate().map(|(i, p)| {
                                let x = bar_x(i) + bar_w / 2.0;
                                let y = base_y + 12.0;
                                rsx!{ text {
                                    key: "label-{offset + i}", x: "{x}", y: "{y}", fill: "{main_colour}", font_size: "10",
                                    transform: "rotate(45 {x} {y})",
                                    "{p.label}"
                                }}
                            })
                        }
                        {
                            match hovered().filter(|i| *i < points.len()) {
                                Some(i) => {
                                    let p = &points[i];
                                    let x = bar_x(i) + bar_w / 2.0; // center of bar
                                    let y = base_y - bar_h(p.value);
                                    let date_label = p.label.clone();
                                    let value_label = format!("{}: {}", descriptor.number_column, format_currency(p.value));
                                    let cw = 7.0f32; // approx char width at 11px
                                    let content_w = (date_label.chars().count().max(value_label.chars().count()) as f32) * cw + 12.0;
                                    let tip_w = content_w.max(12.0).min(width - padding * 2.0);
                                    let tip_h = 36.0f32; // two lines
                                    let tip_x = (x - tip_w / 2.0).clamp(padding, ((width - padding) - tip_w).max(padding));
                                    let tip_y = (y - 10.0 - tip_h).max(6.0);
                                    rsx!{ g { key: "tooltip",
                                        line { x1: "{x}", y1: "{y}", x2: "{x}", y2: "{tip_y + tip_h}", stroke: "{main_colour}", stroke_width: "1" }
                                        rect { x: "{tip_x}", y: "{tip_y}", width: "{tip_w}", height: "{tip_h}", rx: "6", fill: "{background_colour}", stroke: "#334155", stroke_width: "1" }
                                        text { x: "{tip_x + 8.0}", y: "{tip_y + 16.0}", fill: "{main_colour}", font_size: "11", "{date_label}" }
                                        text { x: "{tip_x + 8.0}", y: "{tip_y + 30.0}", fill: "{main_colour}", font_size: "11", "{value_label}" }
                                    }}
                                }
                                None => rsx!{ Fragment {} }
                            }
                        }
                    }
                }
                // Navigator: which slice of the data is drawn
                div { class: "chart-navigator",
                    label { "From "
                        input { r#type: "range", min: "0", max: "100", value: "{min_pct}",
                            oninput: move |e| {
                                if let Ok(v) = e.value().parse::<f64>() {
                                    let w = window();
                                    window.set(NavigatorWindow::new(v / 100.0, w.max).normalized());
                                    hovered.set(None);
                                }
                            }
                        }
                    }
                    label { "To "
                        input { r#type: "range", min: "0", max: "100", value: "{max_pct}",
                            oninput: move |e| {
                                if let Ok(v) = e.value().parse::<f64>() {
                                    let w = window();
                                    window.set(NavigatorWindow::new(w.min, v / 100.0).normalized());
                                    hovered.set(None);
                                }
                            }
                        }
                    }
                    span { class: "chart-navigator-count", "{points.len()} of {rows.len()}" }
                }
            }
        }
    }
}
