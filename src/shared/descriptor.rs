//! Declarative configuration for the table and chart views.
//!
//! A [`ViewDescriptor`] names the endpoint a view reads from and the two
//! fields of each JSON row it cares about. The presets at the bottom are the
//! views shown on the dashboard.

use std::ops::Range;

/// How a date column is rendered (en-GB, 24 hour clock).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `5 March 2021`
    LongDate,
    /// `March 2021`
    MonthYear,
    /// `05/03/2021, 14:30:00`
    NumericDateTime,
}

/// Fraction of the data visible in a chart, both ends in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigatorWindow {
    pub min: f64,
    pub max: f64,
}

impl Default for NavigatorWindow {
    fn default() -> Self {
        Self {
            min: 0.30,
            max: 0.80,
        }
    }
}

impl NavigatorWindow {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamped copy with `min <= max`.
    pub fn normalized(self) -> Self {
        let a = self.min.clamp(0.0, 1.0);
        let b = self.max.clamp(0.0, 1.0);
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Indices of `len` items that fall inside the window. Never empty
    /// when `len > 0`.
    pub fn slice(self, len: usize) -> Range<usize> {
        if len == 0 {
            return 0..0;
        }
        let w = self.normalized();
        let start = ((w.min * len as f64).floor() as usize).min(len - 1);
        let end = ((w.max * len as f64).ceil() as usize).clamp(start + 1, len);
        start..end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewDescriptor {
    pub title: &'static str,
    pub url: &'static str,
    pub date_field: &'static str,
    pub date_column: &'static str,
    pub number_field: &'static str,
    pub number_column: &'static str,
    pub date_style: DateStyle,
    pub navigator: Option<NavigatorWindow>,
}

/// A chart and a table over the same dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDescriptor {
    pub header: &'static str,
    pub chart: ViewDescriptor,
    pub table: ViewDescriptor,
}

impl GroupDescriptor {
    /// Local storage key holding the last visible element of this group.
    pub fn storage_key(&self) -> String {
        format!("{}-group-visible", self.header)
    }
}

const fn spending(
    title: &'static str,
    url: &'static str,
    date_column: &'static str,
    number_column: &'static str,
    date_style: DateStyle,
    navigator: Option<NavigatorWindow>,
) -> ViewDescriptor {
    ViewDescriptor {
        title,
        url,
        date_field: "startDateISO",
        date_column,
        number_field: "usage",
        number_column,
        date_style,
        navigator,
    }
}

pub fn readings() -> ViewDescriptor {
    ViewDescriptor {
        title: "Readings",
        url: "/api/reading/all",
        date_field: "dateISO",
        date_column: "Date",
        number_field: "reading",
        number_column: "Reading",
        date_style: DateStyle::NumericDateTime,
        navigator: None,
    }
}

pub fn daily_spending() -> GroupDescriptor {
    let url = "/api/spending/daily/all";
    GroupDescriptor {
        header: "Daily Spending",
        chart: spending(
            "Daily Spending Chart",
            url,
            "Day",
            "Spending",
            DateStyle::LongDate,
            Some(NavigatorWindow::new(0.00, 0.01)),
        ),
        table: spending(
            "Daily Spending",
            url,
            "Date",
            "Spending",
            DateStyle::LongDate,
            None,
        ),
    }
}

pub fn weekly_spending() -> GroupDescriptor {
    let url = "/api/spending/weekly/all";
    GroupDescriptor {
        header: "Weekly Spending",
        chart: spending(
            "Weekly Spending Chart",
            url,
            "Week",
            "Spending",
            DateStyle::LongDate,
            Some(NavigatorWindow::new(0.00, 0.20)),
        ),
        table: spending(
            "Weekly Spending",
            url,
            "Week",
            "Weekly Spending",
            DateStyle::LongDate,
            None,
        ),
    }
}

pub fn monthly_spending() -> GroupDescriptor {
    let url = "/api/spending/monthly/all";
    GroupDescriptor {
        header: "Monthly Spending",
        chart: spending(
            "Monthly Spending Chart",
            url,
            "Month",
            "Spending",
            DateStyle::MonthYear,
            Some(NavigatorWindow::new(0.00, 0.50)),
        ),
        table: spending(
            "Monthly Spending",
            url,
            "Month",
            "Monthly Spending",
            DateStyle::MonthYear,
            None,
        ),
    }
}

pub fn average_daily_spending() -> GroupDescriptor {
    let url = "/api/average/daily/all";
    GroupDescriptor {
        header: "Average Daily Spending",
        chart: spending(
            "Average Daily Spending Chart",
            url,
            "Day",
            "Average Spending",
            DateStyle::LongDate,
            None,
        ),
        table: spending(
            "Average Daily Spending",
            url,
            "Date",
            "Average Spending",
            DateStyle::LongDate,
            None,
        ),
    }
}

pub fn average_monthly_spending() -> GroupDescriptor {
    let url = "/api/average/monthly/all";
    GroupDescriptor {
        header: "Average Monthly Spending",
        chart: spending(
            "Average Monthly Spending Chart",
            url,
            "Month",
            "Daily Usage",
            DateStyle::MonthYear,
            Some(NavigatorWindow::new(0.00, 1.00)),
        ),
        table: spending(
            "Average Monthly Spending",
            url,
            "Month",
            "Daily Usage",
            DateStyle::MonthYear,
            None,
        ),
    }
}
