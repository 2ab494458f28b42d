#![cfg(feature = "server")]
//! Spending statistics over a user's spending ranges.
//!
//! A request window rarely lines up with reading times, so the ranges at
//! either edge of a window only contribute the part of their usage that
//! falls inside it, assuming spending was even across the range.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use dioxus::logger::tracing::{debug, info, warn};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::backend::spending::{SpendingRange, SpendingRangeRepository};

#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error("start date '{start}' occurs after end date '{end}'")]
    WrongWayAround {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error("decimal overflow in {0}")]
    Overflow(&'static str),
}

fn checked(value: Option<Decimal>, what: &'static str) -> Result<Decimal, CalcError> {
    value.ok_or_else(|| {
        warn!("[calc] overflow in {what}");
        CalcError::Overflow(what)
    })
}

fn check_order(start: NaiveDateTime, end: NaiveDateTime) -> Result<(), CalcError> {
    if start > end {
        warn!("[calc] start {start} occurs after end {end}");
        return Err(CalcError::WrongWayAround { start, end });
    }
    Ok(())
}

fn midnight(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date().and_time(NaiveTime::MIN)
}

fn start_of_month(dt: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1)
        .unwrap_or(dt.date())
        .and_time(NaiveTime::MIN)
}

fn next_month(dt: NaiveDateTime) -> NaiveDateTime {
    dt.checked_add_months(Months::new(1)).unwrap_or(dt)
}

fn end_of_month(dt: NaiveDateTime) -> NaiveDateTime {
    next_month(start_of_month(dt)) - Duration::nanoseconds(1)
}

fn same_month(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn millis(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_milliseconds()
}

fn epoch() -> NaiveDateTime {
    NaiveDateTime::default()
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Share of `range` inside `start..end`, as a fraction of its usage.
fn portion(
    range: &SpendingRange,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Decimal, CalcError> {
    let total = millis(range.start, range.end);
    if total <= 0 {
        return Ok(Decimal::ZERO);
    }
    let from = range.start.max(start);
    let to = range.end.min(end);
    let inside = millis(from, to).max(0);
    let scaled = checked(range.usage.checked_mul(Decimal::from(inside)), "portion")?;
    checked(scaled.checked_div(Decimal::from(total)), "portion")
}

pub struct Calculator<'a> {
    repo: &'a SpendingRangeRepository,
}

impl<'a> Calculator<'a> {
    pub fn new(repo: &'a SpendingRangeRepository) -> Self {
        Self { repo }
    }

    /// Usage between `start` and `end`. Middle ranges count fully, the first
    /// and last only for their overlap.
    pub fn spending_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<SpendingRange, CalcError> {
        check_order(start, end)?;
        let sublist = self.repo.between(start, end);
        let usage = match sublist.as_slice() {
            [] => Decimal::ZERO,
            [only] => portion(only, start, end)?,
            [first, middle @ .., last] => {
                let edges = [portion(first, start, end)?, portion(last, start, end)?];
                middle
                    .iter()
                    .map(|r| r.usage)
                    .chain(edges)
                    .try_fold(Decimal::ZERO, |acc, u| checked(acc.checked_add(u), "sum"))?
            }
        };
        debug!("[calc] {start}..{end} over {} ranges: {usage}", sublist.len());
        Ok(SpendingRange::new(start, end, usage))
    }

    pub fn all_spending(&self, now: NaiveDateTime) -> Result<SpendingRange, CalcError> {
        info!("[calc] all spending");
        match (self.repo.earliest(), self.repo.latest()) {
            (Some(earliest), Some(latest)) => self.spending_between(earliest, latest),
            _ => Ok(SpendingRange::new(epoch(), now, Decimal::ZERO)),
        }
    }

    /// Open-ended at the data's end. A start past the latest reading is zero
    /// spending, not an error.
    pub fn spending_from(
        &self,
        start: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<SpendingRange, CalcError> {
        info!("[calc] spending from {start}");
        let Some(latest) = self.repo.latest() else {
            return Ok(SpendingRange::new(start, now, Decimal::ZERO));
        };
        match self.spending_between(start, latest) {
            Err(CalcError::WrongWayAround { .. }) => {
                warn!("[calc] no spending from {start}, latest reading is {latest}");
                Ok(SpendingRange::new(start, latest, Decimal::ZERO))
            }
            other => other,
        }
    }

    pub fn spending_until(&self, end: NaiveDateTime) -> Result<SpendingRange, CalcError> {
        info!("[calc] spending until {end}");
        let Some(earliest) = self.repo.earliest() else {
            return Ok(SpendingRange::new(epoch(), end, Decimal::ZERO));
        };
        match self.spending_between(earliest, end) {
            Err(CalcError::WrongWayAround { .. }) => {
                warn!("[calc] no spending until {end}, earliest reading is {earliest}");
                Ok(SpendingRange::new(earliest, end, Decimal::ZERO))
            }
            other => other,
        }
    }

    /// Consecutive `day_gap`-day windows from `start` while a whole window
    /// still fits before `end`.
    pub fn total_spending(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        day_gap: i64,
    ) -> Result<Vec<SpendingRange>, CalcError> {
        check_order(start, end)?;
        let gap = Duration::days(day_gap.max(1));
        let mut out = Vec::new();
        let mut cursor = start;
        while end - cursor >= gap {
            let next = cursor + gap;
            out.push(self.spending_between(cursor, next)?);
            cursor = next;
        }
        debug!("[calc] {} periods of {day_gap} days", out.len());
        Ok(out)
    }

    /// Like [`total_spending`](Self::total_spending) with each total divided
    /// by the number of days in the window.
    pub fn average_spending(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        day_gap: i64,
    ) -> Result<Vec<SpendingRange>, CalcError> {
        let divisor = Decimal::from(day_gap.max(1));
        Ok(self
            .total_spending(start, end, day_gap)?
            .into_iter()
            .map(|r| SpendingRange::new(r.start, r.end, round2(r.usage / divisor)))
            .collect())
    }

    /// Day-aligned totals; both bounds are truncated to midnight.
    pub fn total_by_days(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        day_gap: i64,
    ) -> Result<Vec<SpendingRange>, CalcError> {
        self.total_spending(midnight(start), midnight(end), day_gap)
    }

    pub fn average_by_days(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        day_gap: i64,
    ) -> Result<Vec<SpendingRange>, CalcError> {
        self.average_spending(midnight(start), midnight(end), day_gap)
    }

    /// Windows of the calendar months touched by `start..end`. The first
    /// starts at `start` and the last stops at `end`.
    fn month_windows(
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<(NaiveDateTime, NaiveDateTime)>, CalcError> {
        check_order(start, end)?;
        if same_month(start, end) {
            return Ok(vec![(start, end)]);
        }
        let mut windows = vec![(start, end_of_month(start))];
        let mut month = next_month(start_of_month(start));
        while !same_month(month, end) {
            windows.push((month, end_of_month(month)));
            month = next_month(month);
        }
        windows.push((month, end));
        Ok(windows)
    }

    pub fn total_monthly(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<SpendingRange>, CalcError> {
        info!("[calc] monthly totals {start}..{end}");
        Self::month_windows(start, end)?
            .into_iter()
            .map(|(from, to)| self.spending_between(from, to))
            .collect()
    }

    /// Per-day average of each month window.
    pub fn average_monthly(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<SpendingRange>, CalcError> {
        info!("[calc] monthly averages {start}..{end}");
        if same_month(start, end) {
            check_order(start, end)?;
            let days = i64::from(end.day()) - i64::from(start.day());
            let total = self.spending_between(start, end)?;
            let average = round2(total.usage / Decimal::from(days.max(1)));
            return Ok(vec![SpendingRange::new(start, end, average)]);
        }
        Self::month_windows(start, end)?
            .into_iter()
            .map(|(from, to)| self.average_of_fraction(from, to))
            .collect()
    }

    fn average_of_fraction(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<SpendingRange, CalcError> {
        let total = self.spending_between(start, end)?;
        let span = (end - start).num_nanoseconds().unwrap_or(i64::MAX);
        let day = Duration::days(1).num_nanoseconds().unwrap_or(86_400_000_000_000);
        let average = if span <= 0 {
            Decimal::ZERO
        } else {
            let days = Decimal::from(span) / Decimal::from(day);
            round2(checked(total.usage.checked_div(days), "monthly average")?)
        };
        Ok(SpendingRange::new(start, end, average))
    }

    /// Runs `f` over the repository's full extent; empty data gives nothing.
    pub fn over_all<F>(&self, f: F) -> Result<Vec<SpendingRange>, CalcError>
    where
        F: FnOnce(&Self, NaiveDateTime, NaiveDateTime) -> Result<Vec<SpendingRange>, CalcError>,
    {
        match (self.repo.earliest(), self.repo.latest()) {
            (Some(earliest), Some(latest)) => f(self, earliest, latest),
            _ => {
                warn!("[calc] no readings");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::convert::{format_iso, parse_decimal, parse_iso};
    use crate::backend::spending::EnergyReading;

    fn at(s: &str) -> NaiveDateTime {
        parse_iso(s).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        parse_decimal(s).unwrap()
    }

    fn repo(points: &[(&str, &str)]) -> SpendingRangeRepository {
        let readings: Vec<EnergyReading> = points
            .iter()
            .map(|(d, r)| EnergyReading {
                date: at(d),
                reading: dec(r),
            })
            .collect();
        SpendingRangeRepository::from_readings(&readings).unwrap()
    }

    // One pound a day for ten days.
    fn steady() -> SpendingRangeRepository {
        repo(&[
            ("2021-01-01 00:00:00", "20"),
            ("2021-01-03 00:00:00", "18"),
            ("2021-01-06 00:00:00", "15"),
            ("2021-01-11 00:00:00", "10"),
        ])
    }

    #[test]
    fn partial_ranges_count_proportionally() {
        let r = steady();
        let calc = Calculator::new(&r);
        let s = calc
            .spending_between(at("2021-01-02 00:00:00"), at("2021-01-08 12:00:00"))
            .unwrap();
        assert_eq!(round2(s.usage), dec("6.50"));

        let inside = calc
            .spending_between(at("2021-01-06 12:00:00"), at("2021-01-07 12:00:00"))
            .unwrap();
        assert_eq!(round2(inside.usage), dec("1.00"));
    }

    #[test]
    fn reversed_request_is_an_error() {
        let r = steady();
        let calc = Calculator::new(&r);
        assert!(matches!(
            calc.spending_between(at("2021-01-05 00:00:00"), at("2021-01-04 00:00:00")),
            Err(CalcError::WrongWayAround { .. })
        ));
    }

    #[test]
    fn open_ended_queries_clamp_to_the_data() {
        let r = steady();
        let calc = Calculator::new(&r);
        let now = at("2022-01-01 00:00:00");
        assert_eq!(calc.all_spending(now).unwrap().usage, dec("10"));
        let from = calc.spending_from(at("2021-01-09 00:00:00"), now).unwrap();
        assert_eq!(round2(from.usage), dec("2.00"));
        let until = calc.spending_until(at("2021-01-02 00:00:00")).unwrap();
        assert_eq!(round2(until.usage), dec("1.00"));
        let late = calc.spending_from(at("2021-02-01 00:00:00"), now).unwrap();
        assert_eq!(late.usage, Decimal::ZERO);
        let early = calc.spending_until(at("2020-12-01 00:00:00")).unwrap();
        assert_eq!(early.usage, Decimal::ZERO);

        let empty = SpendingRangeRepository::default();
        let calc = Calculator::new(&empty);
        let all = calc.all_spending(now).unwrap();
        assert_eq!(all.usage, Decimal::ZERO);
        assert_eq!(all.end, now);
    }

    #[test]
    fn daily_and_weekly_periods() {
        let r = steady();
        let calc = Calculator::new(&r);
        let daily = calc
            .total_by_days(at("2021-01-01 09:00:00"), at("2021-01-11 00:00:00"), 1)
            .unwrap();
        assert_eq!(daily.len(), 10);
        assert!(daily.iter().all(|d| round2(d.usage) == dec("1.00")));
        assert_eq!(format_iso(&daily[0].start), "2021-01-01 00:00:00");

        let weekly = calc
            .average_by_days(at("2021-01-01 00:00:00"), at("2021-01-11 00:00:00"), 7)
            .unwrap();
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].usage, dec("1.00"));

        let short = calc
            .total_by_days(at("2021-01-01 00:00:00"), at("2021-01-05 00:00:00"), 7)
            .unwrap();
        assert!(short.is_empty());
    }

    #[test]
    fn months_are_split_on_calendar_boundaries() {
        let r = repo(&[("2021-01-16 00:00:00", "100"), ("2021-03-16 00:00:00", "41")]);
        let calc = Calculator::new(&r);
        let months = calc
            .over_all(|c, s, e| c.total_monthly(s, e))
            .unwrap();
        assert_eq!(months.len(), 3);
        assert_eq!(format_iso(&months[0].end), "2021-01-31 23:59:59");
        assert_eq!(format_iso(&months[1].start), "2021-02-01 00:00:00");
        assert_eq!(format_iso(&months[2].end), "2021-03-16 00:00:00");
        // 59 days at one pound a day
        assert_eq!(round2(months[1].usage), dec("28.00"));

        let averages = calc.over_all(|c, s, e| c.average_monthly(s, e)).unwrap();
        assert_eq!(averages.len(), 3);
        assert!(averages.iter().all(|a| a.usage == dec("1.00")));
    }

    #[test]
    fn single_month_gives_one_entry() {
        let r = steady();
        let calc = Calculator::new(&r);
        let totals = calc.over_all(|c, s, e| c.total_monthly(s, e)).unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].usage, dec("10"));
        let averages = calc.over_all(|c, s, e| c.average_monthly(s, e)).unwrap();
        assert_eq!(averages[0].usage, dec("1.00"));
    }

    #[test]
    fn oversized_usage_is_an_error_not_a_panic() {
        let r = SpendingRangeRepository::new(vec![SpendingRange::new(
            at("2021-01-01 00:00:00"),
            at("2021-01-03 00:00:00"),
            Decimal::MAX,
        )]);
        let calc = Calculator::new(&r);
        assert!(matches!(
            calc.spending_between(at("2021-01-01 12:00:00"), at("2021-01-03 00:00:00")),
            Err(CalcError::Overflow(_))
        ));
        assert!(calc.spending_from(at("2021-01-02 00:00:00"), at("2022-01-01 00:00:00")).is_err());
        assert!(calc.over_all(|c, s, e| c.total_by_days(s, e, 1)).is_err());
    }

    #[test]
    fn middle_ranges_that_sum_past_the_limit_are_an_error() {
        let half = dec("40000000000000000000000000000");
        let r = SpendingRangeRepository::new(vec![
            SpendingRange::new(at("2021-01-01 00:00:00"), at("2021-01-02 00:00:00"), dec("1")),
            SpendingRange::new(at("2021-01-02 00:00:00"), at("2021-01-03 00:00:00"), half),
            SpendingRange::new(at("2021-01-03 00:00:00"), at("2021-01-04 00:00:00"), half),
            SpendingRange::new(at("2021-01-04 00:00:00"), at("2021-01-05 00:00:00"), dec("1")),
        ]);
        let calc = Calculator::new(&r);
        assert!(matches!(
            calc.spending_between(at("2021-01-01 00:00:00"), at("2021-01-05 00:00:00")),
            Err(CalcError::Overflow(_))
        ));
    }

    #[test]
    fn empty_data_yields_empty_lists() {
        let empty = SpendingRangeRepository::default();
        let calc = Calculator::new(&empty);
        assert!(calc.over_all(|c, s, e| c.total_by_days(s, e, 1)).unwrap().is_empty());
        assert!(calc.over_all(|c, s, e| c.average_monthly(s, e)).unwrap().is_empty());
    }
}
