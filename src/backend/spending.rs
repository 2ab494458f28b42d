#![cfg(feature = "server")]
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::backend::calculator::CalcError;
use crate::backend::convert::{format_iso, format_money};
use crate::shared::types::{EnergyReadingDto, SpendingRangeDto};

/// A prepaid meter balance at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergyReading {
    pub date: NaiveDateTime,
    pub reading: Decimal,
}

impl EnergyReading {
    pub fn to_dto(&self) -> EnergyReadingDto {
        EnergyReadingDto {
            date_iso: format_iso(&self.date),
            reading: format_money(self.reading),
        }
    }
}

/// Money spent between two instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendingRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub usage: Decimal,
}

impl SpendingRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, usage: Decimal) -> Self {
        Self { start, end, usage }
    }

    pub fn to_dto(&self) -> SpendingRangeDto {
        SpendingRangeDto {
            start_date_iso: format_iso(&self.start),
            end_date_iso: format_iso(&self.end),
            usage: format_money(self.usage),
        }
    }
}

/// Pairs consecutive readings into spending ranges. A balance that went up
/// is a top-up and produces no range.
pub fn spending_ranges(readings: &[EnergyReading]) -> Result<Vec<SpendingRange>, CalcError> {
    let mut sorted = readings.to_vec();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));
    sorted.dedup_by(|b, a| a.date == b.date);

    sorted
        .windows(2)
        .filter(|w| w[1].reading <= w[0].reading && w[0].date < w[1].date)
        .map(|w| {
            let usage = w[0]
                .reading
                .checked_sub(w[1].reading)
                .ok_or(CalcError::Overflow("reading difference"))?;
            Ok(SpendingRange::new(w[0].date, w[1].date, usage))
        })
        .collect()
}

/// Spending ranges of one user, ordered by start.
#[derive(Debug, Clone, Default)]
pub struct SpendingRangeRepository {
    ranges: Vec<SpendingRange>,
}

impl SpendingRangeRepository {
    pub fn new(mut ranges: Vec<SpendingRange>) -> Self {
        ranges.sort_by(|a, b| a.start.cmp(&b.start));
        Self { ranges }
    }

    pub fn from_readings(readings: &[EnergyReading]) -> Result<Self, CalcError> {
        Ok(Self::new(spending_ranges(readings)?))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Ranges touching `start..=end`.
    pub fn between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<&SpendingRange> {
        self.ranges
            .iter()
            .filter(|r| r.end >= start && r.start <= end)
            .collect()
    }

    pub fn earliest(&self) -> Option<NaiveDateTime> {
        self.ranges.iter().map(|r| r.start).min()
    }

    pub fn latest(&self) -> Option<NaiveDateTime> {
        self.ranges.iter().map(|r| r.end).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::convert::{parse_decimal, parse_iso};

    fn reading(date: &str, value: &str) -> EnergyReading {
        EnergyReading {
            date: parse_iso(date).unwrap(),
            reading: parse_decimal(value).unwrap(),
        }
    }

    #[test]
    fn consecutive_drops_become_ranges() {
        let ranges = spending_ranges(&[
            reading("2021-01-03 00:00:00", "7.00"),
            reading("2021-01-01 00:00:00", "10.00"),
            reading("2021-01-02 00:00:00", "9.50"),
        ])
        .unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].usage, parse_decimal("0.50").unwrap());
        assert_eq!(ranges[1].usage, parse_decimal("2.50").unwrap());
        assert_eq!(ranges[1].end, parse_iso("2021-01-03 00:00:00").unwrap());
    }

    #[test]
    fn top_ups_are_skipped() {
        let ranges = spending_ranges(&[
            reading("2021-01-01 00:00:00", "2.00"),
            reading("2021-01-02 00:00:00", "1.00"),
            reading("2021-01-03 00:00:00", "20.00"),
            reading("2021-01-04 00:00:00", "18.00"),
        ])
        .unwrap();
        let usages: Vec<String> = ranges.iter().map(|r| r.to_dto().usage).collect();
        assert_eq!(usages, vec!["1.00", "2.00"]);
    }

    #[test]
    fn fewer_than_two_readings_give_nothing() {
        assert!(spending_ranges(&[]).unwrap().is_empty());
        assert!(spending_ranges(&[reading("2021-01-01 00:00:00", "2.00")])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn difference_past_decimal_range_is_an_error() {
        let readings = [
            reading("2021-01-01 00:00:00", "50000000000000000000000000000"),
            reading("2021-01-02 00:00:00", "-50000000000000000000000000000"),
        ];
        assert!(matches!(spending_ranges(&readings), Err(CalcError::Overflow(_))));
        assert!(SpendingRangeRepository::from_readings(&readings).is_err());
    }

    #[test]
    fn repository_bounds_and_overlap() {
        let repo = SpendingRangeRepository::from_readings(&[
            reading("2021-01-01 00:00:00", "10"),
            reading("2021-01-02 00:00:00", "9"),
            reading("2021-01-04 00:00:00", "5"),
        ])
        .unwrap();
        assert_eq!(repo.earliest(), Some(parse_iso("2021-01-01 00:00:00").unwrap()));
        assert_eq!(repo.latest(), Some(parse_iso("2021-01-04 00:00:00").unwrap()));
        let hits = repo.between(
            parse_iso("2021-01-02 00:00:00").unwrap(),
            parse_iso("2021-01-03 00:00:00").unwrap(),
        );
        assert_eq!(hits.len(), 2);
        assert!(SpendingRangeRepository::default().earliest().is_none());
    }
}
