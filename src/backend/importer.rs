#![cfg(feature = "server")]
//! Bulk import of meter exports: headerless `dd/MM/yyyy HH:mm,reading` rows.

use anyhow::{Context, Result};
use dioxus::logger::tracing::{info, warn};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::backend::convert::{parse_csv_date, parse_reading};
use crate::backend::db::Db;
use crate::backend::spending::EnergyReading;

#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub readings: Vec<EnergyReading>,
    /// 1-based line numbers that could not be read.
    pub skipped: Vec<u64>,
}

pub fn parse_readings<R: Read>(input: R) -> ParsedCsv {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut out = ParsedCsv::default();
    for (i, record) in reader.records().enumerate() {
        let line = record
            .as_ref()
            .ok()
            .and_then(|r| r.position().map(|p| p.line()))
            .unwrap_or(i as u64 + 1);
        let parsed = record.ok().and_then(|r| {
            let date = parse_csv_date(r.get(0)?).ok()?;
            let reading = parse_reading(r.get(1)?).ok()?;
            Some(EnergyReading { date, reading })
        });
        match parsed {
            Some(reading) => out.readings.push(reading),
            None => out.skipped.push(line),
        }
    }
    out
}

/// Imports `path` into `user_name`'s readings, creating the user if needed.
pub async fn import_csv(db: Arc<Db>, path: &Path, user_name: &str) -> Result<usize> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let parsed = parse_readings(file);
    if !parsed.skipped.is_empty() {
        warn!(
            "[import-csv] skipped {} unreadable lines: {:?}",
            parsed.skipped.len(),
            parsed.skipped
        );
    }

    let user = match db.get_user_by_name(user_name).await? {
        Some(u) => u,
        None => db.upsert_user(user_name, user_name).await?,
    };
    let mut written = 0usize;
    for r in &parsed.readings {
        if db.insert_reading(user.id, r.date, r.reading).await? {
            written += 1;
        }
    }
    info!("[import-csv] {written} readings imported for '{user_name}'");
    Ok(written)
}
