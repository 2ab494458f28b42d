#![cfg(feature = "server")]
use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use dioxus::logger::tracing::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::backend::db::Db;
use crate::backend::spending::EnergyReading;

pub const DEMO_USER: &str = "demo";

/// Pence, so the walk stays in integers.
fn pounds(pence: i64) -> Decimal {
    Decimal::new(pence, 2)
}

/// A prepaid meter drained a little every day and topped up whenever it runs
/// low. Readings are taken one to three times a day.
pub fn synthetic_readings(rng: &mut StdRng, first_day: NaiveDate, days: u32) -> Vec<EnergyReading> {
    let mut out = Vec::new();
    let mut balance: i64 = rng.gen_range(2_000..=4_000);
    out.push(EnergyReading {
        date: first_day.and_hms_opt(0, 0, 0).unwrap_or(NaiveDateTime::default()),
        reading: pounds(balance),
    });

    for offset in 0..i64::from(days) {
        let day = first_day + Duration::days(offset);
        let roll: u8 = rng.gen_range(0..100);
        let daily_usage: i64 = if roll < 55 {
            rng.gen_range(80..=200)
        } else if roll < 85 {
            rng.gen_range(200..=350)
        } else if roll < 98 {
            rng.gen_range(350..=500)
        } else {
            rng.gen_range(500..=800)
        };

        let k: usize = rng.gen_range(1..=3);
        let mut hours: Vec<u32> = (0..k).map(|_| rng.gen_range(7..=22)).collect();
        hours.sort_unstable();
        hours.dedup();

        let mut left = daily_usage;
        let n = hours.len();
        for (i, hour) in hours.into_iter().enumerate() {
            let drop = if i + 1 == n {
                left
            } else {
                rng.gen_range(0..=left / (n - i) as i64)
            };
            left -= drop;
            balance = (balance - drop).max(0);
            let minute = rng.gen_range(0..=59);
            let Some(at) = day.and_hms_opt(hour, minute, 0) else {
                continue;
            };
            out.push(EnergyReading {
                date: at,
                reading: pounds(balance),
            });

            if balance < 500 {
                balance += rng.gen_range(20..=50) * 100;
                out.push(EnergyReading {
                    date: at + Duration::minutes(5),
                    reading: pounds(balance),
                });
            }
        }
    }
    out
}

pub async fn generate_test_data(db: Arc<Db>, days: u32) -> Result<usize> {
    let mut rng = StdRng::seed_from_u64(42);
    let today = chrono::Local::now().date_naive();
    let first_day = today - Duration::days(i64::from(days));
    let user = db.upsert_user(DEMO_USER, "Demo User").await?;

    let readings = synthetic_readings(&mut rng, first_day, days);
    let mut inserted = 0usize;
    for r in &readings {
        if db.insert_reading(user.id, r.date, r.reading).await? {
            inserted += 1;
        }
    }
    info!("[gen-test-data] {inserted} readings for '{DEMO_USER}' since {first_day}");
    Ok(inserted)
}
