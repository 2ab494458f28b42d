#![cfg(feature = "server")]
use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::str::FromStr;

use crate::backend::convert::{format_iso, parse_iso};
use crate::backend::spending::EnergyReading;

#[derive(Debug, Clone)]
pub struct Db {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub id: i64,
    pub user_name: String,
    pub full_name: String,
}

#[derive(Debug, Clone)]
pub struct SessionRow {
    pub user: UserRow,
    pub csrf_token: String,
}

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_name TEXT NOT NULL UNIQUE,
        full_name TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS energy_readings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        date TEXT NOT NULL,
        reading TEXT NOT NULL,
        UNIQUE(user_id, date)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        csrf_token TEXT NOT NULL,
        expires_at TEXT NOT NULL
    );
    "#,
];

fn user_from(r: &sqlx::sqlite::SqliteRow) -> Result<UserRow> {
    Ok(UserRow {
        id: r.try_get("id")?,
        user_name: r.try_get("user_name")?,
        full_name: r.try_get("full_name")?,
    })
}

fn reading_from(r: &sqlx::sqlite::SqliteRow) -> Result<EnergyReading> {
    let date: String = r.try_get("date")?;
    let reading: String = r.try_get("reading")?;
    Ok(EnergyReading {
        date: parse_iso(&date)?,
        reading: Decimal::from_str(&reading)?,
    })
}

impl Db {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(3)
            .connect_with(opts)
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Creates the user or refreshes their display name.
    pub async fn upsert_user(&self, user_name: &str, full_name: &str) -> Result<UserRow> {
        sqlx::query(
            r#"INSERT INTO users (user_name, full_name, created_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(user_name) DO UPDATE SET full_name = excluded.full_name"#,
        )
        .bind(user_name)
        .bind(full_name)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        self.get_user_by_name(user_name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user {user_name} vanished after upsert"))
    }

    pub async fn get_user_by_name(&self, user_name: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query("SELECT id, user_name, full_name FROM users WHERE user_name = ?1")
            .bind(user_name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from).transpose()
    }

    /// Stores a reading; a second reading at the same instant replaces the
    /// first. Returns true when a row was written.
    pub async fn insert_reading(
        &self,
        user_id: i64,
        date: NaiveDateTime,
        reading: Decimal,
    ) -> Result<bool> {
        let rec = sqlx::query(
            r#"INSERT INTO energy_readings (user_id, date, reading) VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id, date) DO UPDATE SET reading = excluded.reading"#,
        )
        .bind(user_id)
        .bind(format_iso(&date))
        .bind(reading.to_string())
        .execute(&self.pool)
        .await?;
        Ok(rec.rows_affected() > 0)
    }

    pub async fn readings_for_user(&self, user_id: i64) -> Result<Vec<EnergyReading>> {
        let rows = sqlx::query(
            r#"SELECT date, reading FROM energy_readings
            WHERE user_id = ?1 ORDER BY date ASC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(reading_from).collect()
    }

    pub async fn last_reading(&self, user_id: i64) -> Result<Option<EnergyReading>> {
        let row = sqlx::query(
            r#"SELECT date, reading FROM energy_readings
            WHERE user_id = ?1 ORDER BY date DESC LIMIT 1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(reading_from).transpose()
    }

    pub async fn create_session(
        &self,
        id: &str,
        user_id: i64,
        csrf_token: &str,
        ttl: Duration,
    ) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO sessions (id, user_id, csrf_token, expires_at)
            VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(csrf_token)
        .bind((Utc::now() + ttl).to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The live session `id`, if any. Expired sessions read as absent.
    pub async fn session(&self, id: &str) -> Result<Option<SessionRow>> {
        let row = sqlx::query(
            r#"SELECT u.id, u.user_name, u.full_name, s.csrf_token, s.expires_at
            FROM sessions s JOIN users u ON u.id = s.user_id
            WHERE s.id = ?1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };
        let expires_str: String = r.try_get("expires_at")?;
        let expires_at = DateTime::parse_from_rfc3339(&expires_str)?.with_timezone(&Utc);
        if expires_at <= Utc::now() {
            return Ok(None);
        }
        Ok(Some(SessionRow {
            user: user_from(&r)?,
            csrf_token: r.try_get("csrf_token")?,
        }))
    }

    pub async fn delete_session(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn prune_sessions(&self) -> Result<u64> {
        let rec = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(rec.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::convert::parse_decimal;

    async fn temp_db() -> (tempfile::TempDir, Db) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let db = Db::connect(&url).await.unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn users_are_upserted_by_name() {
        let (_dir, db) = temp_db().await;
        let first = db.upsert_user("ada", "Ada").await.unwrap();
        let second = db.upsert_user("ada", "Ada Lovelace").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.full_name, "Ada Lovelace");
        assert!(db.get_user_by_name("grace").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn readings_round_trip_in_date_order() {
        let (_dir, db) = temp_db().await;
        let user = db.upsert_user("ada", "Ada").await.unwrap();
        let other = db.upsert_user("grace", "Grace").await.unwrap();
        let d1 = parse_iso("2021-01-02 10:00:00").unwrap();
        let d2 = parse_iso("2021-01-01 10:00:00").unwrap();
        db.insert_reading(user.id, d1, parse_decimal("9.50").unwrap()).await.unwrap();
        db.insert_reading(user.id, d2, parse_decimal("10.00").unwrap()).await.unwrap();
        db.insert_reading(user.id, d1, parse_decimal("9.25").unwrap()).await.unwrap();
        db.insert_reading(other.id, d1, parse_decimal("1").unwrap()).await.unwrap();

        let readings = db.readings_for_user(user.id).await.unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].date, d2);
        assert_eq!(readings[1].reading, parse_decimal("9.25").unwrap());

        let last = db.last_reading(user.id).await.unwrap().unwrap();
        assert_eq!(last.date, d1);
        assert!(db.last_reading(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessions_expire_and_can_be_deleted() {
        let (_dir, db) = temp_db().await;
        let user = db.upsert_user("ada", "Ada").await.unwrap();
        db.create_session("live", user.id, "csrf", Duration::days(1)).await.unwrap();
        db.create_session("old", user.id, "csrf2", Duration::days(-1)).await.unwrap();

        let live = db.session("live").await.unwrap().unwrap();
        assert_eq!(live.user, user);
        assert_eq!(live.csrf_token, "csrf");
        assert!(db.session("old").await.unwrap().is_none());
        assert_eq!(db.prune_sessions().await.unwrap(), 1);

        db.delete_session("live").await.unwrap();
        assert!(db.session("live").await.unwrap().is_none());
    }
}
