use crate::model::{DailyCount, FeatureCount, FeatureUsage, Feedback, InboxReport, StorageError};
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, Row, params};

/// Days of history shown in the inbox usage chart.
pub const INBOX_WINDOW_DAYS: i64 = 7;

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database and creates the tables if needed.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS feedback (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                message TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS feature_usage (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                feature_name TEXT NOT NULL,
                details TEXT,
                used_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_feature_usage_used_at ON feature_usage (used_at);
            ",
        )?;

        Ok(Self { conn })
    }

    /// Stores a feedback message stamped with the current time.
    pub fn save_feedback(&self, name: Option<&str>, message: &str) -> Result<Feedback, StorageError> {
        let created_at = now_seconds();
        self.conn.execute(
            "INSERT INTO feedback (name, message, created_at) VALUES (?1, ?2, ?3)",
            params![name, message, to_text(&created_at)],
        )?;

        Ok(Feedback {
            id: self.conn.last_insert_rowid(),
            name: name.map(str::to_string),
            message: message.to_string(),
            created_at,
        })
    }

    /// All feedback, newest first.
    pub fn list_feedback(&self) -> Result<Vec<Feedback>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, message, created_at FROM feedback ORDER BY created_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], Self::map_feedback)?;
        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }

        Ok(messages)
    }

    /// Records one use of a feature.
    pub fn record_usage(&self, feature_name: &str, details: Option<&str>) -> Result<FeatureUsage, StorageError> {
        self.record_usage_at(feature_name, details, now_seconds())
    }

    pub fn record_usage_at(
        &self,
        feature_name: &str,
        details: Option<&str>,
        used_at: DateTime<Utc>,
    ) -> Result<FeatureUsage, StorageError> {
        self.conn.execute(
            "INSERT INTO feature_usage (feature_name, details, used_at) VALUES (?1, ?2, ?3)",
            params![feature_name, details, to_text(&used_at)],
        )?;

        Ok(FeatureUsage {
            id: self.conn.last_insert_rowid(),
            feature_name: feature_name.to_string(),
            details: details.map(str::to_string),
            used_at,
        })
    }

    #[cfg(test)]
    pub fn list_usage(&self) -> Result<Vec<FeatureUsage>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, feature_name, details, used_at FROM feature_usage ORDER BY used_at ASC, id ASC",
        )?;

        let rows = stmt.query_map([], Self::map_usage)?;
        let mut usage = Vec::new();
        for row in rows {
            usage.push(row?);
        }

        Ok(usage)
    }

    pub fn usage_total(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM feature_usage", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Number of uses per feature, sorted by feature name.
    pub fn usage_by_feature(&self) -> Result<Vec<FeatureCount>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT feature_name, COUNT(*) FROM feature_usage GROUP BY feature_name ORDER BY feature_name ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let feature_name: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok(FeatureCount {
                feature_name,
                count: count.max(0) as u64,
            })
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }

        Ok(counts)
    }

    /// Number of uses per UTC day at or after `since`, oldest day first.
    pub fn daily_usage_since(&self, since: DateTime<Utc>) -> Result<Vec<DailyCount>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT substr(used_at, 1, 10) AS day, COUNT(*) FROM feature_usage
             WHERE used_at >= ?1 GROUP BY day ORDER BY day ASC",
        )?;

        let rows = stmt.query_map(params![to_text(&since)], |row| {
            let day: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((day, count))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            let (day, count) = row?;
            let day = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                .map_err(|e| StorageError::InvalidTimestamp(format!("{}: {}", day, e)))?;
            counts.push(DailyCount {
                day,
                count: count.max(0) as u64,
            });
        }

        Ok(counts)
    }

    /// Collects everything the inbox shows, relative to `now`.
    pub fn inbox_report(&self, now: DateTime<Utc>) -> Result<InboxReport, StorageError> {
        Ok(InboxReport {
            messages: self.list_feedback()?,
            total_usage: self.usage_total()?,
            feature_counts: self.usage_by_feature()?,
            daily_counts: self.daily_usage_since(now - Duration::days(INBOX_WINDOW_DAYS))?,
        })
    }

    fn map_feedback(row: &Row) -> Result<Feedback, rusqlite::Error> {
        Ok(Feedback {
            id: row.get(0)?,
            name: row.get(1)?,
            message: row.get(2)?,
            created_at: parse_column(row, 3)?,
        })
    }

    #[cfg(test)]
    fn map_usage(row: &Row) -> Result<FeatureUsage, rusqlite::Error> {
        Ok(FeatureUsage {
            id: row.get(0)?,
            feature_name: row.get(1)?,
            details: row.get(2)?,
            used_at: parse_column(row, 3)?,
        })
    }
}

/// Current time truncated to whole seconds, so stored and returned values agree.
fn now_seconds() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}

/// Fixed-width RFC 3339 text, which sorts chronologically as a string.
fn to_text(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_column(row: &Row, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}
