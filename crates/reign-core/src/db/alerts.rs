//! Alert creation, dedup checks, and the notifications list

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Alert, AlertType};

fn alert_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Alert> {
    let type_str: String = row.get(2)?;
    let created_at_str: String = row.get(7)?;
    Ok(Alert {
        id: row.get(0)?,
        user_id: row.get(1)?,
        alert_type: type_str.parse().unwrap_or(AlertType::SubscriptionDetected),
        card_id: row.get(3)?,
        title: row.get(4)?,
        message: row.get(5)?,
        read: row.get(6)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Create an alert
    ///
    /// `created_at` comes from the caller's clock so dedup windows and
    /// stored timestamps stay on the same timeline.
    ///
    /// Returns None when the insert trips the daily (user, title) unique
    /// index: a concurrent invocation already recorded the same alert, so
    /// suppression is the correct outcome, not an error.
    pub fn create_alert(
        &self,
        user_id: i64,
        alert_type: AlertType,
        card_id: Option<i64>,
        title: &str,
        message: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        let conn = self.conn()?;

        let inserted = conn.execute(
            r#"
            INSERT INTO alerts (user_id, type, card_id, title, message, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                alert_type.as_str(),
                card_id,
                title,
                message,
                format_datetime(created_at)
            ],
        );

        match inserted {
            Ok(_) => Ok(Some(conn.last_insert_rowid())),
            // Only the dedup unique index is a suppression; other
            // constraints (foreign keys included) are storage errors.
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check whether an alert with this exact title was created at or
    /// after `since` (the fast-path dedup check; the unique index is the
    /// authoritative guard)
    pub fn recent_alert_exists(
        &self,
        user_id: i64,
        title: &str,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM alerts WHERE user_id = ? AND title = ? AND created_at >= ?",
            params![user_id, title, format_datetime(since)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Check whether a card-scoped alert of this type was created at or
    /// after `since` (payment-reminder dedup)
    pub fn recent_card_alert_exists(
        &self,
        user_id: i64,
        alert_type: AlertType,
        card_id: i64,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM alerts
            WHERE user_id = ? AND type = ? AND card_id = ? AND created_at >= ?
            "#,
            params![
                user_id,
                alert_type.as_str(),
                card_id,
                format_datetime(since)
            ],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Check whether any alert of the given types was created at or after
    /// `since` (utilization dedup spans both tiers)
    pub fn recent_alert_of_types_exists(
        &self,
        user_id: i64,
        alert_types: &[AlertType],
        since: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.conn()?;
        let placeholders = vec!["?"; alert_types.len()].join(", ");
        let sql = format!(
            "SELECT COUNT(*) FROM alerts WHERE user_id = ?1 AND created_at >= ?2 AND type IN ({})",
            placeholders
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = vec![
            Box::new(user_id),
            Box::new(format_datetime(since)),
        ];
        for t in alert_types {
            values.push(Box::new(t.as_str()));
        }
        let params_ref: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();

        let count: i64 = stmt.query_row(params_ref.as_slice(), |row| row.get(0))?;
        Ok(count > 0)
    }

    /// List a user's alerts, newest first (optionally including read ones)
    pub fn list_alerts(&self, user_id: i64, include_read: bool) -> Result<Vec<Alert>> {
        let conn = self.conn()?;

        let sql = if include_read {
            r#"
            SELECT id, user_id, type, card_id, title, message, read, created_at
            FROM alerts
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#
        } else {
            r#"
            SELECT id, user_id, type, card_id, title, message, read, created_at
            FROM alerts
            WHERE user_id = ? AND read = FALSE
            ORDER BY created_at DESC, id DESC
            "#
        };

        let mut stmt = conn.prepare(sql)?;
        let alerts = stmt
            .query_map(params![user_id], alert_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(alerts)
    }

    /// Count a user's unread alerts
    pub fn count_unread_alerts(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM alerts WHERE user_id = ? AND read = FALSE",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Mark an alert as read
    pub fn mark_alert_read(&self, alert_id: i64) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE alerts SET read = TRUE WHERE id = ?",
            params![alert_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("alert {}", alert_id)));
        }
        Ok(())
    }
}
