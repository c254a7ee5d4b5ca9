//! User accounts and push-token registration

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::User;

impl Database {
    /// Create a user, or return the existing ID for the same email
    pub fn upsert_user(&self, email: &str) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?",
                params![email],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute("INSERT INTO users (email) VALUES (?)", params![email])?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a user by ID
    pub fn get_user(&self, id: i64) -> Result<User> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT id, email, push_token, created_at FROM users WHERE id = ?",
            params![id],
            |row| {
                let created_at_str: String = row.get(3)?;
                Ok(User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    push_token: row.get(2)?,
                    created_at: parse_datetime(&created_at_str),
                })
            },
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    /// Get a user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<User> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT id, email, push_token, created_at FROM users WHERE email = ?",
            params![email],
            |row| {
                let created_at_str: String = row.get(3)?;
                Ok(User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    push_token: row.get(2)?,
                    created_at: parse_datetime(&created_at_str),
                })
            },
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("user {}", email)))
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;

        let mut stmt =
            conn.prepare("SELECT id, email, push_token, created_at FROM users ORDER BY id")?;

        let users = stmt
            .query_map([], |row| {
                let created_at_str: String = row.get(3)?;
                Ok(User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    push_token: row.get(2)?,
                    created_at: parse_datetime(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Set (or clear) a user's push token
    pub fn set_push_token(&self, user_id: i64, token: Option<&str>) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE users SET push_token = ? WHERE id = ?",
            params![token, user_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    /// Look up a user's push token (None when unregistered)
    pub fn get_push_token(&self, user_id: i64) -> Result<Option<String>> {
        let conn = self.conn()?;
        let token: Option<Option<String>> = conn
            .query_row(
                "SELECT push_token FROM users WHERE id = ?",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        token.ok_or_else(|| Error::NotFound(format!("user {}", user_id)))
    }
}
