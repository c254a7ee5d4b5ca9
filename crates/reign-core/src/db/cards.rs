//! Credit card operations

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Card;

fn card_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Card> {
    let created_at_str: String = row.get(6)?;
    Ok(Card {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        due_day: row.get(3)?,
        balance: row.get(4)?,
        credit_limit: row.get(5)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Add a card for a user
    pub fn insert_card(
        &self,
        user_id: i64,
        name: &str,
        due_day: Option<u32>,
        balance: f64,
        credit_limit: f64,
    ) -> Result<i64> {
        if let Some(day) = due_day {
            if !(1..=31).contains(&day) {
                return Err(Error::InvalidData(format!(
                    "due_day must be 1-31, got {}",
                    day
                )));
            }
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO cards (user_id, name, due_day, balance, credit_limit)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![user_id, name, due_day, balance, credit_limit],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Update a card's balance and limit (from issuer sync)
    pub fn update_card_balance(&self, card_id: i64, balance: f64, credit_limit: f64) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE cards SET balance = ?, credit_limit = ? WHERE id = ?",
            params![balance, credit_limit, card_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("card {}", card_id)));
        }
        Ok(())
    }

    /// List a user's cards
    pub fn list_cards(&self, user_id: i64) -> Result<Vec<Card>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, name, due_day, balance, credit_limit, created_at
            FROM cards
            WHERE user_id = ?
            ORDER BY id
            "#,
        )?;

        let cards = stmt
            .query_map(params![user_id], card_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(cards)
    }
}
