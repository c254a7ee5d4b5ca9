//! Transaction recording and window queries

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};

use super::{format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction, TransactionType};

/// Hash the fields that identify a transaction across ingestion replays
fn compute_import_hash(user_id: i64, tx: &NewTransaction) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.to_le_bytes());
    hasher.update(format_datetime(tx.created_at).as_bytes());
    hasher.update(tx.description.as_bytes());
    hasher.update(format!("{:.2}", tx.amount).as_bytes());
    hasher.update(tx.tx_type.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

fn transaction_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let type_str: String = row.get(4)?;
    let created_at_str: String = row.get(7)?;
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        tx_type: type_str
            .parse()
            .unwrap_or(TransactionType::Expense),
        category: row.get(5)?,
        import_hash: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Insert a transaction (skips duplicates based on import_hash)
    ///
    /// Returns None when the same record was already ingested.
    pub fn insert_transaction(&self, user_id: i64, tx: &NewTransaction) -> Result<Option<i64>> {
        let conn = self.conn()?;

        let import_hash = compute_import_hash(user_id, tx);

        // Check for duplicate
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM transactions WHERE import_hash = ?",
                params![import_hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None); // Duplicate, skip
        }

        conn.execute(
            r#"
            INSERT INTO transactions (user_id, amount, description, type, category, import_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                tx.amount,
                tx.description,
                tx.tx_type.as_str(),
                tx.category,
                import_hash,
                format_datetime(tx.created_at),
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// Fetch a user's expense transactions created within `[since, until]`
    ///
    /// Ordered by description then created_at descending; the detector
    /// relies on that only for deterministic grouping. Both bounds are
    /// inclusive; the upper bound keeps future-dated records out of a
    /// scan window anchored at its caller's clock.
    pub fn fetch_expense_transactions(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, amount, description, type, category, import_hash, created_at
            FROM transactions
            WHERE user_id = ? AND type = 'expense' AND created_at >= ? AND created_at <= ?
            ORDER BY description, created_at DESC
            "#,
        )?;

        let transactions = stmt
            .query_map(
                params![user_id, format_datetime(since), format_datetime(until)],
                transaction_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// List a user's transactions, newest first
    pub fn list_transactions(&self, user_id: i64, limit: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, amount, description, type, category, import_hash, created_at
            FROM transactions
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let transactions = stmt
            .query_map(params![user_id, limit], transaction_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }
}
