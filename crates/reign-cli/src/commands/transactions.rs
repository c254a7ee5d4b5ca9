//! Transaction commands (add, list)

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use reign_core::db::Database;
use reign_core::models::{NewTransaction, TransactionType};

use super::truncate;

/// Parse an optional YYYY-MM-DD date, defaulting to the current time
fn resolve_date(date: Option<&str>) -> Result<DateTime<Utc>> {
    match date {
        None => Ok(Utc::now()),
        Some(s) => {
            let day = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .context("Invalid --date format (use YYYY-MM-DD)")?;
            let noon = day.and_hms_opt(12, 0, 0).expect("valid time of day");
            Ok(DateTime::from_naive_utc_and_offset(noon, Utc))
        }
    }
}

pub fn cmd_transactions_add(
    db: &Database,
    email: &str,
    amount: f64,
    description: &str,
    tx_type: &str,
    category: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let user = db.get_user_by_email(email)?;
    let tx_type: TransactionType = tx_type.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let tx = NewTransaction {
        amount,
        description: description.to_string(),
        tx_type,
        category: category.map(|c| c.to_string()),
        created_at: resolve_date(date)?,
    };

    match db.insert_transaction(user.id, &tx)? {
        Some(id) => println!("✅ Recorded {} ${:.2} (id {})", description, amount, id),
        None => println!("⏭️  Skipped: identical transaction already recorded"),
    }

    Ok(())
}

pub fn cmd_transactions_list(db: &Database, email: &str, limit: u32) -> Result<()> {
    let user = db.get_user_by_email(email)?;
    let transactions = db.list_transactions(user.id, limit as i64)?;

    if transactions.is_empty() {
        println!("No transactions found for {}. Record one with:", email);
        println!("  reign transactions add --user {} --amount 15.99 --description Netflix", email);
        return Ok(());
    }

    println!();
    println!("💵 Transactions for {}", email);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let category = tx.category.as_deref().unwrap_or("-");
        println!(
            "   [{}] {} {:>9.2}  {:<30} {}  ({})",
            tx.id,
            tx.created_at.format("%Y-%m-%d"),
            tx.amount,
            truncate(&tx.description, 30),
            tx.tx_type,
            category
        );
    }

    Ok(())
}
