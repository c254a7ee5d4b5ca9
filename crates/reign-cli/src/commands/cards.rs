//! Card management commands (add, list)

use anyhow::Result;
use reign_core::db::Database;

pub fn cmd_cards_add(
    db: &Database,
    email: &str,
    name: &str,
    due_day: Option<u32>,
    balance: f64,
    limit: f64,
) -> Result<()> {
    let user = db.get_user_by_email(email)?;
    let id = db.insert_card(user.id, name, due_day, balance, limit)?;

    println!("✅ Card '{}' added (id {})", name, id);
    if due_day.is_none() {
        println!("   💡 Tip: set --due-day to receive payment reminders");
    }

    Ok(())
}

pub fn cmd_cards_list(db: &Database, email: &str) -> Result<()> {
    let user = db.get_user_by_email(email)?;
    let cards = db.list_cards(user.id)?;

    if cards.is_empty() {
        println!("No cards found for {}. Add one with:", email);
        println!("  reign cards add --user {} --name Sapphire --limit 5000", email);
        return Ok(());
    }

    println!();
    println!("💳 Cards for {}", email);
    println!("   ─────────────────────────────────────────────────────────────");

    for card in cards {
        let due = match card.due_day {
            Some(day) => format!("due day {}", day),
            None => "no due day".to_string(),
        };
        let utilization = if card.credit_limit > 0.0 {
            format!("{:.0}%", card.balance / card.credit_limit * 100.0)
        } else {
            "n/a".to_string()
        };
        println!(
            "   [{}] {}: ${:.2} of ${:.2} ({}), {}",
            card.id, card.name, card.balance, card.credit_limit, utilization, due
        );
    }

    Ok(())
}
