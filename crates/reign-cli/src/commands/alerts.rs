//! Alert commands (list, mark read)

use anyhow::Result;
use reign_core::db::Database;
use reign_core::models::AlertType;

pub fn cmd_alerts_list(db: &Database, email: &str, include_read: bool) -> Result<()> {
    let user = db.get_user_by_email(email)?;
    let alerts = db.list_alerts(user.id, include_read)?;

    if alerts.is_empty() {
        if include_read {
            println!("No alerts for {}.", email);
        } else {
            println!("✅ No unread alerts for {}.", email);
        }
        return Ok(());
    }

    println!();
    println!("⚠️  Alerts for {}", email);
    println!("   ─────────────────────────────────────────────────────────────");

    for alert in &alerts {
        let type_icon = match alert.alert_type {
            AlertType::SubscriptionDetected => "📋",
            AlertType::PaymentReminder => "⏰",
            AlertType::UtilizationWarning => "📈",
            AlertType::UtilizationCritical => "🚨",
        };
        let read_mark = if alert.read { " (read)" } else { "" };

        println!("   {} [{}] {}{}", type_icon, alert.id, alert.title, read_mark);
        println!("      {}", alert.message);
        println!("      {}", alert.created_at.format("%Y-%m-%d %H:%M"));
        println!();
    }

    Ok(())
}

pub fn cmd_alerts_read(db: &Database, alert_id: i64) -> Result<()> {
    db.mark_alert_read(alert_id)?;
    println!("✅ Alert {} marked read", alert_id);
    Ok(())
}
