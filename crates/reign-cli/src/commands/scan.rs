//! Detection and reminder cycle commands

use anyhow::Result;
use reign_core::db::Database;
use reign_core::detect::RecurringChargeDetector;
use reign_core::push::ExpoGateway;
use reign_core::remind::PaymentReminderScheduler;
use tracing::debug;

pub async fn cmd_scan(db: &Database, email: &str, no_push: bool) -> Result<()> {
    println!("🔍 Scanning {} for recurring charges...", email);

    let user = db.get_user_by_email(email)?;

    let gateway;
    let detector = if no_push {
        debug!("Push delivery disabled (--no-push)");
        RecurringChargeDetector::new(db)
    } else {
        gateway = ExpoGateway::from_env();
        RecurringChargeDetector::with_push(db, &gateway)
    };

    let findings = detector.scan(user.id).await?;
    debug!("Scan returned {} findings for user {}", findings.len(), user.id);

    if findings.is_empty() {
        println!("✅ No recurring charges detected.");
        return Ok(());
    }

    println!();
    println!("📋 Recurring charges");
    println!("   ─────────────────────────────");
    for finding in &findings {
        println!("   {} at ${:.2}/month", finding.name, finding.monthly_amount);
    }

    println!();
    println!(
        "⚠️  {} recurring charges found. Run 'reign alerts list --user {}' for details.",
        findings.len(),
        email
    );

    Ok(())
}

pub async fn cmd_remind(db: &Database, no_push: bool) -> Result<()> {
    println!("⏰ Running reminder cycle...");

    let gateway;
    let scheduler = if no_push {
        debug!("Push delivery disabled (--no-push)");
        PaymentReminderScheduler::new(db)
    } else {
        gateway = ExpoGateway::from_env();
        PaymentReminderScheduler::with_push(db, &gateway)
    };

    let results = scheduler.run_cycle().await?;

    println!();
    println!("📊 Cycle Results");
    println!("   ─────────────────────────────");
    println!("   Payment reminders: {}", results.reminders_created);
    println!("   Utilization alerts: {}", results.utilization_alerts_created);
    if !no_push {
        println!(
            "   Pushes: {} sent, {} failed",
            results.pushes_sent, results.pushes_failed
        );
    }

    let total = results.reminders_created + results.utilization_alerts_created;
    if total == 0 {
        println!();
        println!("✅ Nothing due. All quiet.");
    }

    Ok(())
}
