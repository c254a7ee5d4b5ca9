//! Payment reminders and utilization warnings
//!
//! Two independent rules run per cycle:
//! - Due-date reminders: a card whose payment lands exactly 7, 3, or 1
//!   days out gets a reminder, deduped over 24 hours per card.
//! - Utilization tiers: pooled balance over pooled limit above 30%
//!   (warning) or 70% (critical), deduped over 7 days per user.
//!
//! Newly created alerts from both rules are merged into one outbound
//! push batch per cycle.

use chrono::{DateTime, Datelike, Duration, Utc};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::models::AlertType;
use crate::push::{DeliveryResult, PushGateway, PushMessage};

/// Reminder configuration
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// Days-until-due values that trigger a reminder
    pub reminder_offsets: [i64; 3],
    /// Dedup window for repeat reminders on the same card
    pub reminder_dedup_hours: i64,
    /// Utilization ratio above which the warning tier fires
    pub utilization_warning: f64,
    /// Utilization ratio above which the critical tier fires
    pub utilization_critical: f64,
    /// Dedup window for repeat utilization alerts
    pub utilization_dedup_days: i64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            reminder_offsets: [7, 3, 1],
            reminder_dedup_hours: 24,
            utilization_warning: 0.30,
            utilization_critical: 0.70,
            utilization_dedup_days: 7,
        }
    }
}

/// Results of running one reminder cycle
#[derive(Debug, Default)]
pub struct ReminderResults {
    pub reminders_created: usize,
    pub utilization_alerts_created: usize,
    pub pushes_sent: usize,
    pub pushes_failed: usize,
}

/// Scheduler that runs the reminder rules across all users
pub struct PaymentReminderScheduler<'a> {
    db: &'a Database,
    config: ReminderConfig,
    push: Option<&'a dyn PushGateway>,
}

impl<'a> PaymentReminderScheduler<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            config: ReminderConfig::default(),
            push: None,
        }
    }

    pub fn with_config(db: &'a Database, config: ReminderConfig) -> Self {
        Self {
            db,
            config,
            push: None,
        }
    }

    pub fn with_push(db: &'a Database, push: &'a dyn PushGateway) -> Self {
        Self {
            db,
            config: ReminderConfig::default(),
            push: Some(push),
        }
    }

    pub fn with_config_and_push(
        db: &'a Database,
        config: ReminderConfig,
        push: &'a dyn PushGateway,
    ) -> Self {
        Self {
            db,
            config,
            push: Some(push),
        }
    }

    /// Run one reminder cycle over all users
    pub async fn run_cycle(&self) -> Result<ReminderResults> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle with an explicit clock
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<ReminderResults> {
        let mut results = ReminderResults::default();
        let mut batch: Vec<PushMessage> = Vec::new();

        for user in self.db.list_users()? {
            let cards = self.db.list_cards(user.id)?;

            // Rule 1: due-date reminders, per card
            for card in &cards {
                let Some(due_day) = card.due_day else {
                    continue;
                };

                let days = days_until_due(due_day, now.day());
                if !self.config.reminder_offsets.contains(&days) {
                    continue;
                }

                let since = now - Duration::hours(self.config.reminder_dedup_hours);
                if self
                    .db
                    .recent_card_alert_exists(user.id, AlertType::PaymentReminder, card.id, since)?
                {
                    debug!("Reminder for card {} already sent today", card.id);
                    continue;
                }

                let title = format!("Payment Reminder: {}", card.name);
                let message = if days == 1 {
                    format!("Your {} payment is due tomorrow.", card.name)
                } else {
                    format!("Your {} payment is due in {} days.", card.name, days)
                };

                if self
                    .db
                    .create_alert(
                        user.id,
                        AlertType::PaymentReminder,
                        Some(card.id),
                        &title,
                        &message,
                        now,
                    )?
                    .is_some()
                {
                    results.reminders_created += 1;
                    if let Some(token) = &user.push_token {
                        batch.push(PushMessage {
                            token: token.clone(),
                            title,
                            body: message,
                        });
                    }
                }
            }

            // Rule 2: pooled utilization tiers
            let total_limit: f64 = cards.iter().map(|c| c.credit_limit).sum();
            let total_balance: f64 = cards.iter().map(|c| c.balance).sum();
            if total_limit <= 0.0 {
                continue;
            }

            let utilization = total_balance / total_limit;
            let tier = if utilization > self.config.utilization_critical {
                Some((
                    AlertType::UtilizationCritical,
                    "Critical Credit Utilization".to_string(),
                    format!(
                        "Your credit utilization is {:.0}%. High utilization can hurt your score - consider paying down balances.",
                        utilization * 100.0
                    ),
                ))
            } else if utilization > self.config.utilization_warning {
                Some((
                    AlertType::UtilizationWarning,
                    "Credit Utilization Warning".to_string(),
                    format!(
                        "Your credit utilization is {:.0}%. Keeping it under 30% helps your score.",
                        utilization * 100.0
                    ),
                ))
            } else {
                None
            };

            let Some((alert_type, title, message)) = tier else {
                continue;
            };

            // Dedup spans both tiers so a warning doesn't re-fire daily as
            // the balance drifts around a threshold.
            let since = now - Duration::days(self.config.utilization_dedup_days);
            if self.db.recent_alert_of_types_exists(
                user.id,
                &[
                    AlertType::UtilizationWarning,
                    AlertType::UtilizationCritical,
                ],
                since,
            )? {
                debug!("Utilization alert for user {} still in dedup window", user.id);
                continue;
            }

            if self
                .db
                .create_alert(user.id, alert_type, None, &title, &message, now)?
                .is_some()
            {
                results.utilization_alerts_created += 1;
                if let Some(token) = &user.push_token {
                    batch.push(PushMessage {
                        token: token.clone(),
                        title,
                        body: message,
                    });
                }
            }
        }

        // One outbound push batch per cycle, best-effort
        if let Some(gateway) = self.push {
            if !batch.is_empty() {
                for outcome in gateway.send_batch(&batch).await {
                    match outcome {
                        Ok(DeliveryResult::Accepted) => results.pushes_sent += 1,
                        Ok(DeliveryResult::Rejected(reason)) => {
                            results.pushes_failed += 1;
                            warn!("Push rejected: {}", reason);
                        }
                        Err(e) => {
                            results.pushes_failed += 1;
                            warn!("Push delivery failed: {}", e);
                        }
                    }
                }
            }
        }

        info!(
            "Reminder cycle complete: {} reminders, {} utilization alerts, {} pushes sent, {} failed",
            results.reminders_created,
            results.utilization_alerts_created,
            results.pushes_sent,
            results.pushes_failed
        );

        Ok(results)
    }
}

/// Days until a card's due day, on the 30-day wheel the mobile app uses
///
/// `(due_day - current_day) mod 30`; months with 31 days inherit the
/// source behavior of treating the 31st as day 1 of the next wheel.
fn days_until_due(due_day: u32, current_day: u32) -> i64 {
    (due_day as i64 - current_day as i64).rem_euclid(30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rusqlite::params;

    fn fixed_now(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, day, 12, 0, 0).unwrap()
    }

    fn alert_count(db: &Database, user_id: i64, alert_type: &str) -> i64 {
        let conn = db.conn().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM alerts WHERE user_id = ? AND type = ?",
            params![user_id, alert_type],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_days_until_due_wheel() {
        assert_eq!(days_until_due(15, 8), 7);
        assert_eq!(days_until_due(5, 28), 7); // wraps month end
        assert_eq!(days_until_due(10, 9), 1);
        assert_eq!(days_until_due(1, 30), 1);
        assert_eq!(days_until_due(10, 10), 0);
        assert_eq!(days_until_due(10, 13), 27);
    }

    #[tokio::test]
    async fn test_reminder_fires_at_exact_offsets() {
        let db = Database::in_memory().unwrap();
        let user = db.upsert_user("remind@test.local").unwrap();
        // Due on the 17th; "today" is the 10th, so 7 days out
        db.insert_card(user, "Sapphire", Some(17), 100.0, 5000.0)
            .unwrap();
        // Due on the 15th; 5 days out, no reminder
        db.insert_card(user, "Freedom", Some(15), 100.0, 5000.0)
            .unwrap();

        let scheduler = PaymentReminderScheduler::new(&db);
        let results = scheduler.run_cycle_at(fixed_now(10)).await.unwrap();

        assert_eq!(results.reminders_created, 1);
        assert_eq!(alert_count(&db, user, "payment_reminder"), 1);

        let alerts = db.list_alerts(user, true).unwrap();
        assert_eq!(alerts[0].title, "Payment Reminder: Sapphire");
    }

    #[tokio::test]
    async fn test_reminder_deduped_within_24_hours() {
        let db = Database::in_memory().unwrap();
        let user = db.upsert_user("remind@test.local").unwrap();
        db.insert_card(user, "Sapphire", Some(17), 100.0, 5000.0)
            .unwrap();

        let scheduler = PaymentReminderScheduler::new(&db);
        scheduler.run_cycle_at(fixed_now(10)).await.unwrap();
        let second = scheduler.run_cycle_at(fixed_now(10)).await.unwrap();

        assert_eq!(second.reminders_created, 0);
        assert_eq!(alert_count(&db, user, "payment_reminder"), 1);
    }

    #[tokio::test]
    async fn test_utilization_tiers() {
        let db = Database::in_memory().unwrap();

        let low = db.upsert_user("low@test.local").unwrap();
        db.insert_card(low, "Low Card", None, 200.0, 1000.0).unwrap();

        let warn = db.upsert_user("warn@test.local").unwrap();
        db.insert_card(warn, "Warn Card", None, 400.0, 1000.0).unwrap();

        let crit = db.upsert_user("crit@test.local").unwrap();
        db.insert_card(crit, "Crit Card", None, 800.0, 1000.0).unwrap();

        let scheduler = PaymentReminderScheduler::new(&db);
        let results = scheduler.run_cycle_at(fixed_now(20)).await.unwrap();

        assert_eq!(results.utilization_alerts_created, 2);
        assert_eq!(alert_count(&db, low, "utilization_warning"), 0);
        assert_eq!(alert_count(&db, warn, "utilization_warning"), 1);
        assert_eq!(alert_count(&db, crit, "utilization_critical"), 1);
        // Critical tier wins outright, not in addition
        assert_eq!(alert_count(&db, crit, "utilization_warning"), 0);
    }

    #[tokio::test]
    async fn test_utilization_threshold_is_exclusive() {
        let db = Database::in_memory().unwrap();
        let user = db.upsert_user("edge@test.local").unwrap();
        // Exactly 30%: does not exceed the warning tier
        db.insert_card(user, "Edge Card", None, 300.0, 1000.0).unwrap();

        let scheduler = PaymentReminderScheduler::new(&db);
        let results = scheduler.run_cycle_at(fixed_now(20)).await.unwrap();

        assert_eq!(results.utilization_alerts_created, 0);
    }

    #[tokio::test]
    async fn test_utilization_pools_across_cards() {
        let db = Database::in_memory().unwrap();
        let user = db.upsert_user("pool@test.local").unwrap();
        // 900 / 2000 = 45% pooled even though one card is maxed out
        db.insert_card(user, "Maxed", None, 900.0, 1000.0).unwrap();
        db.insert_card(user, "Empty", None, 0.0, 1000.0).unwrap();

        let scheduler = PaymentReminderScheduler::new(&db);
        scheduler.run_cycle_at(fixed_now(20)).await.unwrap();

        assert_eq!(alert_count(&db, user, "utilization_warning"), 1);
        assert_eq!(alert_count(&db, user, "utilization_critical"), 0);
    }

    #[tokio::test]
    async fn test_utilization_deduped_across_tiers() {
        let db = Database::in_memory().unwrap();
        let user = db.upsert_user("dedup@test.local").unwrap();
        let card = db.insert_card(user, "Card", None, 400.0, 1000.0).unwrap();

        let scheduler = PaymentReminderScheduler::new(&db);
        scheduler.run_cycle_at(fixed_now(20)).await.unwrap();

        // Balance climbs into the critical tier the next day, but the
        // 7-day window still holds
        db.update_card_balance(card, 800.0, 1000.0).unwrap();
        let results = scheduler.run_cycle_at(fixed_now(21)).await.unwrap();

        assert_eq!(results.utilization_alerts_created, 0);
        assert_eq!(alert_count(&db, user, "utilization_critical"), 0);
    }

    #[tokio::test]
    async fn test_rules_merge_into_one_push_batch() {
        use crate::push::MockGateway;

        let db = Database::in_memory().unwrap();
        let user = db.upsert_user("batch@test.local").unwrap();
        db.set_push_token(user, Some("ExponentPushToken[batch]"))
            .unwrap();
        // Due in 3 days AND 80% utilization
        db.insert_card(user, "Busy Card", Some(13), 800.0, 1000.0)
            .unwrap();

        let gateway = MockGateway::new();
        let scheduler = PaymentReminderScheduler::with_push(&db, &gateway);
        let results = scheduler.run_cycle_at(fixed_now(10)).await.unwrap();

        assert_eq!(results.reminders_created, 1);
        assert_eq!(results.utilization_alerts_created, 1);
        assert_eq!(results.pushes_sent, 2);
        assert_eq!(gateway.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_push_failures_counted_not_fatal() {
        use crate::push::MockGateway;

        let db = Database::in_memory().unwrap();
        let user = db.upsert_user("fail@test.local").unwrap();
        db.set_push_token(user, Some("ExponentPushToken[fail]"))
            .unwrap();
        db.insert_card(user, "Card", Some(11), 0.0, 1000.0).unwrap();

        let gateway = MockGateway::failing();
        let scheduler = PaymentReminderScheduler::with_push(&db, &gateway);
        let results = scheduler.run_cycle_at(fixed_now(10)).await.unwrap();

        assert_eq!(results.reminders_created, 1);
        assert_eq!(results.pushes_failed, 1);
        assert_eq!(alert_count(&db, user, "payment_reminder"), 1);
    }
}
