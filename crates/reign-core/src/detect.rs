//! Recurring charge detection
//!
//! Scans a user's recent expenses for same-merchant charges repeating at
//! an identical amount and flags them as probable subscriptions. Each
//! merchant produces at most one alert per rolling dedup window; the
//! returned finding list is always complete regardless of whether a new
//! alert was raised.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::models::{AlertType, SubscriptionFinding, Transaction};
use crate::push::{DeliveryResult, PushGateway};

/// Detection configuration
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Trailing window of transaction history considered for grouping
    pub lookback_days: i64,
    /// Minimum same-merchant occurrences to classify as recurring
    pub min_occurrences: usize,
    /// Trailing window during which a repeat alert for the same merchant
    /// is suppressed
    pub dedup_window_days: i64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            lookback_days: 90,
            min_occurrences: 2,
            dedup_window_days: 30,
        }
    }
}

/// A same-merchant grouping under evaluation, rebuilt on every scan
struct Candidate {
    /// Trimmed raw description of the newest occurrence
    label: String,
    newest: DateTime<Utc>,
    occurrences: usize,
    /// Distinct charge amounts, in integer cents (exact-match rule)
    amounts: HashSet<i64>,
}

/// Recurring charge detector
pub struct RecurringChargeDetector<'a> {
    db: &'a Database,
    config: DetectorConfig,
    push: Option<&'a dyn PushGateway>,
}

impl<'a> RecurringChargeDetector<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            config: DetectorConfig::default(),
            push: None,
        }
    }

    pub fn with_config(db: &'a Database, config: DetectorConfig) -> Self {
        Self {
            db,
            config,
            push: None,
        }
    }

    pub fn with_push(db: &'a Database, push: &'a dyn PushGateway) -> Self {
        Self {
            db,
            config: DetectorConfig::default(),
            push: Some(push),
        }
    }

    pub fn with_config_and_push(
        db: &'a Database,
        config: DetectorConfig,
        push: &'a dyn PushGateway,
    ) -> Self {
        Self {
            db,
            config,
            push: Some(push),
        }
    }

    /// Scan a user's recent expenses for probable subscriptions
    ///
    /// Returns the complete set of currently-recurring charges in the
    /// lookback window, whether or not a new alert was created for each.
    /// Storage failures abort the scan; push delivery failures do not.
    pub async fn scan(&self, user_id: i64) -> Result<Vec<SubscriptionFinding>> {
        self.scan_at(user_id, Utc::now()).await
    }

    /// Scan with an explicit clock (the window math is relative to `now`)
    pub async fn scan_at(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<SubscriptionFinding>> {
        let since = now - Duration::days(self.config.lookback_days);
        let transactions = self.db.fetch_expense_transactions(user_id, since, now)?;
        if transactions.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = group_candidates(&transactions);

        let findings: Vec<SubscriptionFinding> = candidates
            .into_values()
            .filter(|c| c.occurrences >= self.config.min_occurrences && c.amounts.len() == 1)
            .map(|c| {
                let cents = *c.amounts.iter().next().expect("exactly one amount");
                SubscriptionFinding {
                    name: c.label,
                    monthly_amount: cents as f64 / 100.0,
                }
            })
            .collect();

        let dedup_since = now - Duration::days(self.config.dedup_window_days);
        let mut new_alerts = 0;

        for finding in &findings {
            let title = format!("Subscription Detected: {}", finding.name);

            if self.db.recent_alert_exists(user_id, &title, dedup_since)? {
                debug!(
                    "Skipping alert for {} - already alerted within {} days",
                    finding.name, self.config.dedup_window_days
                );
                continue;
            }

            let message = format!(
                "Recurring charge detected: {} at ${:.2}/month. Review it if you no longer use this service.",
                finding.name, finding.monthly_amount
            );

            match self.db.create_alert(
                user_id,
                AlertType::SubscriptionDetected,
                None,
                &title,
                &message,
                now,
            )? {
                Some(_) => {
                    new_alerts += 1;
                    self.deliver(user_id, &title, &message).await;
                }
                // Lost the race to a concurrent scan; same outcome as the
                // fast-path dedup check.
                None => debug!("Alert for {} suppressed by unique index", finding.name),
            }
        }

        info!(
            "Scan complete for user {}: {} findings, {} new alerts",
            user_id,
            findings.len(),
            new_alerts
        );

        Ok(findings)
    }

    /// Best-effort push delivery; never fails the scan
    async fn deliver(&self, user_id: i64, title: &str, body: &str) {
        let Some(gateway) = self.push else {
            return;
        };

        let token = match self.db.get_push_token(user_id) {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No push token registered for user {}", user_id);
                return;
            }
            Err(e) => {
                warn!("Push token lookup failed for user {}: {}", user_id, e);
                return;
            }
        };

        match gateway.send(&token, title, body).await {
            Ok(DeliveryResult::Accepted) => debug!("Push delivered for user {}", user_id),
            Ok(DeliveryResult::Rejected(reason)) => {
                warn!("Push rejected for user {}: {}", user_id, reason);
            }
            Err(e) => warn!("Push delivery failed for user {}: {}", user_id, e),
        }
    }
}

/// Normalize a merchant label for grouping: trimmed and case-folded
fn normalize_description(description: &str) -> String {
    description.trim().to_lowercase()
}

/// Convert a currency amount to integer cents
///
/// Amounts are compared exactly; doing it in cents keeps f64 rounding
/// noise out of the distinct-amount set.
fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Group transactions into candidates keyed by normalized description
///
/// BTreeMap keeps candidate iteration (and therefore finding order)
/// deterministic.
fn group_candidates(transactions: &[Transaction]) -> BTreeMap<String, Candidate> {
    let mut candidates: BTreeMap<String, Candidate> = BTreeMap::new();

    for tx in transactions {
        let key = normalize_description(&tx.description);
        let entry = candidates.entry(key).or_insert_with(|| Candidate {
            label: tx.description.trim().to_string(),
            newest: tx.created_at,
            occurrences: 0,
            amounts: HashSet::new(),
        });

        entry.occurrences += 1;
        entry.amounts.insert(to_cents(tx.amount));
        if tx.created_at > entry.newest {
            entry.newest = tx.created_at;
            entry.label = tx.description.trim().to_string();
        }
    }

    candidates
}
