//! Domain models for Reign

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An app user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Expo push token, set once the device registers for notifications
    pub push_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A credit card tracked for payment reminders and utilization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// Day of month the payment is due (1-31); None when the issuer
    /// doesn't report one
    pub due_day: Option<u32>,
    pub balance: f64,
    pub credit_limit: f64,
    pub created_at: DateTime<Utc>,
}

/// Transaction type - expenses are candidates for detection, payments never are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expense,
    Payment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Payment => "payment",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "payment" => Ok(Self::Payment),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial transaction
///
/// Created by upstream ingestion (bank sync or manual entry) and never
/// mutated by the detection layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    /// Always positive for expenses
    pub amount: f64,
    /// Free-text merchant label as supplied by the data source
    pub description: String,
    pub tx_type: TransactionType,
    pub category: Option<String>,
    /// Hash for ingestion-replay deduplication
    pub import_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A new transaction to be recorded (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: f64,
    pub description: String,
    pub tx_type: TransactionType,
    pub category: Option<String>,
    /// Timestamp supplied by the ingestion source
    pub created_at: DateTime<Utc>,
}

/// Alert type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// A probable subscription was detected in recent expenses
    SubscriptionDetected,
    /// A card payment is due soon
    PaymentReminder,
    /// Credit utilization crossed the warning tier
    UtilizationWarning,
    /// Credit utilization crossed the critical tier
    UtilizationCritical,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubscriptionDetected => "subscription_detected",
            Self::PaymentReminder => "payment_reminder",
            Self::UtilizationWarning => "utilization_warning",
            Self::UtilizationCritical => "utilization_critical",
        }
    }
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "subscription_detected" => Ok(Self::SubscriptionDetected),
            "payment_reminder" => Ok(Self::PaymentReminder),
            "utilization_warning" => Ok(Self::UtilizationWarning),
            "utilization_critical" => Ok(Self::UtilizationCritical),
            _ => Err(format!("Unknown alert type: {}", s)),
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted alert, surfaced through the notifications list
///
/// The read flag is owned by the notification surface; detection only
/// ever creates alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub user_id: i64,
    pub alert_type: AlertType,
    /// Set for card-scoped alerts (payment reminders)
    pub card_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// A recurring charge classified as a likely subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionFinding {
    /// Merchant name as it appears on the newest charge
    pub name: String,
    pub monthly_amount: f64,
}
