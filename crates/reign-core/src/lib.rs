//! Reign Core Library
//!
//! Shared functionality for the Reign personal finance tool:
//! - Database access and migrations
//! - Recurring subscription charge detection
//! - Payment reminder and credit utilization scheduling
//! - Pluggable push delivery gateways (Expo, mock)

pub mod db;
pub mod detect;
pub mod error;
pub mod models;
pub mod push;
pub mod remind;

pub use db::Database;
pub use detect::{DetectorConfig, RecurringChargeDetector};
pub use error::{Error, Result};
pub use models::{
    Alert, AlertType, Card, NewTransaction, SubscriptionFinding, Transaction, TransactionType,
    User,
};
pub use push::{DeliveryResult, ExpoGateway, MockGateway, PushGateway, PushMessage};
pub use remind::{PaymentReminderScheduler, ReminderConfig, ReminderResults};
