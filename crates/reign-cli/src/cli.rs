//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Reign - Subscription detection and payment reminders
#[derive(Parser)]
#[command(name = "reign")]
#[command(about = "Self-hosted card and subscription tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "reign.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set REIGN_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database status (encryption, size, etc.)
    Status,

    /// Manage users (add, list, set-token)
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Manage cards (add, list)
    Cards {
        #[command(subcommand)]
        action: CardsAction,
    },

    /// Manage transactions (add, list)
    Transactions {
        #[command(subcommand)]
        action: TransactionsAction,
    },

    /// Scan a user's transactions for recurring subscriptions
    Scan {
        /// User email
        #[arg(short, long)]
        user: String,

        /// Skip push delivery for any new alerts
        #[arg(long)]
        no_push: bool,
    },

    /// Run one payment reminder and utilization cycle over all users
    Remind {
        /// Skip push delivery for any new alerts
        #[arg(long)]
        no_push: bool,
    },

    /// Manage alerts (list, read)
    Alerts {
        #[command(subcommand)]
        action: AlertsAction,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// Add a user (no-op if the email already exists)
    Add {
        /// User email
        email: String,
    },

    /// List users
    List,

    /// Set or clear a user's push token
    SetToken {
        /// User email
        email: String,

        /// Expo push token (omit with --clear to unregister)
        token: Option<String>,

        /// Clear the registered token
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
pub enum CardsAction {
    /// Add a card
    Add {
        /// Owner's email
        #[arg(short, long)]
        user: String,

        /// Card name
        #[arg(long)]
        name: String,

        /// Day of month the payment is due (1-31)
        #[arg(long)]
        due_day: Option<u32>,

        /// Current balance
        #[arg(long, default_value = "0.0")]
        balance: f64,

        /// Credit limit
        #[arg(long)]
        limit: f64,
    },

    /// List a user's cards
    List {
        /// Owner's email
        #[arg(short, long)]
        user: String,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// Record a transaction
    Add {
        /// Owner's email
        #[arg(short, long)]
        user: String,

        /// Amount
        #[arg(short, long)]
        amount: f64,

        /// Merchant description
        #[arg(short, long)]
        description: String,

        /// Transaction type: expense or payment
        #[arg(long, default_value = "expense")]
        tx_type: String,

        /// Category label
        #[arg(long)]
        category: Option<String>,

        /// Transaction date (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// List a user's recent transactions
    List {
        /// Owner's email
        #[arg(short, long)]
        user: String,

        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
}

#[derive(Subcommand)]
pub enum AlertsAction {
    /// List a user's alerts
    List {
        /// User email
        #[arg(short, long)]
        user: String,

        /// Include alerts already marked read
        #[arg(long)]
        all: bool,
    },

    /// Mark an alert as read
    Read {
        /// Alert ID
        id: i64,
    },
}
