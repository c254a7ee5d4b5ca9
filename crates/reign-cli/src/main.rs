//! Reign CLI - Subscription detection and payment reminders
//!
//! Usage:
//!   reign init                          Initialize database
//!   reign users add EMAIL               Register a user
//!   reign transactions add ...          Record a transaction
//!   reign scan --user EMAIL             Detect recurring subscriptions
//!   reign remind                        Run payment reminder cycle

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Users { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                UsersAction::Add { email } => commands::cmd_users_add(&db, &email),
                UsersAction::List => commands::cmd_users_list(&db),
                UsersAction::SetToken {
                    email,
                    token,
                    clear,
                } => {
                    if token.is_none() && !clear {
                        anyhow::bail!("Provide a token, or pass --clear to unregister");
                    }
                    commands::cmd_users_set_token(&db, &email, token.as_deref())
                }
            }
        }
        Commands::Cards { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                CardsAction::Add {
                    user,
                    name,
                    due_day,
                    balance,
                    limit,
                } => commands::cmd_cards_add(&db, &user, &name, due_day, balance, limit),
                CardsAction::List { user } => commands::cmd_cards_list(&db, &user),
            }
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                TransactionsAction::Add {
                    user,
                    amount,
                    description,
                    tx_type,
                    category,
                    date,
                } => commands::cmd_transactions_add(
                    &db,
                    &user,
                    amount,
                    &description,
                    &tx_type,
                    category.as_deref(),
                    date.as_deref(),
                ),
                TransactionsAction::List { user, limit } => {
                    commands::cmd_transactions_list(&db, &user, limit)
                }
            }
        }
        Commands::Scan { user, no_push } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_scan(&db, &user, no_push).await
        }
        Commands::Remind { no_push } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_remind(&db, no_push).await
        }
        Commands::Alerts { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                AlertsAction::List { user, all } => commands::cmd_alerts_list(&db, &user, all),
                AlertsAction::Read { id } => commands::cmd_alerts_read(&db, id),
            }
        }
    }
}
