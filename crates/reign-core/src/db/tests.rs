//! Database tests

use super::*;
use crate::models::*;

use chrono::Duration;
use rusqlite::params;

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    let users = db.list_users().unwrap();
    assert!(users.is_empty());
}

#[test]
fn test_user_upsert_and_token() {
    let db = Database::in_memory().unwrap();

    let id = db.upsert_user("me@example.com").unwrap();
    assert!(id > 0);

    // Upsert same email returns same ID
    let id2 = db.upsert_user("me@example.com").unwrap();
    assert_eq!(id, id2);

    assert_eq!(db.get_push_token(id).unwrap(), None);
    db.set_push_token(id, Some("ExponentPushToken[x]")).unwrap();
    assert_eq!(
        db.get_push_token(id).unwrap().as_deref(),
        Some("ExponentPushToken[x]")
    );

    db.set_push_token(id, None).unwrap();
    assert_eq!(db.get_push_token(id).unwrap(), None);
}

#[test]
fn test_push_token_for_missing_user() {
    let db = Database::in_memory().unwrap();
    assert!(matches!(
        db.get_push_token(999),
        Err(crate::error::Error::NotFound(_))
    ));
}

#[test]
fn test_card_crud() {
    let db = Database::in_memory().unwrap();
    let user = db.upsert_user("cards@example.com").unwrap();

    let id = db
        .insert_card(user, "Sapphire", Some(17), 1200.0, 5000.0)
        .unwrap();
    assert!(id > 0);

    // due_day must be a day of month
    assert!(db.insert_card(user, "Bad", Some(32), 0.0, 1000.0).is_err());
    assert!(db.insert_card(user, "Bad", Some(0), 0.0, 1000.0).is_err());

    db.update_card_balance(id, 800.0, 6000.0).unwrap();

    let cards = db.list_cards(user).unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].name, "Sapphire");
    assert_eq!(cards[0].balance, 800.0);
    assert_eq!(cards[0].credit_limit, 6000.0);
    assert_eq!(cards[0].due_day, Some(17));
}

#[test]
fn test_transaction_replay_dedup() {
    let db = Database::in_memory().unwrap();
    let user = db.upsert_user("tx@example.com").unwrap();
    let now = Utc::now();

    let tx = NewTransaction {
        amount: 19.99,
        description: "Netflix".to_string(),
        tx_type: TransactionType::Expense,
        category: Some("Entertainment".to_string()),
        created_at: now,
    };

    assert!(db.insert_transaction(user, &tx).unwrap().is_some());
    // Replaying the identical record is skipped
    assert!(db.insert_transaction(user, &tx).unwrap().is_none());

    // Same charge at a different time is a distinct record
    let later = NewTransaction {
        created_at: now + Duration::days(30),
        ..tx
    };
    assert!(db.insert_transaction(user, &later).unwrap().is_some());

    assert_eq!(db.list_transactions(user, 10).unwrap().len(), 2);
}

#[test]
fn test_expense_fetch_filters_type_and_window() {
    let db = Database::in_memory().unwrap();
    let user = db.upsert_user("window@example.com").unwrap();
    let now = Utc::now();

    for (desc, tx_type, days_ago) in [
        ("Netflix", TransactionType::Expense, 5),
        ("Card Payment", TransactionType::Payment, 5),
        ("Old Charge", TransactionType::Expense, 120),
        ("Future Charge", TransactionType::Expense, -5),
    ] {
        db.insert_transaction(
            user,
            &NewTransaction {
                amount: 10.0,
                description: desc.to_string(),
                tx_type,
                category: None,
                created_at: now - Duration::days(days_ago),
            },
        )
        .unwrap();
    }

    let fetched = db
        .fetch_expense_transactions(user, now - Duration::days(90), now)
        .unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].description, "Netflix");
    assert_eq!(fetched[0].tx_type, TransactionType::Expense);
}

#[test]
fn test_expense_fetch_window_is_inclusive_at_both_bounds() {
    let db = Database::in_memory().unwrap();
    let user = db.upsert_user("boundary@example.com").unwrap();
    let now = Utc::now();
    let since = now - Duration::days(90);

    db.insert_transaction(
        user,
        &NewTransaction {
            amount: 5.0,
            description: "On Boundary".to_string(),
            tx_type: TransactionType::Expense,
            category: None,
            created_at: since,
        },
    )
    .unwrap();
    db.insert_transaction(
        user,
        &NewTransaction {
            amount: 5.0,
            description: "Past Boundary".to_string(),
            tx_type: TransactionType::Expense,
            category: None,
            created_at: since - Duration::seconds(1),
        },
    )
    .unwrap();
    db.insert_transaction(
        user,
        &NewTransaction {
            amount: 5.0,
            description: "At Upper Bound".to_string(),
            tx_type: TransactionType::Expense,
            category: None,
            created_at: now,
        },
    )
    .unwrap();
    db.insert_transaction(
        user,
        &NewTransaction {
            amount: 5.0,
            description: "Past Upper Bound".to_string(),
            tx_type: TransactionType::Expense,
            category: None,
            created_at: now + Duration::seconds(1),
        },
    )
    .unwrap();

    let fetched = db.fetch_expense_transactions(user, since, now).unwrap();
    let descriptions: Vec<&str> = fetched.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, ["At Upper Bound", "On Boundary"]);
}

#[test]
fn test_alert_create_and_list() {
    let db = Database::in_memory().unwrap();
    let user = db.upsert_user("alerts@example.com").unwrap();
    let now = Utc::now();

    let id = db
        .create_alert(
            user,
            AlertType::SubscriptionDetected,
            None,
            "Subscription Detected: Netflix",
            "Recurring charge detected.",
            now,
        )
        .unwrap()
        .unwrap();
    assert!(id > 0);

    let alerts = db.list_alerts(user, false).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::SubscriptionDetected);
    assert!(!alerts[0].read);

    assert_eq!(db.count_unread_alerts(user).unwrap(), 1);
    db.mark_alert_read(id).unwrap();
    assert_eq!(db.count_unread_alerts(user).unwrap(), 0);
    assert!(db.list_alerts(user, false).unwrap().is_empty());
    assert_eq!(db.list_alerts(user, true).unwrap().len(), 1);
}

#[test]
fn test_alert_unique_index_closes_dedup_race() {
    let db = Database::in_memory().unwrap();
    let user = db.upsert_user("race@example.com").unwrap();
    let now = Utc::now();

    let first = db
        .create_alert(
            user,
            AlertType::SubscriptionDetected,
            None,
            "Subscription Detected: Gym",
            "msg",
            now,
        )
        .unwrap();
    assert!(first.is_some());

    // Same (user, title, day): the unique index suppresses the insert
    // instead of surfacing a constraint error
    let second = db
        .create_alert(
            user,
            AlertType::SubscriptionDetected,
            None,
            "Subscription Detected: Gym",
            "msg",
            now,
        )
        .unwrap();
    assert!(second.is_none());

    // Different title on the same day is fine
    let other = db
        .create_alert(
            user,
            AlertType::SubscriptionDetected,
            None,
            "Subscription Detected: Spa",
            "msg",
            now,
        )
        .unwrap();
    assert!(other.is_some());
}

#[test]
fn test_alert_for_missing_user_is_an_error() {
    let db = Database::in_memory().unwrap();

    // Foreign-key trip must surface as a storage error, never be
    // mistaken for dedup suppression
    let result = db.create_alert(
        999,
        AlertType::SubscriptionDetected,
        None,
        "Subscription Detected: Ghost",
        "msg",
        Utc::now(),
    );
    assert!(matches!(result, Err(crate::error::Error::Database(_))));
}

#[test]
fn test_recent_alert_window_checks() {
    let db = Database::in_memory().unwrap();
    let user = db.upsert_user("windows@example.com").unwrap();
    let now = Utc::now();
    let title = "Subscription Detected: Gym";

    db.create_alert(
        user,
        AlertType::SubscriptionDetected,
        None,
        title,
        "msg",
        now - Duration::days(10),
    )
    .unwrap();

    assert!(db
        .recent_alert_exists(user, title, now - Duration::days(30))
        .unwrap());
    assert!(!db
        .recent_alert_exists(user, title, now - Duration::days(5))
        .unwrap());
    assert!(!db
        .recent_alert_exists(user, "Subscription Detected: Spa", now - Duration::days(30))
        .unwrap());
}

#[test]
fn test_recent_card_alert_check() {
    let db = Database::in_memory().unwrap();
    let user = db.upsert_user("cardalert@example.com").unwrap();
    let card = db.insert_card(user, "Sapphire", Some(17), 0.0, 1000.0).unwrap();
    let other = db.insert_card(user, "Freedom", Some(3), 0.0, 1000.0).unwrap();
    let now = Utc::now();

    db.create_alert(
        user,
        AlertType::PaymentReminder,
        Some(card),
        "Payment Reminder: Sapphire",
        "msg",
        now,
    )
    .unwrap();

    let since = now - Duration::hours(24);
    assert!(db
        .recent_card_alert_exists(user, AlertType::PaymentReminder, card, since)
        .unwrap());
    assert!(!db
        .recent_card_alert_exists(user, AlertType::PaymentReminder, other, since)
        .unwrap());
}

#[test]
fn test_recent_alert_of_types_check() {
    let db = Database::in_memory().unwrap();
    let user = db.upsert_user("types@example.com").unwrap();
    let now = Utc::now();

    db.create_alert(
        user,
        AlertType::UtilizationWarning,
        None,
        "Credit Utilization Warning",
        "msg",
        now - Duration::days(3),
    )
    .unwrap();

    let since = now - Duration::days(7);
    assert!(db
        .recent_alert_of_types_exists(
            user,
            &[
                AlertType::UtilizationWarning,
                AlertType::UtilizationCritical
            ],
            since
        )
        .unwrap());
    assert!(!db
        .recent_alert_of_types_exists(user, &[AlertType::PaymentReminder], since)
        .unwrap());
}

#[test]
fn test_cascade_delete_user_data() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let user = db.upsert_user("cascade@example.com").unwrap();
    db.insert_card(user, "Card", None, 0.0, 1000.0).unwrap();
    db.create_alert(
        user,
        AlertType::SubscriptionDetected,
        None,
        "t",
        "m",
        Utc::now(),
    )
    .unwrap();

    conn.execute("DELETE FROM users WHERE id = ?", params![user])
        .unwrap();

    let cards: i64 = conn
        .query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))
        .unwrap();
    let alerts: i64 = conn
        .query_row("SELECT COUNT(*) FROM alerts", [], |row| row.get(0))
        .unwrap();
    assert_eq!(cards, 0, "Deleting user should cascade delete cards");
    assert_eq!(alerts, 0, "Deleting user should cascade delete alerts");
}
