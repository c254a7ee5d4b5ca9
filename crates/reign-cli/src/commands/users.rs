//! User management commands (add, list, set-token)

use anyhow::Result;
use reign_core::db::Database;

pub fn cmd_users_add(db: &Database, email: &str) -> Result<()> {
    let id = db.upsert_user(email)?;
    println!("✅ User {} ready (id {})", email, id);
    Ok(())
}

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users found. Add one with:");
        println!("  reign users add you@example.com");
        return Ok(());
    }

    println!();
    println!("👤 Users");
    println!("   ─────────────────────────────────────────────────────────────");

    for user in users {
        let push = if user.push_token.is_some() {
            "push registered"
        } else {
            "no push token"
        };
        println!("   [{}] {} ({})", user.id, user.email, push);
    }

    Ok(())
}

pub fn cmd_users_set_token(db: &Database, email: &str, token: Option<&str>) -> Result<()> {
    let user = db.get_user_by_email(email)?;
    db.set_push_token(user.id, token)?;

    match token {
        Some(_) => println!("✅ Push token registered for {}", email),
        None => println!("✅ Push token cleared for {}", email),
    }

    Ok(())
}
