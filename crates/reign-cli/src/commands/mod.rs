//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `alerts` - Alert commands (list, mark read)
//! - `cards` - Card management commands (add, list)
//! - `core` - Core commands (init, status) and shared utilities (open_db)
//! - `scan` - Detection and reminder cycle commands
//! - `transactions` - Transaction commands (add, list)
//! - `users` - User management commands (add, list, set-token)

pub mod alerts;
pub mod cards;
pub mod core;
pub mod scan;
pub mod transactions;
pub mod users;

// Re-export command functions for main.rs
pub use alerts::*;
pub use cards::*;
pub use core::*;
pub use scan::*;
pub use transactions::*;
pub use users::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    // Back up to a char boundary so multibyte descriptions can't split
    let mut cut = max.saturating_sub(3);
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &s[..cut])
}
