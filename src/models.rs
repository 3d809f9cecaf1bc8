use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

// --- Core Application Schemas (Mapped to Database) ---

/// Snippet
///
/// A row of the `snippets` table. A snippet is only ever served while
/// `now < expires`; the repositories filter expired rows out of every read.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

/// User
///
/// A row of the `users` table. The email column carries a unique constraint
/// (`users_uc_email`), which is how duplicate signups are detected.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    // Argon2 PHC string. Never rendered or serialized.
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created: DateTime<Utc>,
}

/// Lifetimes (in days) a snippet may be created with.
pub const PERMITTED_EXPIRY_DAYS: [&str; 3] = ["365", "7", "1"];

/// Maximum number of snippets returned by `latest`.
pub const LATEST_LIMIT: i64 = 10;
