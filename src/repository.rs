use crate::error::ModelError;
use crate::models::{LATEST_LIMIT, Snippet, User};
use crate::password;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;

/// SnippetRepository
///
/// Persistence contract for snippets. Handlers only ever see this trait, so the
/// Postgres implementation and the in-memory `MockRepository` are interchangeable.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn SnippetRepository>`) usable across Axum's task boundaries.
#[async_trait]
pub trait SnippetRepository: Send + Sync {
    /// Stores a new snippet expiring `expires_in_days` after its creation and
    /// returns the generated id.
    async fn insert(&self, title: &str, content: &str, expires_in_days: i32)
    -> Result<i64, ModelError>;

    /// Fetches a snippet that exists and has not expired; `ModelError::NoRecord` otherwise.
    async fn get(&self, id: i64) -> Result<Snippet, ModelError>;

    /// Up to ten unexpired snippets, newest first.
    async fn latest(&self) -> Result<Vec<Snippet>, ModelError>;
}

/// UserRepository
///
/// Persistence contract for accounts: signup, credential checks and lookup.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user, hashing `password`. Fails with `DuplicateEmail` when the
    /// address is already registered.
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), ModelError>;

    /// Returns the user id when `email` and `password` match a stored account.
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError>;

    async fn get(&self, id: i64) -> Result<User, ModelError>;
}

pub type SnippetState = Arc<dyn SnippetRepository>;
pub type UserState = Arc<dyn UserRepository>;

/// PostgresRepository
///
/// The concrete implementation of both repository traits, backed by PostgreSQL.
/// Every method is a single statement; there are no explicit transactions.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnippetRepository for PostgresRepository {
    /// Creation and expiry both derive from the same `now()`, which is fixed for
    /// the duration of the statement, so the lifetime is exact.
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_in_days: i32,
    ) -> Result<i64, ModelError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO snippets (title, content, created, expires)
            VALUES ($1, $2, now(), now() + make_interval(days => $3))
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(expires_in_days)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Snippet, ModelError> {
        sqlx::query_as::<_, Snippet>(
            r#"
            SELECT id, title, content, created, expires
            FROM snippets
            WHERE expires > now() AND id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ModelError::NoRecord)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, ModelError> {
        let snippets = sqlx::query_as::<_, Snippet>(
            r#"
            SELECT id, title, content, created, expires
            FROM snippets
            WHERE expires > now()
            ORDER BY created DESC
            LIMIT $1
            "#,
        )
        .bind(LATEST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(snippets)
    }
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), ModelError> {
        let hashed_password = password::hash(password).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, hashed_password, created)
            VALUES ($1, $2, $3, now())
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(hashed_password)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("users_uc_email") =>
            {
                Err(ModelError::DuplicateEmail)
            }
            Err(e) => Err(ModelError::Database(e)),
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError> {
        let row = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let (id, hashed_password) = row.ok_or(ModelError::InvalidCredentials)?;

        if password::verify(password, &hashed_password).await? {
            Ok(id)
        } else {
            Err(ModelError::InvalidCredentials)
        }
    }

    async fn get(&self, id: i64) -> Result<User, ModelError> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, hashed_password, created FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ModelError::NoRecord)
    }
}

// --- The Mock Implementation (For Tests) ---

#[derive(Default)]
struct MockTables {
    snippets: Vec<Snippet>,
    users: Vec<User>,
}

/// MockRepository
///
/// In-memory stand-in for `PostgresRepository` with the same visibility and
/// uniqueness rules. Lets handler and routing tests run without a database.
#[derive(Default)]
pub struct MockRepository {
    tables: Mutex<MockTables>,
    /// When true, every call fails as if the database were unreachable.
    pub should_fail: bool,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Stores `snippet` as-is, ignoring its id and assigning the next one.
    /// Used to seed rows with arbitrary timestamps, including expired ones.
    pub async fn seed_snippet(&self, mut snippet: Snippet) -> i64 {
        let mut tables = self.tables.lock().await;
        snippet.id = tables.snippets.len() as i64 + 1;
        let id = snippet.id;
        tables.snippets.push(snippet);
        id
    }

    /// Raw snapshot of every stored snippet, expired ones included.
    pub async fn all_snippets(&self) -> Vec<Snippet> {
        self.tables.lock().await.snippets.clone()
    }

    pub async fn all_users(&self) -> Vec<User> {
        self.tables.lock().await.users.clone()
    }

    fn check_available(&self) -> Result<(), ModelError> {
        if self.should_fail {
            return Err(ModelError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl SnippetRepository for MockRepository {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_in_days: i32,
    ) -> Result<i64, ModelError> {
        self.check_available()?;
        let created = Utc::now();
        let snippet = Snippet {
            id: 0,
            title: title.to_string(),
            content: content.to_string(),
            created,
            expires: created + Duration::days(i64::from(expires_in_days)),
        };
        Ok(self.seed_snippet(snippet).await)
    }

    async fn get(&self, id: i64) -> Result<Snippet, ModelError> {
        self.check_available()?;
        let now = Utc::now();
        self.tables
            .lock()
            .await
            .snippets
            .iter()
            .find(|s| s.id == id && s.expires > now)
            .cloned()
            .ok_or(ModelError::NoRecord)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, ModelError> {
        self.check_available()?;
        let now = Utc::now();
        let mut live: Vec<Snippet> = self
            .tables
            .lock()
            .await
            .snippets
            .iter()
            .filter(|s| s.expires > now)
            .cloned()
            .collect();
        live.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        live.truncate(LATEST_LIMIT as usize);
        Ok(live)
    }
}

#[async_trait]
impl UserRepository for MockRepository {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), ModelError> {
        self.check_available()?;
        let hashed_password = password::hash(password).await?;
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(ModelError::DuplicateEmail);
        }
        let id = tables.users.len() as i64 + 1;
        tables.users.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            hashed_password,
            created: Utc::now(),
        });
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError> {
        self.check_available()?;
        let (id, hashed_password) = {
            let tables = self.tables.lock().await;
            let user = tables
                .users
                .iter()
                .find(|u| u.email == email)
                .ok_or(ModelError::InvalidCredentials)?;
            (user.id, user.hashed_password.clone())
        };

        if password::verify(password, &hashed_password).await? {
            Ok(id)
        } else {
            Err(ModelError::InvalidCredentials)
        }
    }

    async fn get(&self, id: i64) -> Result<User, ModelError> {
        self.check_available()?;
        self.tables
            .lock()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(ModelError::NoRecord)
    }
}
