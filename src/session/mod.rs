//! Session module - conversation history persistence
//!
//! This module provides SQLite-backed storage for FitCoach chats:
//! - `sessions` table, one row per conversation
//! - `messages` table, the append-only transcript
//!
//! Transcripts are never mutated or deleted: messages only get appended,
//! history comes back in insertion order, and sessions list newest first.
//!
//! # Example
//!
//! ```no_run
//! use fitcoach::session::{Role, SessionStore, DEFAULT_TITLE};
//!
//! #[tokio::main]
//! async fn main() -> fitcoach::Result<()> {
//!     let store = SessionStore::in_memory().await?;
//!     let session = store.create_session(DEFAULT_TITLE).await?;
//!
//!     store.append_message(&session.id, Role::User, "Hello!").await?;
//!     store.append_message(&session.id, Role::Assistant, "Ready to train?").await?;
//!
//!     let history = store.history(&session.id).await?;
//!     assert_eq!(history.len(), 2);
//!     Ok(())
//! }
//! ```

pub mod types;

pub use types::{Message, Role, Session, ToolCall};

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::error::{CoachError, Result};

/// Title given to sessions created without an explicit one.
pub const DEFAULT_TITLE: &str = "New Workout Chat";

/// SQLite-backed store for sessions and messages.
///
/// Cloning is cheap: clones share the underlying pool.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// Parent directories are created as needed.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let url = format!("sqlite://{}?mode=rwc", path.display());
        Self::connect(&url).await
    }

    /// Open an in-memory store. Used by tests and throwaway chats.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn connect(url: &str) -> Result<Self> {
        // One connection: an in-memory database exists per connection, and
        // the chat shell runs one statement at a time anyway.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON;").execute(conn).await?;
                    Ok(())
                })
            })
            .connect(url)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL REFERENCES sessions(id),
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("session store ready");
        Ok(())
    }

    /// Create a new session and return its record.
    pub async fn create_session(&self, title: &str) -> Result<Session> {
        let session = Session::new(title);
        sqlx::query("INSERT INTO sessions (id, title, created_at) VALUES (?, ?, ?)")
            .bind(&session.id)
            .bind(&session.title)
            .bind(session.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        debug!(session = %session.id, "created session");
        Ok(session)
    }

    /// Look up one session by id.
    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let row: Option<SessionRow> =
            sqlx::query_as("SELECT id, title, created_at FROM sessions WHERE id = ?")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(SessionRow::into_session).transpose()
    }

    /// All sessions, newest first. Creation order breaks same-instant ties.
    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT id, title, created_at FROM sessions ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(SessionRow::into_session).collect()
    }

    /// Append one message to a session's transcript.
    ///
    /// # Errors
    ///
    /// Fails with [`CoachError::SessionNotFound`] when `session_id` was
    /// never created; transcript rows must always join back to a session.
    pub async fn append_message(&self, session_id: &str, role: Role, content: &str) -> Result<()> {
        if !self.session_exists(session_id).await? {
            return Err(CoachError::SessionNotFound(session_id.to_string()));
        }
        sqlx::query(
            "INSERT INTO messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(role.as_str())
        .bind(content)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Full transcript for a session, oldest first.
    pub async fn history(&self, session_id: &str) -> Result<Vec<Message>> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT role, content, created_at FROM messages WHERE session_id = ? ORDER BY id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(MessageRow::into_message).collect()
    }

    async fn session_exists(&self, session_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    title: String,
    created_at: String,
}

impl SessionRow {
    fn into_session(self) -> Result<Session> {
        Ok(Session {
            id: self.id,
            title: self.title,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn into_message(self) -> Result<Message> {
        let role = Role::parse(&self.role).ok_or_else(|| {
            CoachError::Database(sqlx::Error::Decode(
                format!("unknown role in transcript: {}", self.role).into(),
            ))
        })?;
        Ok(Message {
            role,
            content: self.content,
            tool_call_id: None,
            tool_calls: Vec::new(),
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            CoachError::Database(sqlx::Error::Decode(
                format!("bad timestamp {raw}: {err}").into(),
            ))
        })
}
