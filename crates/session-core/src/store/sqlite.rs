//! SQLite session store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::debug;

use super::SessionStore;
use crate::errors::{Result, SessionError};
use crate::types::{CallSession, CallState, SessionId};

/// Session storage backed by SQLite via sqlx.
///
/// The compare-and-swap lives in the `WHERE status = ?` clause of the
/// update: a lost race shows up as zero affected rows, never as a double
/// write.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Build a store over an existing pool (shared with the user store).
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS call_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT UNIQUE NOT NULL,
                caller_id INTEGER NOT NULL,
                callee_id INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL,
                ended_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_call_sessions_session_id \
             ON call_sessions(session_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<CallSession> {
        let status: String = row.try_get("status").map_err(SessionError::from)?;
        let state = CallState::from_db_str(&status).ok_or_else(|| {
            SessionError::StoreUnavailable(format!("unknown stored status: {status}"))
        })?;
        Ok(CallSession {
            session_id: SessionId(row.try_get::<String, _>("session_id")?),
            caller_id: row.try_get("caller_id")?,
            callee_id: row.try_get("callee_id")?,
            state,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            ended_at: row.try_get::<Option<DateTime<Utc>>, _>("ended_at")?,
        })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn insert(&self, session: &CallSession) -> Result<()> {
        sqlx::query(
            "INSERT INTO call_sessions (session_id, caller_id, callee_id, status, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session.session_id.as_str())
        .bind(session.caller_id)
        .bind(session.callee_id)
        .bind(session.state.as_db_str())
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;
        debug!("Inserted session {}", session.session_id);
        Ok(())
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<CallSession>> {
        let row = sqlx::query("SELECT * FROM call_sessions WHERE session_id = ?")
            .bind(session_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn update_status(
        &self,
        session_id: &SessionId,
        expected: CallState,
        new: CallState,
        ended_at: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE call_sessions SET status = ?, ended_at = COALESCE(?, ended_at) \
             WHERE session_id = ? AND status = ?",
        )
        .bind(new.as_db_str())
        .bind(ended_at)
        .bind(session_id.as_str())
        .bind(expected.as_db_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
