//! InviteRepository - Repository per la gestione degli inviti

use crate::entities::{Invite, NewInvite};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The platform guarantees link uniqueness, but the constraint is
    /// still enforced and surfaced rather than assumed away.
    #[error("invite link already exists")]
    DuplicateLink,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence contract for invites. Injected into the handlers so tests
/// can scope each operation to its own pool connection.
#[async_trait]
pub trait InviteStore: Send + Sync {
    /// Idempotent table creation, safe to call on every startup.
    async fn init_schema(&self) -> Result<(), StoreError>;

    /// Persists a new pending invite and returns it with its assigned id.
    async fn insert(&self, new: &NewInvite) -> Result<Invite, StoreError>;

    /// Resolution lookup. Zero matches and (defensively) multiple matches
    /// both come back as `None`: ambiguity is "no resolution", not a crash.
    async fn find_by_link(&self, link: &str) -> Result<Option<Invite>, StoreError>;

    /// Quota query: pending rows for this user in this chat whose expiry is
    /// strictly in the future, judged by the database's clock.
    async fn active_count_for_user(&self, chat_id: i64, user_id: i64)
    -> Result<i64, StoreError>;

    /// Records who joined through the invite. Guarded on the row still
    /// being pending, so a second call is a no-op update, not a crash.
    async fn mark_resolved(
        &self,
        invite_id: i64,
        invitee_id: i64,
        invitee_name: &str,
        joined_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// All pending, unexpired invites created by the user, oldest first.
    async fn pending_for_user(&self, user_id: i64) -> Result<Vec<Invite>, StoreError>;
}

// Colonne in ordine di schema, riusate da tutte le SELECT
const INVITE_COLUMNS: &str = "invite_id, chat_id, link, created_by_id, created_by_name, \
     created_at, valid_until, invitee_id, invitee_name, joined_at";

pub struct InviteRepository {
    connection_pool: SqlitePool,
}

impl InviteRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }
}

#[async_trait]
impl InviteStore for InviteRepository {
    async fn init_schema(&self) -> Result<(), StoreError> {
        // Timestamps live as unix seconds so the quota comparison can use
        // the database's own clock without text-format skew.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS invites (
                invite_id       INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id         INTEGER NOT NULL,
                link            TEXT    NOT NULL UNIQUE,
                created_by_id   INTEGER NOT NULL,
                created_by_name TEXT    NOT NULL,
                created_at      INTEGER NOT NULL,
                valid_until     INTEGER NOT NULL,
                invitee_id      INTEGER,
                invitee_name    TEXT,
                joined_at       INTEGER
            )
            "#,
        )
        .execute(&self.connection_pool)
        .await?;

        Ok(())
    }

    async fn insert(&self, new: &NewInvite) -> Result<Invite, StoreError> {
        use chrono::SubsecRound;

        let result = sqlx::query(
            r#"
            INSERT INTO invites (chat_id, link, created_by_id, created_by_name, created_at, valid_until)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.chat_id)
        .bind(&new.link)
        .bind(new.created_by_id)
        .bind(&new.created_by_name)
        .bind(new.created_at.timestamp())
        .bind(new.valid_until.timestamp())
        .execute(&self.connection_pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateLink,
            other => StoreError::Sqlx(other),
        })?;

        // Return the created invite with the new id; timestamps truncated
        // to whole seconds exactly as they were stored.
        Ok(Invite {
            invite_id: result.last_insert_rowid(),
            chat_id: new.chat_id,
            link: new.link.clone(),
            created_by_id: new.created_by_id,
            created_by_name: new.created_by_name.clone(),
            created_at: new.created_at.trunc_subsecs(0),
            valid_until: new.valid_until.trunc_subsecs(0),
            invitee_id: None,
            invitee_name: None,
            joined_at: None,
        })
    }

    async fn find_by_link(&self, link: &str) -> Result<Option<Invite>, StoreError> {
        let mut rows = sqlx::query_as::<_, Invite>(&format!(
            "SELECT {INVITE_COLUMNS} FROM invites WHERE link = ?"
        ))
        .bind(link)
        .fetch_all(&self.connection_pool)
        .await?;

        // UNIQUE rende il caso multiplo impossibile in pratica, ma un
        // match ambiguo non deve mai risolvere un invito
        if rows.len() == 1 {
            Ok(rows.pop())
        } else {
            Ok(None)
        }
    }

    async fn active_count_for_user(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM invites
            WHERE chat_id = ?
              AND created_by_id = ?
              AND invitee_id IS NULL
              AND valid_until > CAST(strftime('%s', 'now') AS INTEGER)
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count)
    }

    async fn mark_resolved(
        &self,
        invite_id: i64,
        invitee_id: i64,
        invitee_name: &str,
        joined_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        // The IS NULL guard keeps the pending -> resolved transition
        // one-way: a second resolution updates zero rows.
        sqlx::query(
            r#"
            UPDATE invites
            SET invitee_id = ?, invitee_name = ?, joined_at = ?
            WHERE invite_id = ? AND invitee_id IS NULL
            "#,
        )
        .bind(invitee_id)
        .bind(invitee_name)
        .bind(joined_at.timestamp())
        .bind(invite_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(())
    }

    async fn pending_for_user(&self, user_id: i64) -> Result<Vec<Invite>, StoreError> {
        let invites = sqlx::query_as::<_, Invite>(&format!(
            r#"
            SELECT {INVITE_COLUMNS} FROM invites
            WHERE created_by_id = ?
              AND invitee_id IS NULL
              AND valid_until > CAST(strftime('%s', 'now') AS INTEGER)
            ORDER BY invite_id
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(invites)
    }
}
