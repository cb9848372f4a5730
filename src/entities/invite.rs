//! Invite entity - Entità invito
//!
//! Una riga per ogni link usa-singola emesso dal bot. La riga nasce
//! "pending" e viene risolta al massimo una volta, mai cancellata:
//! la scadenza è implicita in `valid_until`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Invite {
    pub invite_id: i64,
    /// Group chat the link lets you into.
    pub chat_id: i64,
    /// Platform-issued invite link, unique across all rows.
    pub link: String,
    pub created_by_id: i64,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    /// Platform-confirmed expiry; the platform also caps the link to one use.
    pub valid_until: DateTime<Utc>,
    // invitee_id/invitee_name/joined_at sono tutti null (pending) o
    // tutti valorizzati (resolved), transizione a senso unico
    pub invitee_id: Option<i64>,
    pub invitee_name: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl Invite {
    /// Nobody has joined through this link yet.
    pub fn is_pending(&self) -> bool {
        self.invitee_id.is_none()
    }
}

/// Data for a new pending invite (without invite_id, assigned by the database).
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub chat_id: i64,
    pub link: String,
    pub created_by_id: i64,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}
