use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use folio_db::{Database, DbError};
use folio_db::models::{NewNote, NoteRow};
use folio_types::api::{AdminNote, PublicNote};
use folio_types::models::NoteStatus;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::client_addr::ClientAddr;
use crate::config::ModerationConfig;
use crate::error::ApiError;
use crate::rate_limit::FixedWindowLimiter;

pub const MAX_NAME_CHARS: usize = 60;
pub const MAX_MESSAGE_CHARS: usize = 2000;
pub const MIN_MESSAGE_CHARS: usize = 2;

pub const PUBLIC_LIST_LIMIT: u32 = 200;
pub const ADMIN_LIST_LIMIT: u32 = 500;

/// Rate-limit key for callers whose address can't be resolved. They share
/// one bucket.
const UNKNOWN_SOURCE: &str = "unknown";

/// The guestbook workflow: intake, public listing, and admin review.
///
/// Holds no state of its own beyond the rate-limit counters; all note state
/// lives in the store. Methods block on SQLite and belong on the blocking
/// pool when called from async code.
pub struct Moderation {
    db: Database,
    config: ModerationConfig,
    limiter: Arc<FixedWindowLimiter>,
}

impl Moderation {
    pub fn new(db: Database, config: ModerationConfig, limiter: Arc<FixedWindowLimiter>) -> Self {
        Self {
            db,
            config,
            limiter,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    // -- Public --

    /// Accept a visitor note for review. The assigned id is not returned.
    pub fn submit(
        &self,
        name: Option<&str>,
        message: Option<&str>,
        caller: &ClientAddr,
    ) -> Result<(), ApiError> {
        let name = name.map(|n| safe_trim(n, MAX_NAME_CHARS)).filter(|n| !n.is_empty());
        let message = safe_trim(message.unwrap_or_default(), MAX_MESSAGE_CHARS);

        if message.chars().count() < MIN_MESSAGE_CHARS {
            return Err(ApiError::Validation("Message is required.".into()));
        }

        let ip_hash = caller
            .hash_source()
            .map(|addr| hash_ip(&self.config.ip_hash_salt, addr));

        let rate_key = caller
            .rate_key(self.config.trust_proxy)
            .unwrap_or(UNKNOWN_SOURCE);
        if let Err(retry_after) = self.limiter.check(rate_key) {
            warn!("Note submission rate limited");
            return Err(ApiError::RateLimited { retry_after });
        }

        let note = NewNote {
            id: Uuid::new_v4().to_string(),
            name,
            message,
            ip_hash,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.db.insert_note(&note)?;

        info!("Note {} submitted for review", note.id);
        Ok(())
    }

    pub fn list_approved(&self) -> Result<Vec<PublicNote>, ApiError> {
        let rows = self
            .db
            .list_notes_by_status(NoteStatus::Approved, PUBLIC_LIST_LIMIT)?;

        rows.into_iter()
            .map(|row| {
                let (id, created_at) = parse_row_keys(&row)?;
                Ok(PublicNote {
                    id,
                    name: row.name,
                    message: row.message,
                    created_at,
                })
            })
            .collect()
    }

    // -- Admin (callers must pass `authorize` first) --

    pub fn list_by_status(&self, status: NoteStatus) -> Result<Vec<AdminNote>, ApiError> {
        let rows = self.db.list_notes_by_status(status, ADMIN_LIST_LIMIT)?;

        rows.into_iter()
            .map(|row| {
                let (id, created_at) = parse_row_keys(&row)?;
                Ok(AdminNote {
                    id,
                    name: row.name,
                    message: row.message,
                    status: row.status,
                    created_at,
                })
            })
            .collect()
    }

    pub fn approve(&self, id: &str) -> Result<usize, ApiError> {
        self.transition(id, NoteStatus::Approved)
    }

    pub fn reject(&self, id: &str) -> Result<usize, ApiError> {
        self.transition(id, NoteStatus::Rejected)
    }

    /// Returns rows changed. 0 covers both "no such note" and "already there".
    fn transition(&self, id: &str, status: NoteStatus) -> Result<usize, ApiError> {
        let changed = self.db.update_note_status(id, status)?;
        info!("Note {} -> {} (changed: {})", id, status, changed);
        Ok(changed)
    }

    /// Check an admin credential against the configured shared secret.
    pub fn authorize(&self, provided: Option<&str>) -> Result<(), ApiError> {
        let Some(expected) = self.config.admin_key.as_deref() else {
            return Err(ApiError::Misconfigured);
        };

        match provided {
            Some(key) if key == expected => Ok(()),
            _ => Err(ApiError::Unauthorized),
        }
    }
}

/// Trim, then cut to at most `max_chars` characters.
pub fn safe_trim(s: &str, max_chars: usize) -> String {
    s.trim().chars().take(max_chars).collect()
}

/// Hex SHA-256 of `"{salt}:{addr}"`.
pub fn hash_ip(salt: &str, addr: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(addr.as_bytes());
    hex::encode(hasher.finalize())
}

/// Stored id and timestamp as API types. A row that fails to parse is a
/// store error, the same as an unknown status on disk.
fn parse_row_keys(row: &NoteRow) -> Result<(Uuid, chrono::DateTime<Utc>), DbError> {
    let id = row.id.parse().map_err(|e| {
        warn!("Corrupt note id '{}': {}", row.id, e);
        DbError::InvalidArgument(format!("corrupt note id '{}'", row.id))
    })?;
    let created_at = row
        .created_at
        .parse::<chrono::DateTime<Utc>>()
        .map_err(|e| {
            warn!("Corrupt created_at '{}' on note '{}': {}", row.created_at, row.id, e);
            DbError::InvalidArgument(format!("corrupt created_at on note '{}'", row.id))
        })?;
    Ok((id, created_at))
}
