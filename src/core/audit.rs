use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Actor recorded when no caller identity is available
pub const SYSTEM_ACTOR: &str = "system";

/// Who performed a mutation and when
///
/// Every write path takes one of these instead of reading the clock itself, so a
/// single repayment stamps all of its rows with the same instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditStamp {
    pub actor: String,
    pub at: NaiveDateTime,
}

impl AuditStamp {
    pub fn new(actor: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            actor: actor.into(),
            at,
        }
    }

    pub fn system(at: NaiveDateTime) -> Self {
        Self::new(SYSTEM_ACTOR, at)
    }
}

/// Creation, modification and soft-delete columns shared by the ledger rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    pub created_at: NaiveDateTime,
    pub created_by: String,
    pub updated_at: NaiveDateTime,
    pub updated_by: String,
    pub deleted_at: Option<NaiveDateTime>,
    pub deleted_by: Option<String>,
}

impl AuditFields {
    /// Fields for a freshly created row
    pub fn created(stamp: &AuditStamp) -> Self {
        Self {
            created_at: stamp.at,
            created_by: stamp.actor.clone(),
            updated_at: stamp.at,
            updated_by: stamp.actor.clone(),
            deleted_at: None,
            deleted_by: None,
        }
    }

    /// Record a modification
    pub fn touch(&mut self, stamp: &AuditStamp) {
        self.updated_at = stamp.at;
        self.updated_by = stamp.actor.clone();
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Rows that can be soft-deleted; every read filters on [`Audited::is_active`]
pub trait Audited {
    fn audit(&self) -> &AuditFields;

    fn is_active(&self) -> bool {
        self.audit().is_active()
    }
}
