//! The pending-change record and its lifecycle invariants.
//!
//! Records are created and persisted by the external API; this model is how
//! the dashboard reads them (approval view) and states the transition rules
//! the backend is expected to honor: pending → approved or pending → rejected,
//! never backwards, and never past expiry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bureau_core::{DomainError, DomainResult, PendingChangeId};

use crate::op::EntityKind;
use crate::payload::{ProfileFields, ServiceSelection};

/// Action proposed by a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

/// Sub-type refining an update action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateSubType {
    #[serde(rename = "addService")]
    AddService,
    #[serde(rename = "removeFromService")]
    RemoveFromService,
}

/// Approval status of a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Pending,
    Approved,
    Rejected,
}

/// A proposed mutation awaiting administrator approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChange {
    pub id: PendingChangeId,
    pub entity: EntityKind,
    pub action: ChangeAction,
    pub sub_type: Option<UpdateSubType>,
    pub status: ChangeStatus,
    pub fields: ProfileFields,
    pub service: Option<ServiceSelection>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub rejection_reason: Option<String>,
}

impl PendingChange {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether this record can still be confirmed with an OTP.
    pub fn can_confirm(&self, now: DateTime<Utc>) -> bool {
        self.status == ChangeStatus::Pending && !self.is_expired(now)
    }

    /// Transition pending → approved.
    pub fn approve(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_transitionable(now)?;
        self.status = ChangeStatus::Approved;
        Ok(())
    }

    /// Transition pending → rejected, recording the reason.
    pub fn reject(&mut self, now: DateTime<Utc>, reason: Option<String>) -> DomainResult<()> {
        self.ensure_transitionable(now)?;
        self.status = ChangeStatus::Rejected;
        self.rejection_reason = reason;
        Ok(())
    }

    fn ensure_transitionable(&self, now: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            ChangeStatus::Pending => {}
            ChangeStatus::Approved => {
                return Err(DomainError::invalid_transition("change is already approved"));
            }
            ChangeStatus::Rejected => {
                return Err(DomainError::invalid_transition("change is already rejected"));
            }
        }
        if self.is_expired(now) {
            return Err(DomainError::Expired);
        }
        Ok(())
    }
}
