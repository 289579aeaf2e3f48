//! Mutation operations and their confirmation messages.

use serde::{Deserialize, Serialize};

/// Kind of entity a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Agent,
    Client,
}

impl EntityKind {
    /// French definite article + noun, as used in operator-facing messages.
    fn label(&self) -> &'static str {
        match self {
            EntityKind::Agent => "L'agent",
            EntityKind::Client => "Le client",
        }
    }
}

/// The four supported mutation intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "update")]
    Update,
    #[serde(rename = "delete")]
    Delete,
    #[serde(rename = "addService")]
    AddService,
    #[serde(rename = "removeFromService")]
    RemoveFromService,
}

impl OperationKind {
    /// Wire name sent to the API.
    pub fn wire_name(&self) -> &'static str {
        match self {
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::AddService => "addService",
            OperationKind::RemoveFromService => "removeFromService",
        }
    }

    /// Whether a service must be selected before submitting this operation.
    pub fn requires_service(&self) -> bool {
        match self {
            OperationKind::Update | OperationKind::Delete => false,
            OperationKind::AddService | OperationKind::RemoveFromService => true,
        }
    }

    /// Whether a service tier (`niveauService`) must accompany the selection.
    pub fn requires_tier(&self) -> bool {
        matches!(self, OperationKind::AddService)
    }

    /// Confirmation message shown after a successful OTP confirmation.
    ///
    /// Fixed mapping per operation and entity kind; the API's own message is
    /// not used on the confirm path.
    pub fn success_message(&self, entity: EntityKind) -> String {
        match self {
            OperationKind::Update => format!("{} a été modifié avec succès!", entity.label()),
            OperationKind::Delete => format!("{} a été supprimé avec succès!", entity.label()),
            OperationKind::AddService => "Le service a été ajouté avec succès!".to_string(),
            OperationKind::RemoveFromService => {
                format!("{} a été retiré du service avec succès!", entity.label())
            }
        }
    }
}

impl core::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.wire_name())
    }
}
