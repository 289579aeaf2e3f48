//! Wire shapes of the backend and their mapping to domain types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bureau_core::{PendingChangeId, ServiceId};
use bureau_workflow::{
    ChangeAction, ChangeOutcome, ChangeStatus, ConfirmRequest, EntityKind, FieldErrors,
    PendingChange, ProfileFields, ServiceSelection, ServiceTier, SubmitPayload, SubmitRequest,
    UpdateSubType,
};

use crate::error::ApiError;

// -------------------------
// Request DTOs
// -------------------------

/// Body of a submit-mutation call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitChangeBody {
    pub entity_id: String,
    pub entity_kind: EntityKind,
    pub entreprise_id: String,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ProfileFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub niveau_service: Option<ServiceTier>,
}

impl From<&SubmitRequest> for SubmitChangeBody {
    fn from(req: &SubmitRequest) -> Self {
        let operation = req.payload.operation().wire_name().to_string();
        let (fields, service_id, niveau_service) = match &req.payload {
            SubmitPayload::Update { fields } => (Some(fields.clone()), None, None),
            SubmitPayload::Delete { service_id } => (None, service_id.clone(), None),
            SubmitPayload::AddService { service_id, niveau_service } => {
                (None, service_id.clone(), niveau_service.clone())
            }
            SubmitPayload::RemoveFromService { service_id } => (None, service_id.clone(), None),
        };

        Self {
            entity_id: req.entity.id_str().to_string(),
            entity_kind: req.entity.kind(),
            entreprise_id: req.entreprise_id.to_string(),
            operation,
            fields,
            service_id,
            niveau_service,
        }
    }
}

/// Body of a confirm-OTP call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmChangeBody {
    pub pending_change_id: String,
    pub otp: String,
    pub operation: String,
    pub entity_kind: EntityKind,
    pub entreprise_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub niveau_service: Option<ServiceTier>,
}

impl From<&ConfirmRequest> for ConfirmChangeBody {
    fn from(req: &ConfirmRequest) -> Self {
        let (service_id, niveau_service) = match &req.context {
            Some(ServiceSelection { service_id, niveau_service }) => {
                (Some(service_id.clone()), niveau_service.clone())
            }
            None => (None, None),
        };

        Self {
            pending_change_id: req.pending_change_id.to_string(),
            otp: req.otp.as_str().to_string(),
            operation: req.operation.wire_name().to_string(),
            entity_kind: req.entity,
            entreprise_id: req.entreprise_id.to_string(),
            service_id,
            niveau_service,
        }
    }
}

/// Body of a password-verification call.
#[derive(Debug, Serialize)]
pub struct VerifyPasswordBody {
    pub email: String,
    pub password: String,
}

// -------------------------
// Response envelopes
// -------------------------

/// Raw discriminated envelope of submit/confirm responses.
///
/// The backend is inconsistent about nesting (`pendingChangeId` sometimes at
/// the top level, sometimes under `data`; same for `message`), so every slot
/// is optional and `into_outcome` performs the normalization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChangeResponse {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pending_change_id: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub data: Option<RawChangeData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChangeData {
    #[serde(default)]
    pub pending_change_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RawChangeResponse {
    /// Normalize the ad-hoc envelope into the uniform outcome type.
    pub fn into_outcome(self) -> Result<ChangeOutcome, ApiError> {
        let data = self.data.unwrap_or_default();
        match self.kind.as_str() {
            "success" => {
                let message = self
                    .message
                    .or(data.message)
                    .unwrap_or_else(|| "Opération effectuée avec succès.".to_string());
                Ok(ChangeOutcome::completed(message))
            }
            "pending" => {
                let raw_id = self
                    .pending_change_id
                    .or(data.pending_change_id)
                    .ok_or_else(|| {
                        ApiError::Parse("pending response without pendingChangeId".to_string())
                    })?;
                let id = PendingChangeId::new(raw_id)
                    .map_err(|e| ApiError::Parse(e.to_string()))?;
                Ok(ChangeOutcome::pending(id))
            }
            "error" => {
                let field_errors = self.errors.map(FieldErrors).unwrap_or_default();
                let message = self
                    .message
                    .or(data.message)
                    .unwrap_or_else(|| "Une erreur est survenue. Veuillez réessayer.".to_string());
                Ok(ChangeOutcome::validation_failure(message, field_errors))
            }
            other => Err(ApiError::Parse(format!("unknown response type '{other}'"))),
        }
    }
}

/// Response of the password-verification call.
#[derive(Debug, Deserialize)]
pub struct VerifyPasswordResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of the administrator-email lookup.
#[derive(Debug, Deserialize)]
pub struct AdminLookupResponse {
    pub email: String,
}

// -------------------------
// Read models
// -------------------------

/// Service assignment of an agent or client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAssignment {
    pub service_id: ServiceId,
    #[serde(default)]
    pub niveau_service: Option<ServiceTier>,
}

/// Agent list entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub id: String,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub services: Vec<ServiceAssignment>,
}

/// Client list entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: String,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub services: Vec<ServiceAssignment>,
}

/// Gérant list entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GerantSummary {
    pub id: String,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    #[serde(default)]
    pub services: Vec<ServiceId>,
}

/// Service offered by the entreprise, with its published tiers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub id: ServiceId,
    pub nom: String,
    #[serde(default)]
    pub niveaux: Vec<ServiceTier>,
}

/// Payment history entry. Amounts are in minor units (centimes).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: String,
    pub libelle: String,
    pub montant: i64,
    pub statut: String,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Pending change as listed by the approval view.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingChangeDto {
    pub id: String,
    pub entity_kind: EntityKind,
    pub action: ChangeAction,
    #[serde(default)]
    pub sub_type: Option<UpdateSubType>,
    pub status: ChangeStatus,
    #[serde(default)]
    pub fields: ProfileFields,
    #[serde(default)]
    pub service_id: Option<ServiceId>,
    #[serde(default)]
    pub niveau_service: Option<ServiceTier>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl TryFrom<PendingChangeDto> for PendingChange {
    type Error = ApiError;

    fn try_from(dto: PendingChangeDto) -> Result<Self, Self::Error> {
        let id = PendingChangeId::new(dto.id).map_err(|e| ApiError::Parse(e.to_string()))?;
        let service = dto.service_id.map(|service_id| ServiceSelection {
            service_id,
            niveau_service: dto.niveau_service.clone(),
        });

        Ok(PendingChange {
            id,
            entity: dto.entity_kind,
            action: dto.action,
            sub_type: dto.sub_type,
            status: dto.status,
            fields: dto.fields,
            service,
            created_at: dto.created_at,
            expires_at: dto.expires_at,
            rejection_reason: dto.rejection_reason,
        })
    }
}
