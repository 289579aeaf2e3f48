//! Typed submit payloads and their local pre-flight validation.

use serde::{Deserialize, Serialize};

use bureau_core::ServiceId;

use crate::op::OperationKind;
use crate::outcome::FieldErrors;

/// Snapshot of profile fields carried by an update.
///
/// `None` means "leave unchanged"; the API applies only the present fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adresse: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cin: Option<String>,
}

impl ProfileFields {
    pub fn is_empty(&self) -> bool {
        self.nom.is_none()
            && self.prenom.is_none()
            && self.email.is_none()
            && self.telephone.is_none()
            && self.adresse.is_none()
            && self.cin.is_none()
    }
}

/// Service tier name as published by the entreprise (e.g. "standard").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceTier(String);

impl ServiceTier {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ServiceTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Service selection context mirrored from submit to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSelection {
    pub service_id: ServiceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub niveau_service: Option<ServiceTier>,
}

/// Payload of a submit call, one variant per operation.
///
/// Selection fields stay optional here because they come straight from form
/// state; `validate` is the gate that keeps incomplete selections off the
/// network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation")]
pub enum SubmitPayload {
    #[serde(rename = "update")]
    Update { fields: ProfileFields },
    #[serde(rename = "delete")]
    Delete {
        #[serde(rename = "serviceId", skip_serializing_if = "Option::is_none")]
        service_id: Option<ServiceId>,
    },
    #[serde(rename = "addService")]
    AddService {
        #[serde(rename = "serviceId")]
        service_id: Option<ServiceId>,
        #[serde(rename = "niveauService")]
        niveau_service: Option<ServiceTier>,
    },
    #[serde(rename = "removeFromService")]
    RemoveFromService {
        #[serde(rename = "serviceId")]
        service_id: Option<ServiceId>,
    },
}

impl SubmitPayload {
    pub fn operation(&self) -> OperationKind {
        match self {
            SubmitPayload::Update { .. } => OperationKind::Update,
            SubmitPayload::Delete { .. } => OperationKind::Delete,
            SubmitPayload::AddService { .. } => OperationKind::AddService,
            SubmitPayload::RemoveFromService { .. } => OperationKind::RemoveFromService,
        }
    }

    /// Selection context to mirror on the confirm call, when complete.
    pub fn service_selection(&self) -> Option<ServiceSelection> {
        match self {
            SubmitPayload::Update { .. } => None,
            SubmitPayload::Delete { service_id } => service_id.clone().map(|service_id| {
                ServiceSelection { service_id, niveau_service: None }
            }),
            SubmitPayload::AddService { service_id, niveau_service } => {
                service_id.clone().map(|service_id| ServiceSelection {
                    service_id,
                    niveau_service: niveau_service.clone(),
                })
            }
            SubmitPayload::RemoveFromService { service_id } => {
                service_id.clone().map(|service_id| ServiceSelection {
                    service_id,
                    niveau_service: None,
                })
            }
        }
    }

    /// Pre-flight validation, performed before any network call.
    ///
    /// `published_tiers` are the tiers the selected service actually offers;
    /// when the caller supplies them, an addService tier outside the list is
    /// rejected locally.
    pub fn validate(&self, published_tiers: &[ServiceTier]) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        match self {
            SubmitPayload::Update { fields } => {
                if fields.is_empty() {
                    errors.push("fields", "Aucune modification à soumettre");
                }
            }
            SubmitPayload::Delete { .. } => {}
            SubmitPayload::AddService { service_id, niveau_service } => {
                if service_id.is_none() {
                    errors.push("serviceId", "Veuillez sélectionner un service");
                }
                match niveau_service {
                    None => {
                        errors.push("niveauService", "Veuillez sélectionner un niveau de service");
                    }
                    Some(tier) => {
                        if !published_tiers.is_empty() && !published_tiers.contains(tier) {
                            errors.push(
                                "niveauService",
                                "Le niveau sélectionné n'est pas proposé par ce service",
                            );
                        }
                    }
                }
            }
            SubmitPayload::RemoveFromService { service_id } => {
                if service_id.is_none() {
                    errors.push("serviceId", "Veuillez sélectionner un service");
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_id() -> ServiceId {
        ServiceId::new("svc-1").unwrap()
    }

    #[test]
    fn add_service_without_tier_fails_locally() {
        let payload = SubmitPayload::AddService {
            service_id: Some(service_id()),
            niveau_service: None,
        };
        let errors = payload.validate(&[]).unwrap_err();
        assert!(errors.first_of("niveauService").is_some());
        assert!(errors.first_of("serviceId").is_none());
    }

    #[test]
    fn add_service_without_selection_reports_both_fields() {
        let payload = SubmitPayload::AddService { service_id: None, niveau_service: None };
        let errors = payload.validate(&[]).unwrap_err();
        assert!(errors.first_of("serviceId").is_some());
        assert!(errors.first_of("niveauService").is_some());
    }

    #[test]
    fn add_service_rejects_unpublished_tier() {
        let payload = SubmitPayload::AddService {
            service_id: Some(service_id()),
            niveau_service: Some(ServiceTier::new("platine")),
        };
        let published = [ServiceTier::new("standard"), ServiceTier::new("premium")];
        let errors = payload.validate(&published).unwrap_err();
        assert!(errors.first_of("niveauService").is_some());

        let ok = SubmitPayload::AddService {
            service_id: Some(service_id()),
            niveau_service: Some(ServiceTier::new("premium")),
        };
        assert!(ok.validate(&published).is_ok());
    }

    #[test]
    fn remove_from_service_requires_a_service() {
        let payload = SubmitPayload::RemoveFromService { service_id: None };
        let errors = payload.validate(&[]).unwrap_err();
        assert!(errors.first_of("serviceId").is_some());

        let payload = SubmitPayload::RemoveFromService { service_id: Some(service_id()) };
        assert!(payload.validate(&[]).is_ok());
    }

    #[test]
    fn empty_update_is_rejected() {
        let payload = SubmitPayload::Update { fields: ProfileFields::default() };
        assert!(payload.validate(&[]).is_err());

        let payload = SubmitPayload::Update {
            fields: ProfileFields { nom: Some("Alaoui".to_string()), ..Default::default() },
        };
        assert!(payload.validate(&[]).is_ok());
    }

    #[test]
    fn delete_needs_no_selection() {
        let payload = SubmitPayload::Delete { service_id: None };
        assert!(payload.validate(&[]).is_ok());
    }
}
