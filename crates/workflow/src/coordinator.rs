//! Per-mutation workflow coordination.
//!
//! A `ChangeFlow` drives one mutation through the two-phase protocol:
//!
//! ```text
//! Idle → Submitting → (Completed | AwaitingOtp)
//! AwaitingOtp → ConfirmingOtp → (Completed | AwaitingOtp)
//! ```
//!
//! Failed submissions return to `Idle` (the operator resubmits manually;
//! nothing is retried automatically). Failed confirmations return to
//! `AwaitingOtp`; OTP re-entry is unlimited and the pending id stays live
//! unless the API reports expiration. Transport failures never surface as
//! errors to the caller; they become a generic `Failed` outcome and leave
//! the flow in a retryable phase.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use bureau_core::{AgentId, ClientId, EntrepriseId, MutationId, PendingChangeId};

use crate::op::{EntityKind, OperationKind};
use crate::otp::OtpCode;
use crate::outcome::{ChangeOutcome, FieldErrors};
use crate::payload::{ServiceSelection, ServiceTier, SubmitPayload};

/// Target of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EntityRef {
    Agent(AgentId),
    Client(ClientId),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Agent(_) => EntityKind::Agent,
            EntityRef::Client(_) => EntityKind::Client,
        }
    }

    pub fn id_str(&self) -> &str {
        match self {
            EntityRef::Agent(id) => id.as_str(),
            EntityRef::Client(id) => id.as_str(),
        }
    }
}

/// Submit call shape handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitRequest {
    pub entity: EntityRef,
    pub entreprise_id: EntrepriseId,
    pub payload: SubmitPayload,
}

/// Confirm call shape handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmRequest {
    pub pending_change_id: PendingChangeId,
    pub otp: OtpCode,
    pub operation: OperationKind,
    pub entity: EntityKind,
    pub context: Option<ServiceSelection>,
    pub entreprise_id: EntrepriseId,
}

/// Transport-level failure (network, unparseable response).
///
/// Callers of `ChangeFlow` never see this type; the flow folds it into a
/// generic `Failed` outcome.
#[derive(Debug, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// Seam to the external API's mutation endpoints.
#[async_trait]
pub trait ChangeTransport: Send + Sync {
    async fn submit_change(&self, req: &SubmitRequest) -> Result<ChangeOutcome, TransportError>;

    async fn confirm_change(&self, req: &ConfirmRequest) -> Result<ChangeOutcome, TransportError>;
}

/// Phase of an in-flight mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    AwaitingOtp { pending_change_id: PendingChangeId },
    ConfirmingOtp { pending_change_id: PendingChangeId },
    Completed,
}

/// One mutation driven through submit → await-OTP → confirm.
#[derive(Debug, Clone)]
pub struct ChangeFlow {
    id: MutationId,
    entity: EntityRef,
    entreprise_id: EntrepriseId,
    operation: Option<OperationKind>,
    context: Option<ServiceSelection>,
    phase: Phase,
}

impl ChangeFlow {
    pub fn new(entity: EntityRef, entreprise_id: EntrepriseId) -> Self {
        Self {
            id: MutationId::new(),
            entity,
            entreprise_id,
            operation: None,
            context: None,
            phase: Phase::Idle,
        }
    }

    pub fn id(&self) -> MutationId {
        self.id
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn operation(&self) -> Option<OperationKind> {
        self.operation
    }

    /// Pending-change id, when the flow awaits or is confirming an OTP.
    pub fn pending_change_id(&self) -> Option<&PendingChangeId> {
        match &self.phase {
            Phase::AwaitingOtp { pending_change_id }
            | Phase::ConfirmingOtp { pending_change_id } => Some(pending_change_id),
            _ => None,
        }
    }

    /// Submit the intended change.
    ///
    /// `published_tiers` are the tiers offered by the selected service (empty
    /// when no service is involved). Incomplete selections fail locally with
    /// field-keyed errors; the network is never contacted in that case.
    pub async fn submit<T: ChangeTransport>(
        &mut self,
        transport: &T,
        payload: SubmitPayload,
        published_tiers: &[ServiceTier],
    ) -> ChangeOutcome {
        match self.phase {
            Phase::Idle => {}
            Phase::Completed => {
                return ChangeOutcome::failed("Cette modification est déjà terminée.");
            }
            _ => {
                return ChangeOutcome::failed("Une modification est déjà en cours.");
            }
        }

        if let Err(field_errors) = payload.validate(published_tiers) {
            tracing::debug!(
                mutation = %self.id,
                operation = %payload.operation(),
                "submit rejected locally: incomplete selection"
            );
            return ChangeOutcome::validation_failure(
                "Veuillez corriger les champs indiqués.",
                field_errors,
            );
        }

        let operation = payload.operation();
        self.operation = Some(operation);
        self.context = payload.service_selection();
        self.phase = Phase::Submitting;

        let req = SubmitRequest {
            entity: self.entity.clone(),
            entreprise_id: self.entreprise_id.clone(),
            payload,
        };

        tracing::info!(
            mutation = %self.id,
            entity = self.entity.id_str(),
            operation = %operation,
            "submitting change"
        );

        match transport.submit_change(&req).await {
            Ok(ChangeOutcome::Completed { message }) => {
                self.phase = Phase::Completed;
                ChangeOutcome::completed(message)
            }
            Ok(ChangeOutcome::Pending { pending_change_id }) => {
                tracing::info!(
                    mutation = %self.id,
                    pending_change_id = %pending_change_id,
                    "change pending, awaiting OTP confirmation"
                );
                self.phase = Phase::AwaitingOtp { pending_change_id: pending_change_id.clone() };
                ChangeOutcome::pending(pending_change_id)
            }
            Ok(failed @ ChangeOutcome::Failed { .. }) => {
                self.phase = Phase::Idle;
                failed
            }
            Err(err) => {
                tracing::warn!(mutation = %self.id, error = %err, "submit transport failure");
                self.phase = Phase::Idle;
                ChangeOutcome::generic_failure()
            }
        }
    }

    /// Confirm the pending change with the operator-entered code.
    ///
    /// Both local gates (a pending id must exist, the code must be six
    /// digits) fail without contacting the network.
    pub async fn confirm<T: ChangeTransport>(
        &mut self,
        transport: &T,
        raw_otp: &str,
    ) -> ChangeOutcome {
        let pending_change_id = match &self.phase {
            Phase::AwaitingOtp { pending_change_id } => pending_change_id.clone(),
            _ => {
                tracing::debug!(mutation = %self.id, "confirm without a pending change");
                return ChangeOutcome::failed("Aucune modification en attente de confirmation.");
            }
        };

        let otp = match OtpCode::parse(raw_otp) {
            Ok(otp) => otp,
            Err(_) => {
                return ChangeOutcome::validation_failure(
                    "Le code saisi est invalide.",
                    FieldErrors::single("otp", "Le code doit contenir exactement 6 chiffres"),
                );
            }
        };

        // operation is always set once a submit reached AwaitingOtp
        let operation = match self.operation {
            Some(op) => op,
            None => {
                return ChangeOutcome::failed("Aucune modification en attente de confirmation.");
            }
        };

        self.phase = Phase::ConfirmingOtp { pending_change_id: pending_change_id.clone() };

        let req = ConfirmRequest {
            pending_change_id: pending_change_id.clone(),
            otp,
            operation,
            entity: self.entity.kind(),
            context: self.context.clone(),
            entreprise_id: self.entreprise_id.clone(),
        };

        tracing::info!(
            mutation = %self.id,
            pending_change_id = %pending_change_id,
            operation = %operation,
            "confirming change"
        );

        match transport.confirm_change(&req).await {
            Ok(ChangeOutcome::Completed { .. }) => {
                self.phase = Phase::Completed;
                ChangeOutcome::completed(operation.success_message(self.entity.kind()))
            }
            Ok(failed @ ChangeOutcome::Failed { .. }) => {
                self.phase = Phase::AwaitingOtp { pending_change_id };
                failed
            }
            Ok(ChangeOutcome::Pending { .. }) => {
                tracing::warn!(mutation = %self.id, "unexpected pending response on confirm");
                self.phase = Phase::AwaitingOtp { pending_change_id };
                ChangeOutcome::generic_failure()
            }
            Err(err) => {
                tracing::warn!(mutation = %self.id, error = %err, "confirm transport failure");
                self.phase = Phase::AwaitingOtp { pending_change_id };
                ChangeOutcome::generic_failure()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted transport: pops the next queued response per call and counts
    /// how often each endpoint was hit.
    #[derive(Default)]
    struct ScriptedTransport {
        submit_responses: Mutex<Vec<Result<ChangeOutcome, TransportError>>>,
        confirm_responses: Mutex<Vec<Result<ChangeOutcome, TransportError>>>,
        submit_calls: Mutex<usize>,
        confirm_calls: Mutex<Vec<ConfirmRequest>>,
    }

    impl ScriptedTransport {
        fn on_submit(self, response: Result<ChangeOutcome, TransportError>) -> Self {
            self.submit_responses.lock().unwrap().insert(0, response);
            self
        }

        fn on_confirm(self, response: Result<ChangeOutcome, TransportError>) -> Self {
            self.confirm_responses.lock().unwrap().insert(0, response);
            self
        }

        fn submit_count(&self) -> usize {
            *self.submit_calls.lock().unwrap()
        }

        fn confirm_count(&self) -> usize {
            self.confirm_calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChangeTransport for ScriptedTransport {
        async fn submit_change(
            &self,
            _req: &SubmitRequest,
        ) -> Result<ChangeOutcome, TransportError> {
            *self.submit_calls.lock().unwrap() += 1;
            self.submit_responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| panic!("unexpected submit call"))
        }

        async fn confirm_change(
            &self,
            req: &ConfirmRequest,
        ) -> Result<ChangeOutcome, TransportError> {
            self.confirm_calls.lock().unwrap().push(req.clone());
            self.confirm_responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| panic!("unexpected confirm call"))
        }
    }

    fn agent_flow() -> ChangeFlow {
        ChangeFlow::new(
            EntityRef::Agent(AgentId::new("agent-1").unwrap()),
            EntrepriseId::new("ent-1").unwrap(),
        )
    }

    fn client_flow() -> ChangeFlow {
        ChangeFlow::new(
            EntityRef::Client(ClientId::new("client-1").unwrap()),
            EntrepriseId::new("ent-1").unwrap(),
        )
    }

    fn pending_id(s: &str) -> PendingChangeId {
        PendingChangeId::new(s).unwrap()
    }

    fn delete_payload() -> SubmitPayload {
        SubmitPayload::Delete { service_id: None }
    }

    async fn flow_awaiting_otp(transport: &ScriptedTransport) -> ChangeFlow {
        let mut flow = client_flow();
        let outcome = flow.submit(transport, delete_payload(), &[]).await;
        assert!(outcome.is_pending());
        flow
    }

    #[tokio::test]
    async fn incomplete_selection_never_reaches_the_network() {
        let transport = ScriptedTransport::default();
        let mut flow = agent_flow();

        let outcome = flow
            .submit(
                &transport,
                SubmitPayload::AddService { service_id: None, niveau_service: None },
                &[],
            )
            .await;

        match outcome {
            ChangeOutcome::Failed { field_errors, .. } => {
                assert!(field_errors.first_of("serviceId").is_some());
                assert!(field_errors.first_of("niveauService").is_some());
            }
            other => panic!("expected local failure, got {other:?}"),
        }
        assert_eq!(transport.submit_count(), 0);
        assert_eq!(*flow.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn pending_response_transitions_to_awaiting_otp() {
        let transport = ScriptedTransport::default()
            .on_submit(Ok(ChangeOutcome::pending(pending_id("abc123"))));
        let mut flow = client_flow();

        let outcome = flow.submit(&transport, delete_payload(), &[]).await;

        assert_eq!(outcome, ChangeOutcome::pending(pending_id("abc123")));
        assert_eq!(flow.pending_change_id(), Some(&pending_id("abc123")));
        assert!(matches!(flow.phase(), Phase::AwaitingOtp { .. }));
    }

    #[tokio::test]
    async fn immediate_success_completes_the_flow() {
        let transport = ScriptedTransport::default()
            .on_submit(Ok(ChangeOutcome::completed("Modification enregistrée.")));
        let mut flow = agent_flow();

        let outcome = flow
            .submit(
                &transport,
                SubmitPayload::Update {
                    fields: ProfileFieldsFixture::nom_only(),
                },
                &[],
            )
            .await;

        assert!(outcome.is_completed());
        assert_eq!(*flow.phase(), Phase::Completed);

        // a completed flow rejects further submissions locally
        let again = flow.submit(&transport, delete_payload(), &[]).await;
        assert!(matches!(again, ChangeOutcome::Failed { .. }));
        assert_eq!(transport.submit_count(), 1);
    }

    #[tokio::test]
    async fn submit_transport_failure_returns_generic_outcome_and_idle_phase() {
        let transport = ScriptedTransport::default()
            .on_submit(Err(TransportError("connection refused".to_string())))
            .on_submit(Ok(ChangeOutcome::pending(pending_id("abc123"))));
        let mut flow = client_flow();

        let outcome = flow.submit(&transport, delete_payload(), &[]).await;
        assert_eq!(outcome, ChangeOutcome::generic_failure());
        assert_eq!(*flow.phase(), Phase::Idle);

        // manual resubmission proceeds normally
        let outcome = flow.submit(&transport, delete_payload(), &[]).await;
        assert!(outcome.is_pending());
    }

    #[tokio::test]
    async fn malformed_otp_fails_locally_for_every_operation() {
        let payloads = [
            SubmitPayload::Update { fields: ProfileFieldsFixture::nom_only() },
            SubmitPayload::Delete { service_id: None },
            SubmitPayload::AddService {
                service_id: Some(ServiceId::new("svc-1").unwrap()),
                niveau_service: Some(ServiceTier::new("standard")),
            },
            SubmitPayload::RemoveFromService {
                service_id: Some(ServiceId::new("svc-1").unwrap()),
            },
        ];

        for payload in payloads {
            let transport = ScriptedTransport::default()
                .on_submit(Ok(ChangeOutcome::pending(pending_id("abc123"))));
            let mut flow = agent_flow();
            assert!(flow.submit(&transport, payload, &[]).await.is_pending());

            let outcome = flow.confirm(&transport, "12a456").await;
            match outcome {
                ChangeOutcome::Failed { field_errors, .. } => {
                    assert_eq!(
                        field_errors.first_of("otp"),
                        Some("Le code doit contenir exactement 6 chiffres")
                    );
                }
                other => panic!("expected local failure, got {other:?}"),
            }
            assert_eq!(transport.confirm_count(), 0);
            assert!(matches!(flow.phase(), Phase::AwaitingOtp { .. }));
        }
    }

    #[tokio::test]
    async fn confirm_without_pending_change_fails_locally() {
        let transport = ScriptedTransport::default();
        let mut flow = client_flow();

        let outcome = flow.confirm(&transport, "123456").await;
        assert!(matches!(outcome, ChangeOutcome::Failed { .. }));
        assert_eq!(transport.confirm_count(), 0);
    }

    #[tokio::test]
    async fn delete_confirmation_emits_the_delete_specific_message() {
        let transport = ScriptedTransport::default()
            .on_submit(Ok(ChangeOutcome::pending(pending_id("abc123"))))
            .on_confirm(Ok(ChangeOutcome::completed("ok")));
        let mut flow = flow_awaiting_otp(&transport).await;

        let outcome = flow.confirm(&transport, "123456").await;

        assert_eq!(
            outcome,
            ChangeOutcome::completed("Le client a été supprimé avec succès!")
        );
        assert_eq!(*flow.phase(), Phase::Completed);

        let sent = transport.confirm_calls.lock().unwrap();
        assert_eq!(sent[0].pending_change_id, pending_id("abc123"));
        assert_eq!(sent[0].operation, OperationKind::Delete);
        assert_eq!(sent[0].otp.as_str(), "123456");
    }

    #[tokio::test]
    async fn wrong_otp_allows_unlimited_retries() {
        let transport = ScriptedTransport::default()
            .on_submit(Ok(ChangeOutcome::pending(pending_id("abc123"))))
            .on_confirm(Ok(ChangeOutcome::failed("Code OTP invalide")))
            .on_confirm(Ok(ChangeOutcome::failed("Code OTP invalide")))
            .on_confirm(Ok(ChangeOutcome::completed("ok")));
        let mut flow = flow_awaiting_otp(&transport).await;

        for _ in 0..2 {
            let outcome = flow.confirm(&transport, "111111").await;
            assert!(matches!(outcome, ChangeOutcome::Failed { .. }));
            assert_eq!(flow.pending_change_id(), Some(&pending_id("abc123")));
        }

        let outcome = flow.confirm(&transport, "123456").await;
        assert!(outcome.is_completed());
        assert_eq!(transport.confirm_count(), 3);
    }

    #[tokio::test]
    async fn confirm_transport_failure_keeps_the_pending_change_retryable() {
        let transport = ScriptedTransport::default()
            .on_submit(Ok(ChangeOutcome::pending(pending_id("abc123"))))
            .on_confirm(Err(TransportError("timeout".to_string())))
            .on_confirm(Ok(ChangeOutcome::completed("ok")));
        let mut flow = flow_awaiting_otp(&transport).await;

        let outcome = flow.confirm(&transport, "123456").await;
        assert_eq!(outcome, ChangeOutcome::generic_failure());
        assert_eq!(flow.pending_change_id(), Some(&pending_id("abc123")));

        let outcome = flow.confirm(&transport, "123456").await;
        assert!(outcome.is_completed());
    }

    #[tokio::test]
    async fn service_context_is_mirrored_on_confirm() {
        let transport = ScriptedTransport::default()
            .on_submit(Ok(ChangeOutcome::pending(pending_id("abc123"))))
            .on_confirm(Ok(ChangeOutcome::completed("ok")));
        let mut flow = agent_flow();

        let payload = SubmitPayload::AddService {
            service_id: Some(ServiceId::new("svc-1").unwrap()),
            niveau_service: Some(ServiceTier::new("premium")),
        };
        let published = [ServiceTier::new("standard"), ServiceTier::new("premium")];
        assert!(flow.submit(&transport, payload, &published).await.is_pending());

        let outcome = flow.confirm(&transport, "123456").await;
        assert_eq!(
            outcome,
            ChangeOutcome::completed("Le service a été ajouté avec succès!")
        );

        let sent = transport.confirm_calls.lock().unwrap();
        let context = sent[0].context.as_ref().expect("context must be mirrored");
        assert_eq!(context.service_id.as_str(), "svc-1");
        assert_eq!(context.niveau_service.as_ref().map(|t| t.as_str()), Some("premium"));
    }

    use bureau_core::ServiceId;
    use crate::payload::ProfileFields;

    struct ProfileFieldsFixture;

    impl ProfileFieldsFixture {
        fn nom_only() -> ProfileFields {
            ProfileFields { nom: Some("Alaoui".to_string()), ..Default::default() }
        }
    }
}
