//! HTTP client for the backend.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use bureau_core::EntrepriseId;
use bureau_session::{PasswordVerifier, VerifyError, VerifyResponse};
use bureau_workflow::{
    ChangeOutcome, ChangeTransport, ConfirmRequest, PendingChange, SubmitRequest, TransportError,
};

use crate::dto::{
    AdminLookupResponse, AgentSummary, ClientSummary, ConfirmChangeBody, GerantSummary,
    PaymentRecord, PendingChangeDto, RawChangeResponse, ServiceSummary, SubmitChangeBody,
    VerifyPasswordBody, VerifyPasswordResponse,
};
use crate::error::ApiError;

/// Client for the administration backend.
///
/// Cheap to clone; holds one connection pool for the whole dashboard session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Attach the bearer token of the signed-in user.
    ///
    /// The token is sent on every call so the backend can re-validate
    /// privileged actions regardless of the client-side guard.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------
    // Mutation protocol
    // -------------------------

    /// Phase 1: submit an intended change.
    pub async fn submit_change(&self, req: &SubmitRequest) -> Result<ChangeOutcome, ApiError> {
        let body = SubmitChangeBody::from(req);
        self.change_call("/changes", &body).await
    }

    /// Phase 2: confirm a pending change with the operator-entered OTP.
    pub async fn confirm_change(&self, req: &ConfirmRequest) -> Result<ChangeOutcome, ApiError> {
        let body = ConfirmChangeBody::from(req);
        self.change_call("/changes/confirm", &body).await
    }

    /// POST a mutation-protocol call and normalize the response envelope.
    ///
    /// The backend answers business failures (invalid OTP, expired pending
    /// change, field validation) with a well-formed error envelope, also on
    /// non-2xx statuses; those become `Failed` outcomes, not `Err`.
    async fn change_call<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ChangeOutcome, ApiError> {
        let mut req = self.client.post(format!("{}{}", self.base_url, path)).json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        match serde_json::from_str::<RawChangeResponse>(&text) {
            Ok(raw) => raw.into_outcome(),
            Err(err) if status.is_success() => {
                Err(ApiError::Parse(format!("unexpected response body: {err}")))
            }
            Err(_) => Err(ApiError::Api(status.as_u16(), text)),
        }
    }

    // -------------------------
    // Password verification
    // -------------------------

    /// Check the administrator password ahead of protected navigation.
    pub async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<VerifyPasswordResponse, ApiError> {
        let body = VerifyPasswordBody { email: email.to_string(), password: password.to_string() };
        self.post_json("/auth/verify-password", &body).await
    }

    /// Resolve the administrator email of an entreprise (the password
    /// challenge is verified against this address).
    pub async fn admin_email(&self, entreprise_id: &EntrepriseId) -> Result<String, ApiError> {
        let resp: AdminLookupResponse = self
            .get_json(&format!("/entreprises/{entreprise_id}/administrator"))
            .await?;
        Ok(resp.email)
    }

    // -------------------------
    // Directory reads
    // -------------------------

    pub async fn list_agents(
        &self,
        entreprise_id: &EntrepriseId,
    ) -> Result<Vec<AgentSummary>, ApiError> {
        self.get_json(&format!("/entreprises/{entreprise_id}/agents")).await
    }

    pub async fn list_clients(
        &self,
        entreprise_id: &EntrepriseId,
    ) -> Result<Vec<ClientSummary>, ApiError> {
        self.get_json(&format!("/entreprises/{entreprise_id}/clients")).await
    }

    pub async fn list_gerants(
        &self,
        entreprise_id: &EntrepriseId,
    ) -> Result<Vec<GerantSummary>, ApiError> {
        self.get_json(&format!("/entreprises/{entreprise_id}/gerants")).await
    }

    pub async fn list_services(
        &self,
        entreprise_id: &EntrepriseId,
    ) -> Result<Vec<ServiceSummary>, ApiError> {
        self.get_json(&format!("/entreprises/{entreprise_id}/services")).await
    }

    /// Pending changes awaiting approval, for the approval view.
    pub async fn list_pending_changes(
        &self,
        entreprise_id: &EntrepriseId,
    ) -> Result<Vec<PendingChange>, ApiError> {
        let dtos: Vec<PendingChangeDto> = self
            .get_json(&format!("/entreprises/{entreprise_id}/pending-changes"))
            .await?;
        dtos.into_iter().map(PendingChange::try_from).collect()
    }

    pub async fn payment_history(
        &self,
        entreprise_id: &EntrepriseId,
    ) -> Result<Vec<PaymentRecord>, ApiError> {
        self.get_json(&format!("/entreprises/{entreprise_id}/paiements")).await
    }

    // -------------------------
    // Plumbing
    // -------------------------

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let mut req = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Api(status.as_u16(), body));
        }

        resp.json::<T>().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let mut req = self.client.post(format!("{}{}", self.base_url, path)).json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Api(status.as_u16(), body));
        }

        resp.json::<T>().await.map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ChangeTransport for ApiClient {
    async fn submit_change(&self, req: &SubmitRequest) -> Result<ChangeOutcome, TransportError> {
        ApiClient::submit_change(self, req)
            .await
            .map_err(|e| TransportError(e.to_string()))
    }

    async fn confirm_change(&self, req: &ConfirmRequest) -> Result<ChangeOutcome, TransportError> {
        ApiClient::confirm_change(self, req)
            .await
            .map_err(|e| TransportError(e.to_string()))
    }
}

#[async_trait]
impl PasswordVerifier for ApiClient {
    async fn verify_password(&self, email: &str, password: &str)
        -> Result<VerifyResponse, VerifyError> {
        let resp = ApiClient::verify_password(self, email, password)
            .await
            .map_err(|e| VerifyError(e.to_string()))?;
        Ok(VerifyResponse { success: resp.success, message: resp.message })
    }
}
