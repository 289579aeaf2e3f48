//! Dashboard shell: wires the API client, the re-authentication guard and the
//! inactivity monitor together, loads the entreprise directory once, then
//! runs until interrupted.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Mutex;

use bureau_api::ApiClient;
use bureau_core::{EntrepriseId, Role};
use bureau_session::{
    spawn_monitor, Clock, InMemorySessionStore, ProtectedPaths, ReauthGuard, SessionStore,
    SystemClock, TickOutcome, CHECK_INTERVAL,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bureau_observability::init();

    let api_url = std::env::var("BUREAU_API_URL").unwrap_or_else(|_| {
        tracing::warn!("BUREAU_API_URL not set; using http://localhost:8080");
        "http://localhost:8080".to_string()
    });

    let entreprise_id = std::env::var("BUREAU_ENTREPRISE_ID").unwrap_or_else(|_| {
        tracing::warn!("BUREAU_ENTREPRISE_ID not set; using dev default");
        "dev-entreprise".to_string()
    });
    let entreprise_id = EntrepriseId::new(entreprise_id).context("invalid entreprise id")?;

    let role = match std::env::var("BUREAU_ROLE").as_deref() {
        Ok("admin") | Err(_) => Role::Admin,
        Ok("gerant") => Role::Gerant,
        Ok("superAdmin") => Role::SuperAdmin,
        Ok(other) => anyhow::bail!("unknown BUREAU_ROLE '{other}'"),
    };

    let api = match std::env::var("BUREAU_AUTH_TOKEN") {
        Ok(token) => ApiClient::new(api_url).with_token(token),
        Err(_) => {
            tracing::warn!("BUREAU_AUTH_TOKEN not set; calls go out unauthenticated");
            ApiClient::new(api_url)
        }
    };

    tracing::info!(%entreprise_id, %role, api = api.base_url(), "starting dashboard shell");

    // Session guard: fresh store, wall clock, default protected sections.
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let guard = Arc::new(Mutex::new(ReauthGuard::new(
        store,
        clock,
        ProtectedPaths::dashboard_defaults(),
        role,
        role.home_path(),
    )));

    let monitor = spawn_monitor(
        guard.clone(),
        CHECK_INTERVAL,
        {
            let home = role.home_path().to_string();
            move || home.clone()
        },
        |outcome| {
            if let TickOutcome::Expired { redirect, challenge } = outcome {
                tracing::info!(?redirect, ?challenge, "session expired by inactivity");
            }
        },
    );

    load_directory(&api, &entreprise_id).await;

    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    tracing::info!("shutting down");
    monitor.shutdown().await;

    Ok(())
}

/// One-shot load of everything the dashboard landing views show.
///
/// Read failures are logged and skipped; the shell stays up so the operator
/// can retry once the backend is reachable again.
async fn load_directory(api: &ApiClient, entreprise_id: &EntrepriseId) {
    match api.admin_email(entreprise_id).await {
        Ok(email) => tracing::info!(admin = email, "administrator resolved"),
        Err(err) => tracing::warn!(error = %err, "administrator lookup failed"),
    }

    match api.list_agents(entreprise_id).await {
        Ok(agents) => tracing::info!(count = agents.len(), "agents loaded"),
        Err(err) => tracing::warn!(error = %err, "agent listing failed"),
    }

    match api.list_clients(entreprise_id).await {
        Ok(clients) => tracing::info!(count = clients.len(), "clients loaded"),
        Err(err) => tracing::warn!(error = %err, "client listing failed"),
    }

    match api.list_gerants(entreprise_id).await {
        Ok(gerants) => tracing::info!(count = gerants.len(), "gérants loaded"),
        Err(err) => tracing::warn!(error = %err, "gérant listing failed"),
    }

    match api.list_services(entreprise_id).await {
        Ok(services) => tracing::info!(count = services.len(), "services loaded"),
        Err(err) => tracing::warn!(error = %err, "service listing failed"),
    }

    match api.list_pending_changes(entreprise_id).await {
        Ok(changes) => {
            let now = chrono::Utc::now();
            let awaiting = changes.iter().filter(|c| c.can_confirm(now)).count();
            tracing::info!(total = changes.len(), awaiting, "pending changes loaded");
        }
        Err(err) => tracing::warn!(error = %err, "pending-change listing failed"),
    }

    match api.payment_history(entreprise_id).await {
        Ok(payments) => tracing::info!(count = payments.len(), "payments loaded"),
        Err(err) => tracing::warn!(error = %err, "payment history failed"),
    }
}
