use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdeck_app::config::AppConfig;
use taskdeck_app::toasts::log_toasts;
use taskdeck_events::ToastBus;
use taskdeck_remote::auth::refresh_loop;
use taskdeck_remote::{AuthClient, HttpBackend, RemoteClient, SessionContext};
use taskdeck_sync::controllers::{Dashboard, NotificationInbox, ProjectList};
use taskdeck_sync::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_app=debug,taskdeck_remote=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = AppConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        url = %config.remote.base_url,
        call_timeout_ms = config.remote.call_timeout.as_millis() as u64,
        "Loaded configuration"
    );

    // --- Remote ---
    let session = Arc::new(SessionContext::new());
    let backend = HttpBackend::new(&config.remote, Arc::clone(&session))
        .context("Failed to build HTTP client")?;
    let client = RemoteClient::new(Arc::new(backend)).with_call_timeout(config.remote.call_timeout);
    let auth = Arc::new(
        AuthClient::new(&config.remote, Arc::clone(&session))
            .context("Failed to build auth client")?,
    );

    // --- Toasts ---
    let bus = Arc::new(ToastBus::default());
    let cancel = CancellationToken::new();
    let toast_handle = tokio::spawn(log_toasts(bus.subscribe(), cancel.clone()));
    let ctx = AppContext::new(client, Arc::clone(&session), Arc::clone(&bus));

    // --- Auth events ---
    let mut auth_events = session.subscribe();
    let events_handle = tokio::spawn(async move {
        while let Some(event) = auth_events.next().await {
            tracing::debug!(?event, "Auth state changed");
        }
    });

    // --- Sign in ---
    let signed_in = auth
        .sign_in(&config.email, &config.password)
        .await
        .context("Sign-in failed")?;
    let name = signed_in
        .user
        .display_name()
        .unwrap_or_else(|| "unknown".to_string());
    tracing::info!(
        user_id = %signed_in.user.id,
        name = %name,
        expires_at = %signed_in.expires_at,
        "Signed in"
    );

    // Spawn token refresh (renews the session before it expires).
    let refresh_handle = {
        let auth = Arc::clone(&auth);
        let cancel = cancel.clone();
        let margin = config.refresh_margin;
        tokio::spawn(async move { refresh_loop(&auth, margin, &cancel).await })
    };

    // --- Session report ---
    let projects = ProjectList::new(ctx.clone());
    match projects.load().await {
        Ok(count) => {
            for project in projects.projects() {
                tracing::info!(
                    project_id = %project.id,
                    name = %project.name,
                    status = %project.status,
                    progress = project.progress,
                    "Project"
                );
            }
            tracing::info!(count, "Projects loaded");
        }
        Err(e) => tracing::error!(error = %e, "Failed to load projects"),
    }

    match Dashboard::new(ctx.clone()).summary(Utc::now().date_naive()).await {
        Ok(summary) => tracing::info!(
            summary = %serde_json::to_string(&summary).unwrap_or_default(),
            "Dashboard"
        ),
        Err(e) => tracing::error!(error = %e, "Failed to build dashboard"),
    }

    match NotificationInbox::new(ctx.clone()).refresh_unread_count().await {
        Ok(unread) => tracing::info!(unread, "Unread notifications"),
        Err(e) => tracing::warn!(error = %e, "Failed to count notifications"),
    }

    // --- Shutdown ---
    if let Err(e) = auth.sign_out().await {
        tracing::warn!(error = %e, "Sign-out request failed; local session cleared");
    }
    cancel.cancel();
    let _ = refresh_handle.await;
    let toasts = toast_handle.await.unwrap_or_default();
    events_handle.abort();
    tracing::info!(toasts, "Session ended");

    Ok(())
}
