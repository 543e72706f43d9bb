use std::process::ExitCode;

use reservas_client::config::ClientConfig;
use reservas_client::context::AppContext;
use reservas_client::gate::RoleBinding;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => tracing::debug!("no .env file found"),
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid client configuration");
            return ExitCode::FAILURE;
        }
    };
    let ctx = match AppContext::init(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(error = %e, "client init failed");
            return ExitCode::FAILURE;
        }
    };

    let (mut session, config) = ctx.bootstrap().await;

    // Optional credential check for smoke-testing a deployment.
    if let (Ok(email), Ok(password)) = (std::env::var("RESERVAS_PROBE_EMAIL"), std::env::var("RESERVAS_PROBE_PASSWORD")) {
        match ctx.session().login(&email, &password).await {
            Ok(_) => session = ctx.session().snapshot(),
            Err(e) => {
                tracing::error!(error = %e, "probe login failed");
                ctx.dispose();
                return ExitCode::FAILURE;
            }
        }
    }

    match &session.user {
        Some(user) => tracing::info!(
            user_id = %user.id,
            role = %user.role,
            landing = RoleBinding::landing_path(user.role),
            "session active"
        ),
        None => tracing::info!(error = ?session.error, "no active session"),
    }
    tracing::info!(
        site = config.site_name(),
        loaded = config.is_loaded(),
        maintenance = config.maintenance_mode(),
        reservations = config.reservations_enabled(),
        registration = config.registration_enabled(),
        max_reservations = config.max_reservations_per_user(None),
        cancellation_hours = config.cancellation_lead_time_hours(None),
        "system configuration"
    );

    let healthy = config.error.is_none() && session.error.is_none();
    ctx.dispose();
    if healthy { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
