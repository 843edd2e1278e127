use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{
    fmt::time::LocalTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::{
    adapters::outbound::postgres::PgTimesheetStore,
    app_state::AppState,
    auth::JwtIssuer,
    config::Settings,
    domain::{NewUser, Role},
};

mod adapters;
mod app_state;
mod auth;
mod config;
mod domain;
mod router;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timesheet_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_timer(LocalTime::rfc_3339()))
        .init();

    let settings = config::read_config()?;
    tracing::debug!("loaded settings: {:?}", settings);

    let pool = PgPoolOptions::new().connect_lazy_with(settings.database.with_db());
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database migrations applied");

    let store = Arc::new(PgTimesheetStore::new(pool));
    let tokens = JwtIssuer::new(&settings.auth.jwt_secret, settings.auth.token_ttl_minutes)?;
    let app_state = AppState::new(store, tokens);

    bootstrap_manager(&app_state, &settings).await?;

    let listener = TcpListener::bind((
        settings.application.host.as_str(),
        settings.application.port,
    ))
    .await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router::create(app_state)).await?;

    Ok(())
}

/// Create the configured manager account when the user table is empty.
async fn bootstrap_manager(app_state: &AppState, settings: &Settings) -> anyhow::Result<()> {
    let Some(manager) = &settings.auth.bootstrap_manager else {
        return Ok(());
    };

    let user = NewUser {
        email: manager.email.clone(),
        full_name: manager.full_name.clone(),
        role: Role::Manager,
        password_hash: app_state.passwords.hash(&manager.password).await?,
    };
    if let Some(created) = app_state.directory.ensure_bootstrap_manager(&user).await? {
        tracing::info!(user_id = %created.id, "created bootstrap manager {}", created.email);
    }

    Ok(())
}
