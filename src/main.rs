use std::future::IntoFuture;
use std::{process, sync::Arc};

use carpas::{
    application::{context::ServiceContext, error::AppError, push::PushGateway},
    config::{self, NotificationsCommand, UsersCommand},
    domain::types::Role,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        push::{DisabledPushGateway, HttpRelayPushGateway},
        telemetry,
    },
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Users(args) => match args.command {
            UsersCommand::SetRole(args) => run_set_role(settings, &args.email, &args.role).await,
        },
        config::Command::Notifications(args) => match args.command {
            NotificationsCommand::Prune(args) => {
                run_prune(settings, args.days, args.include_unread).await
            }
        },
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let services = init_services(&settings).await?;

    match services.sessions.purge_expired().await {
        Ok(purged) if purged > 0 => {
            info!(target = "carpas::auth", purged, "expired sessions removed");
        }
        Ok(_) => {}
        Err(err) => warn!(target = "carpas::auth", error = %err, "session purge failed"),
    }

    serve_http(&settings, ApiState::new(services)).await
}

async fn run_set_role(settings: config::Settings, email: &str, role: &str) -> Result<(), AppError> {
    let role: Role = role.parse().map_err(AppError::validation)?;
    let services = init_services(&settings).await?;
    let user = services
        .admin
        .set_role_by_email(email, role)
        .await
        .map_err(|err| AppError::unexpected(err.to_string()))?;
    info!(
        target = "carpas::cli",
        user_id = %user.id,
        email = %user.email,
        role = user.role.as_str(),
        "role updated"
    );
    Ok(())
}

async fn run_prune(
    settings: config::Settings,
    days: i64,
    include_unread: bool,
) -> Result<(), AppError> {
    let services = init_services(&settings).await?;
    let outcome = services
        .admin
        .clean_old_notifications(Some(days), Some(!include_unread))
        .await
        .map_err(|err| AppError::unexpected(err.to_string()))?;
    info!(
        target = "carpas::cli",
        deleted = outcome.count,
        days,
        include_unread,
        "notifications pruned"
    );
    Ok(())
}

async fn init_services(settings: &config::Settings) -> Result<ServiceContext, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    let gateway: Arc<dyn PushGateway> = match settings.push.relay_url.clone() {
        Some(relay_url) => Arc::new(HttpRelayPushGateway::new(relay_url, &settings.push)?),
        None => {
            info!(target = "carpas::push", "push relay not configured; delivery disabled");
            Arc::new(DisabledPushGateway)
        }
    };

    Ok(ServiceContext::assemble(
        Arc::new(PostgresRepositories::new(pool)),
        gateway,
        settings.sessions.ttl,
    ))
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(target = "carpas::http", addr = %settings.server.addr, "listening");

    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { signal.notified().await })
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => {
            return result.map_err(|err| AppError::unexpected(format!("server error: {err}")));
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                warn!(target = "carpas::http", error = %err, "failed to listen for shutdown signal");
            }
        }
    }

    info!(target = "carpas::http", "shutting down");
    shutdown.notify_one();
    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(result) => result.map_err(|err| AppError::unexpected(format!("server error: {err}"))),
        Err(_) => {
            warn!(
                target = "carpas::http",
                timeout_secs = settings.server.graceful_shutdown.as_secs(),
                "graceful shutdown timed out"
            );
            Ok(())
        }
    }
}
