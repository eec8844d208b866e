use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, http::StatusCode};
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use garoon_rescheduler::{
    create_router,
    services::{
        commands::CommandHandler,
        follow_up::spawn_follow_up_worker,
        interaction::{system_clock, Rescheduler},
    },
    AppState, Config, GaroonClient, Groupware, SlackClient, SlackVerifier,
};

// Error handler
async fn handle_error(error: BoxError) -> (StatusCode, String) {
    if error.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            "Request took too long".to_string(),
        )
    } else if error.is::<tower::load_shed::error::Overloaded>() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service is overloaded".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", error),
        )
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received interrupt signal, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing for logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            process::exit(1);
        }
    };

    #[cfg(feature = "sentry-monitoring")]
    let _sentry = sentry::init(sentry::ClientOptions {
        release: sentry::release_name!(),
        ..Default::default()
    });

    let garoon = match &config.garoon_api_endpoint {
        Some(endpoint) => {
            GaroonClient::with_endpoint(endpoint.as_str(), &config.garoon_user, &config.garoon_password)
        }
        None => GaroonClient::new(
            &config.garoon_subdomain,
            &config.garoon_user,
            &config.garoon_password,
        ),
    };
    info!("Using Garoon API at {}", garoon.endpoint());
    let groupware: Arc<dyn Groupware> = Arc::new(garoon);

    let slack = match &config.slack_api_endpoint {
        Some(endpoint) => SlackClient::with_endpoint(endpoint.as_str(), &config.slack_bot_token),
        None => SlackClient::new(&config.slack_bot_token),
    };

    if config.slack_signing_secret.is_some() {
        info!("Request signature verification enabled");
    } else {
        warn!("No signing secret provided - only the verification token is checked");
    }
    if !config.excluded_room_codes.is_empty() {
        info!(
            "Excluding {} facility code(s) from substitution",
            config.excluded_room_codes.len()
        );
    }

    let (follow_ups, worker) = spawn_follow_up_worker(Arc::new(slack));

    // Create shared application state
    let app_state = Arc::new(AppState {
        rescheduler: Arc::new(Rescheduler::new(
            Arc::clone(&groupware),
            config.slack_owner_id.clone(),
            config.excluded_room_codes.clone(),
        )),
        commands: Arc::new(CommandHandler::new(
            groupware,
            config.slack_bot_id.clone(),
            config.slack_channel_id.clone(),
            system_clock(),
        )),
        follow_ups,
        verifier: SlackVerifier::new(
            config.slack_verification_token.clone(),
            config.slack_signing_secret.clone(),
        ),
    });

    let app = create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .load_shed()
            .concurrency_limit(64)
            .timeout(Duration::from_secs(10))
            .layer(TraceLayer::new_for_http()),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind to {}: {}", addr, err);
            process::exit(1);
        }
    };
    info!("Server listening on {}", addr);

    // Start server with graceful shutdown
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }

    // The router held the last sender; the worker exits after its in-flight jobs
    info!("Waiting for pending follow-ups");
    if let Err(err) = worker.await {
        error!("Follow-up worker did not shut down cleanly: {}", err);
    }

    info!("Server has been gracefully shut down");
}
