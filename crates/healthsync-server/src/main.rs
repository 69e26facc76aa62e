mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use healthsync_api::{AppState, AppStateInner};
use healthsync_crypto::EncryptionKey;
use healthsync_db::Database;
use healthsync_records::ProtectedRecordStore;
use healthsync_scheduler::{
    DeliveryContext, Dispatcher, DispatcherConfig, HttpPushNotifier, LogNotifier, Notifier,
    ReminderQuery, SchedulerDriver, SystemClock,
};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `healthsync keygen [passphrase]` prints a key and exits
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("keygen") {
        let key = match args.get(1) {
            Some(passphrase) => EncryptionKey::from_passphrase(passphrase),
            None => EncryptionKey::generate(),
        };
        println!("HEALTHSYNC_ENCRYPTION_KEY={}", key.to_config_value());
        return Ok(());
    }

    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "healthsync=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Database::open(&config.db_path)?;
    let records = ProtectedRecordStore::new(Arc::new(db.clone()), &config.encryption_key);

    // Reminder scheduler
    let notifier: Arc<dyn Notifier> = match &config.push_url {
        Some(url) => {
            info!("Delivering reminders via {}", url);
            Arc::new(HttpPushNotifier::new(
                url.clone(),
                config.push_token.clone(),
                config.call_timeout,
            )?)
        }
        None => {
            warn!("HEALTHSYNC_PUSH_URL is unset, reminders will only be logged");
            Arc::new(LogNotifier)
        }
    };
    let delivery = DeliveryContext {
        store: Arc::new(db.clone()),
        notifier,
        call_timeout: config.call_timeout,
    };
    let dispatcher = Dispatcher::new(
        ReminderQuery::new(Arc::new(db.clone())),
        delivery,
        DispatcherConfig {
            call_timeout: config.call_timeout,
            max_in_flight: config.max_in_flight,
        },
    );
    let cancel = CancellationToken::new();
    let scheduler = SchedulerDriver::new(Arc::new(dispatcher), Arc::new(SystemClock))
        .start(config.tick_interval, cancel.clone());

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner {
        db,
        records,
        jwt_secret: config.jwt_secret,
    });

    let app = healthsync_api::router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("HealthSync server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop ticking. In-flight deliveries are detached and may be cut short here.
    cancel.cancel();
    scheduler.await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
