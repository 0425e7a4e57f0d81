use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use car_sharing_api::application::notification_service::NotificationService;
use car_sharing_api::data::memory::InMemoryStore;
use car_sharing_api::domain::notification::NotificationSender;
use car_sharing_api::infrastructure::config::AppConfig;
use car_sharing_api::infrastructure::logging::init_logging;
use car_sharing_api::infrastructure::telegram::{LogNotificationSender, TelegramNotificationSender};
use car_sharing_api::presentation::handlers::AppState;
use car_sharing_api::presentation::middleware::{
    JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware,
};
use car_sharing_api::presentation::routes::{ROUTES_SUMMARY, configure};
use std::io;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

#[tokio::main]
#[instrument]
async fn main() -> io::Result<()> {
    init_logging("info");
    info!("Logging initialized successfully");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let sender: Arc<dyn NotificationSender> = match &config.telegram.bot_token {
        Some(token) => {
            let telegram = TelegramNotificationSender::new(&config.telegram.api_base, token)
                .map_err(io::Error::other)?;
            info!("Telegram notifications enabled");
            Arc::new(telegram)
        }
        None => {
            warn!("TELEGRAM_BOT_TOKEN not set, notifications will only be logged");
            Arc::new(LogNotificationSender)
        }
    };
    let notifications = Arc::new(NotificationService::new(
        sender,
        config.telegram.admin_chat_id.clone(),
    ));

    let store = Arc::new(InMemoryStore::new());
    let state = web::Data::new(AppState::new(
        store,
        notifications,
        config.jwt_secret.clone(),
        config.checkout_base_url.clone(),
    ));

    if let Some(seed) = &config.manager_seed {
        state
            .user_service
            .seed_manager(&seed.email, &seed.password)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to seed manager account");
                io::Error::other(e.to_string())
            })?;
    }

    let jwt_secret = config.jwt_secret.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(JwtAuthMiddleware::new(jwt_secret.clone()))
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(Cors::permissive())
            .configure(configure)
    });

    let bind_addr = format!("{}:{}", config.host, config.port);
    let server = server.bind((config.host.as_str(), config.port))?;
    info!(address = %bind_addr, routes = %ROUTES_SUMMARY, "Starting HTTP server");
    server.run().await
}
