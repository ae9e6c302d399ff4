use events::EventPublisher;
use log::*;
use service::{config::Config, logging::Logger, AppState};
use sse::SseDomainEventHandler;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting booking platform [{:?}] with API version {}",
        config.runtime_env(),
        config.api_version()
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(config, &db);
    let sse_handler = SseDomainEventHandler::new(app_state.sse_manager.clone());
    let app_state =
        app_state.with_event_publisher(EventPublisher::new().with_handler(Arc::new(sse_handler)));

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped with an error: {e}");
        std::process::exit(1);
    }
}
