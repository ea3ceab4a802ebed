pub mod backend;
pub mod config;
pub mod handler;
pub mod message;
pub mod net;
pub mod registry;
pub mod sales;
pub mod service;
pub mod subscription;
pub mod transport;
pub mod types;
pub mod ui;

use std::sync::Arc;

use backend::BackendService;
use config::ServerConfig;
use handler::CommandHandler;
use net::server::run_control_server;
use service::WebPushService;
use transport::{LoggingTransport, PushTransport};

/// Builds the services from the configuration
pub fn build_handler(config: &ServerConfig, transport: Arc<dyn PushTransport>) -> Arc<CommandHandler> {
    let push = Arc::new(WebPushService::new(
        config.vapid.clone(),
        config.push.clone(),
        transport,
    ));
    let backend = Arc::new(BackendService::new(config.backend.clone()));
    Arc::new(CommandHandler::new(push, backend))
}

/// Starts the relay with the logging transport and serves control clients
pub async fn init(config: ServerConfig) -> std::io::Result<()> {
    let handler = build_handler(&config, Arc::new(LoggingTransport));
    run_control_server(&config.addr, handler).await
}
