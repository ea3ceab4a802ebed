use tokio::net::TcpListener;
use std::sync::Arc;
use log::{info, warn};

use crate::pushrelay::handler::CommandHandler;
use crate::pushrelay::net::connection::Session;

/// Binds the control listener and serves it until accept fails
pub async fn run_control_server(addr: &str, handler: Arc<CommandHandler>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Control server running on {}", listener.local_addr()?);
    serve(listener, handler).await
}

pub async fn serve(listener: TcpListener, handler: Arc<CommandHandler>) -> std::io::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY for connection from {}: {}", addr, e);
        }
        info!("New connection from {}", addr);

        // The session keeps itself alive through its read task.
        let _session = Session::new(stream, handler.clone());
    }
}
