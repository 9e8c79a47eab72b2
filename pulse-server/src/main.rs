//! PULSE gateway server - conversational price-observation collection.

mod config;
mod engine;
mod handler;
mod repository;
mod store;

pub use config::{ServerConfig, TlsConfig};
pub use engine::FormEngine;
pub use handler::Server;
pub use repository::{MemoryRepository, SubmissionRepository};
pub use store::SessionStore;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use pulse_core::PulseResult;

#[tokio::main]
async fn main() -> PulseResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Parse command line args
    let bind_addr: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:7100".to_string())
        .parse()
        .expect("Invalid bind address");

    // Abandoned forms are dropped after a day.
    let config = ServerConfig::with_addr(bind_addr)
        .with_session_ttl(Duration::from_secs(24 * 60 * 60));

    let sessions = SessionStore::new(config.session_ttl);
    let repository = Arc::new(MemoryRepository::new());
    let engine = FormEngine::new(sessions, repository);

    tracing::info!("Starting PULSE gateway on {}", bind_addr);

    let server = Server::new(config, engine)?;
    server.run().await
}
