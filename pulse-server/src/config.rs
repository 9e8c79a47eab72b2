//! Server configuration for the PULSE gateway.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// TLS configuration (plaintext when absent).
    pub tls: Option<TlsConfig>,
    /// Max inbound frame size in bytes.
    pub max_frame_size: usize,
    /// Evict sessions idle longer than this. `None` keeps abandoned
    /// sessions forever, matching the original behavior.
    pub session_ttl: Option<Duration>,
    /// How often the expiry sweep runs when a TTL is set.
    pub sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7100".parse().unwrap(),
            tls: None,
            max_frame_size: 64 * 1024,
            session_ttl: None,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address.
    pub fn with_addr(addr: impl Into<SocketAddr>) -> Self {
        Self {
            bind_addr: addr.into(),
            ..Default::default()
        }
    }

    /// Enable TLS with certificate and key files.
    pub fn with_tls(mut self, cert_path: PathBuf, key_path: PathBuf) -> Self {
        self.tls = Some(TlsConfig {
            cert_path,
            key_path,
        });
        self
    }

    /// Evict sessions idle longer than `ttl`.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = Some(ttl);
        self
    }
}

/// TLS configuration.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,
    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}
