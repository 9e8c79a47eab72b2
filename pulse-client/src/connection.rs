//! TCP/TLS connection to the PULSE gateway.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use rustls::pki_types::ServerName;

use pulse_core::{InboundEvent, Prompt, PulseError, PulseResult};

/// Client connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Gateway address.
    pub server_addr: SocketAddr,
    /// Server hostname for TLS (if different from IP).
    pub server_name: Option<String>,
    /// Whether to use TLS.
    pub use_tls: bool,
    /// Max reply frame size.
    pub max_frame_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:7100".parse().unwrap(),
            server_name: None,
            use_tls: false,
            max_frame_size: 64 * 1024,
        }
    }
}

impl ConnectionConfig {
    /// Create config for plaintext connection.
    pub fn plaintext(addr: SocketAddr) -> Self {
        Self {
            server_addr: addr,
            use_tls: false,
            ..Default::default()
        }
    }

    /// Create config for TLS connection.
    pub fn tls(addr: SocketAddr, server_name: impl Into<String>) -> Self {
        Self {
            server_addr: addr,
            server_name: Some(server_name.into()),
            use_tls: true,
            ..Default::default()
        }
    }
}

/// Connection to the PULSE gateway.
pub enum Connection {
    Tcp(TcpStream),
    Tls(tokio_rustls::client::TlsStream<TcpStream>),
}

impl Connection {
    /// Connect to the gateway.
    pub async fn connect(config: &ConnectionConfig) -> PulseResult<Self> {
        let stream = TcpStream::connect(&config.server_addr)
            .await
            .map_err(|e| PulseError::Transport(format!("Connection failed: {}", e)))?;

        tracing::debug!("Connected to {}", config.server_addr);

        if config.use_tls {
            let connector = Self::create_tls_connector()?;
            let server_name_str = config
                .server_name
                .clone()
                .unwrap_or_else(|| "localhost".to_string());
            let server_name: ServerName<'static> = server_name_str
                .try_into()
                .map_err(|_| PulseError::Transport("Invalid server name".to_string()))?;

            let tls_stream = connector
                .connect(server_name, stream)
                .await
                .map_err(|e| PulseError::Transport(format!("TLS handshake failed: {}", e)))?;

            Ok(Self::Tls(tls_stream))
        } else {
            Ok(Self::Tcp(stream))
        }
    }

    /// Create TLS connector with system roots.
    fn create_tls_connector() -> PulseResult<TlsConnector> {
        let root_store = rustls::RootCertStore::empty();
        // In production, load system certs or custom CA

        let config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Ok(TlsConnector::from(Arc::new(config)))
    }

    /// Send one event and receive the prompts it produced.
    pub async fn send_event(&mut self, event: &InboundEvent) -> PulseResult<Vec<Prompt>> {
        match self {
            Self::Tcp(stream) => Self::send_recv(stream, event).await,
            Self::Tls(stream) => Self::send_recv(stream, event).await,
        }
    }

    /// Send an event frame and read the reply frame on stream.
    async fn send_recv<S>(stream: &mut S, event: &InboundEvent) -> PulseResult<Vec<Prompt>>
    where
        S: AsyncReadExt + AsyncWriteExt + Unpin,
    {
        let json = serde_json::to_vec(event)?;
        let len = json.len() as u32;

        stream
            .write_all(&len.to_be_bytes())
            .await
            .map_err(|e| PulseError::Transport(format!("Write error: {}", e)))?;
        stream
            .write_all(&json)
            .await
            .map_err(|e| PulseError::Transport(format!("Write error: {}", e)))?;
        stream
            .flush()
            .await
            .map_err(|e| PulseError::Transport(format!("Flush error: {}", e)))?;

        let mut len_buf = [0u8; 4];
        stream
            .read_exact(&mut len_buf)
            .await
            .map_err(|e| PulseError::Transport(format!("Read error: {}", e)))?;
        let len = u32::from_be_bytes(len_buf) as usize;

        let mut frame = vec![0u8; len];
        stream
            .read_exact(&mut frame)
            .await
            .map_err(|e| PulseError::Transport(format!("Read error: {}", e)))?;

        let prompts: Vec<Prompt> = serde_json::from_slice(&frame)?;
        Ok(prompts)
    }
}
