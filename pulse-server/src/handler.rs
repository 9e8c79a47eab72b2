//! Gateway listener: framed JSON events over TCP/TLS.
//!
//! Each connection carries one user's event stream. Frames are a 4-byte
//! big-endian length followed by a JSON body: an `InboundEvent` inbound,
//! an array of `Prompt`s outbound. Events on a connection are processed
//! in order, which gives the per-user serialization the engine relies on.

use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;

use pulse_core::{InboundEvent, Prompt, PulseError, PulseResult};

use crate::config::ServerConfig;
use crate::engine::FormEngine;

/// PULSE gateway server.
pub struct Server {
    config: ServerConfig,
    engine: Arc<FormEngine>,
    tls_acceptor: Option<TlsAcceptor>,
}

impl Server {
    /// Create a new server.
    pub fn new(config: ServerConfig, engine: FormEngine) -> PulseResult<Self> {
        let tls_acceptor = if let Some(ref tls_config) = config.tls {
            Some(Self::create_tls_acceptor(tls_config)?)
        } else {
            None
        };

        Ok(Self {
            config,
            engine: Arc::new(engine),
            tls_acceptor,
        })
    }

    /// Create TLS acceptor from config.
    fn create_tls_acceptor(tls_config: &crate::config::TlsConfig) -> PulseResult<TlsAcceptor> {
        use rustls_pemfile::{certs, private_key};
        use std::fs::File;
        use std::io::BufReader;

        let cert_file = File::open(&tls_config.cert_path)
            .map_err(|e| PulseError::Transport(format!("Failed to open cert: {}", e)))?;
        let key_file = File::open(&tls_config.key_path)
            .map_err(|e| PulseError::Transport(format!("Failed to open key: {}", e)))?;

        let certs: Vec<_> = certs(&mut BufReader::new(cert_file))
            .filter_map(|r| r.ok())
            .collect();

        let key = private_key(&mut BufReader::new(key_file))
            .map_err(|e| PulseError::Transport(format!("Failed to read key: {}", e)))?
            .ok_or_else(|| PulseError::Transport("No private key found".to_string()))?;

        let config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(|e| PulseError::Transport(format!("TLS config error: {}", e)))?;

        Ok(TlsAcceptor::from(Arc::new(config)))
    }

    /// Run the server.
    pub async fn run(self) -> PulseResult<()> {
        let listener = TcpListener::bind(&self.config.bind_addr)
            .await
            .map_err(|e| PulseError::Transport(format!("Failed to bind: {}", e)))?;

        tracing::info!("PULSE gateway listening on {}", self.config.bind_addr);

        if self.config.session_ttl.is_some() {
            let sessions = self.engine.sessions().clone();
            let sweep_interval = self.config.sweep_interval;
            tokio::spawn(async move {
                let mut tick = tokio::time::interval(sweep_interval);
                loop {
                    tick.tick().await;
                    let swept = sessions.purge_expired().await;
                    if swept > 0 {
                        tracing::info!(swept, "expired sessions evicted");
                    }
                }
            });
        }

        loop {
            let (stream, addr) = listener
                .accept()
                .await
                .map_err(|e| PulseError::Transport(format!("Accept failed: {}", e)))?;

            tracing::debug!("Connection from {}", addr);

            let engine = Arc::clone(&self.engine);
            let config = self.config.clone();
            let tls_acceptor = self.tls_acceptor.clone();

            tokio::spawn(async move {
                if let Err(e) = Self::handle_connection(stream, config, engine, tls_acceptor).await
                {
                    tracing::error!("Connection error from {}: {}", addr, e);
                }
            });
        }
    }

    /// Handle a single connection.
    async fn handle_connection(
        stream: TcpStream,
        config: ServerConfig,
        engine: Arc<FormEngine>,
        tls_acceptor: Option<TlsAcceptor>,
    ) -> PulseResult<()> {
        if let Some(acceptor) = tls_acceptor {
            let tls_stream = acceptor
                .accept(stream)
                .await
                .map_err(|e| PulseError::Transport(format!("TLS handshake failed: {}", e)))?;
            Self::handle_stream(tls_stream, config, engine).await
        } else {
            Self::handle_stream(stream, config, engine).await
        }
    }

    /// Handle one event stream.
    async fn handle_stream<S>(
        mut stream: S,
        config: ServerConfig,
        engine: Arc<FormEngine>,
    ) -> PulseResult<()>
    where
        S: AsyncReadExt + AsyncWriteExt + Unpin,
    {
        let mut len_buf = [0u8; 4];

        loop {
            match stream.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    tracing::debug!("Client disconnected");
                    break;
                }
                Err(e) => return Err(PulseError::Transport(format!("Read error: {}", e))),
            }

            let len = u32::from_be_bytes(len_buf) as usize;

            if len > config.max_frame_size {
                return Err(PulseError::Protocol(format!(
                    "Frame too large: {} > {}",
                    len, config.max_frame_size
                )));
            }

            let mut frame = vec![0u8; len];
            stream
                .read_exact(&mut frame)
                .await
                .map_err(|e| PulseError::Transport(format!("Read error: {}", e)))?;

            let event: InboundEvent = serde_json::from_slice(&frame)?;
            tracing::debug!(user = %event.user, "event received");

            let prompts = engine.handle(event).await;
            send_prompts(&mut stream, &prompts).await?;
        }

        Ok(())
    }
}

/// Send the reply frame for one event: a JSON array of prompts.
async fn send_prompts<S>(stream: &mut S, prompts: &[Prompt]) -> PulseResult<()>
where
    S: AsyncWriteExt + Unpin,
{
    let json = serde_json::to_vec(prompts)?;
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

    Ok(())
}
