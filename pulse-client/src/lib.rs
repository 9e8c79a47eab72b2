//! PULSE client SDK - drives one volunteer's conversation with the gateway.
//!
//! # Example
//!
//! ```no_run
//! use pulse_client::PulseClient;
//! use pulse_core::UserId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = PulseClient::connect("127.0.0.1:7100", UserId(1), "Анна").await?;
//!
//!     let prompts = client.begin().await?;
//!     println!("{}", prompts[0].text);
//!
//!     Ok(())
//! }
//! ```

mod connection;

pub use connection::{Connection, ConnectionConfig};

use std::net::SocketAddr;

use pulse_core::{InboundEvent, Prompt, PulseError, PulseResult, UserId};

/// High-level PULSE client for a single volunteer.
pub struct PulseClient {
    connection: Connection,
    user: UserId,
    full_name: String,
}

impl PulseClient {
    /// Connect to a gateway (plaintext).
    pub async fn connect(
        addr: impl AsRef<str>,
        user: UserId,
        full_name: impl Into<String>,
    ) -> PulseResult<Self> {
        let addr: SocketAddr = addr
            .as_ref()
            .parse()
            .map_err(|e| PulseError::Transport(format!("Invalid address: {}", e)))?;

        let config = ConnectionConfig::plaintext(addr);
        let connection = Connection::connect(&config).await?;

        Ok(Self {
            connection,
            user,
            full_name: full_name.into(),
        })
    }

    /// Send `/start`: register the volunteer and receive the welcome text.
    pub async fn greet(&mut self) -> PulseResult<Vec<Prompt>> {
        let event = InboundEvent {
            user: self.user,
            full_name: Some(self.full_name.clone()),
            text: Some("/start".to_string()),
            photo: None,
        };
        self.connection.send_event(&event).await
    }

    /// Send `/submit`: begin (or restart) a form.
    pub async fn begin(&mut self) -> PulseResult<Vec<Prompt>> {
        self.send_text("/submit").await
    }

    /// Send a plain text answer for the current step.
    pub async fn send_text(&mut self, text: impl Into<String>) -> PulseResult<Vec<Prompt>> {
        let event = InboundEvent::text(self.user, text);
        self.connection.send_event(&event).await
    }

    /// Send photo evidence for the photo step.
    pub async fn send_photo(&mut self, file_id: impl Into<String>) -> PulseResult<Vec<Prompt>> {
        let event = InboundEvent::photo(self.user, file_id);
        self.connection.send_event(&event).await
    }
}
