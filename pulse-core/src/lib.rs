//! # pulse-core
//!
//! Core library for PULSE, a conversational price-observation collector.
//!
//! This crate provides the form state machine, the step validators, the
//! category catalog, gateway message types, and the session/report data
//! model shared by the server and client crates.

pub mod catalog;
pub mod error;
pub mod message;
pub mod report;
pub mod session;
pub mod state;
pub mod validate;

pub use catalog::{IndexSlug, LOCATION_LABELS, SKIP_PHOTO_LABEL};
pub use error::{PulseError, PulseResult, ValidationFailure};
pub use message::{Command, InboundEvent, Keyboard, Prompt, UserId};
pub use report::{Submission, Volunteer};
pub use session::{DraftReport, FormSession};
pub use state::FormState;
