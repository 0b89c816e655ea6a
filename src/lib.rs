// src/lib.rs
//! TK-Star Gateway Library
//!
//! Accepts raw TCP connections from TK-Star GPS trackers, decodes their binary
//! BCD position frames and republishes every fix to the configured HTTP sinks.

pub mod config;
pub mod display;
pub mod error;
pub mod gateway;
pub mod publish;
pub mod session;
pub mod tracker;

// Re-export main types for convenience
pub use config::{GatewayConfig, SinkTarget};
pub use error::{DecodeError, GatewayError, PublishError, Result};
pub use gateway::Gateway;
pub use publish::{publish_to_all, HttpPublisher, PublishOutcome, Publisher};
pub use session::{Session, SessionEnd, SessionStats};
pub use tracker::{decode, Fix, Frame};
