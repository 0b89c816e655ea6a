// src/session.rs
//! Per-connection read, decode and publish loop

use crate::{
    config::GatewayConfig,
    display,
    error::GatewayError,
    publish::{publish_to_all, Publisher},
    tracker::{decode, Frame},
};
use log::{debug, info, warn};
use std::{net::SocketAddr, sync::Arc};
use tokio::io::{AsyncRead, AsyncReadExt};

/// How a session finished
#[derive(Debug)]
pub enum SessionEnd {
    /// Peer closed the connection
    Closed,
    /// Reading from the socket failed
    Failed(GatewayError),
}

/// Counters for one connection
#[derive(Debug, Default)]
pub struct SessionStats {
    pub frames: usize,
    pub fixes: usize,
    pub not_fixes: usize,
    pub decode_errors: usize,
    pub publish_attempts: usize,
    pub publish_failures: usize,
    pub end: Option<SessionEnd>,
}

/// Handles one tracker connection for its whole lifetime
pub struct Session {
    peer: SocketAddr,
    config: Arc<GatewayConfig>,
    publisher: Arc<dyn Publisher>,
}

impl Session {
    pub fn new(peer: SocketAddr, config: Arc<GatewayConfig>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            peer,
            config,
            publisher,
        }
    }

    /// Read frames until the peer closes or the socket fails
    pub async fn run<S>(&self, mut stream: S) -> SessionStats
    where
        S: AsyncRead + Unpin,
    {
        let mut stats = SessionStats::default();
        let mut buffer = vec![0u8; self.config.read_buffer_size.max(1)];

        loop {
            match stream.read(&mut buffer).await {
                // With a non-empty buffer, tokio's read only returns 0 at EOF
                Ok(0) => {
                    info!("{} is disconnected", self.peer);
                    stats.end = Some(SessionEnd::Closed);
                    break;
                }
                Ok(n) => self.handle_frame(&buffer[..n], &mut stats).await,
                Err(e) => {
                    warn!("{} read failed, closing: {}", self.peer, e);
                    stats.end = Some(SessionEnd::Failed(GatewayError::Connection(format!(
                        "read from {} failed: {}",
                        self.peer, e
                    ))));
                    break;
                }
            }
        }

        stats
    }

    async fn handle_frame(&self, raw: &[u8], stats: &mut SessionStats) {
        stats.frames += 1;
        let decoded = decode(raw);
        display::print_frame(self.peer, raw, &decoded);

        match decoded {
            Ok(Frame::Fix(fix)) => {
                stats.fixes += 1;
                let results = publish_to_all(self.publisher.as_ref(), &self.config.sinks, &fix).await;
                for result in &results {
                    stats.publish_attempts += 1;
                    if let Err(e) = result {
                        stats.publish_failures += 1;
                        warn!("{}: {}", self.peer, e);
                    }
                    display::print_publish(self.peer, result);
                }
            }
            Ok(Frame::NotAFix(_)) => {
                stats.not_fixes += 1;
                debug!("{} sent {} bytes that are not a fix frame", self.peer, raw.len());
            }
            Err(e) => {
                stats.decode_errors += 1;
                warn!("{} sent an undecodable frame: {}", self.peer, e);
            }
        }
    }
}
