// src/gateway.rs
//! TCP listener that hands every tracker connection to its own session task

use crate::{
    config::GatewayConfig,
    error::{GatewayError, Result},
    publish::{HttpPublisher, Publisher},
    session::{Session, SessionEnd},
};
use log::{error, info, warn};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{
    net::TcpListener,
    sync::{watch, Semaphore},
};

/// Accepts tracker connections and runs one session per connection
pub struct Gateway {
    config: Arc<GatewayConfig>,
    publisher: Arc<dyn Publisher>,
    shutdown: watch::Sender<bool>,
}

impl Gateway {
    /// Create a gateway publishing over HTTP
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let publisher = HttpPublisher::new(timeout)?;
        Ok(Self::with_publisher(config, Arc::new(publisher)))
    }

    /// Create a gateway with a custom publisher
    pub fn with_publisher(config: GatewayConfig, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            config: Arc::new(config),
            publisher,
            shutdown: watch::channel(false).0,
        }
    }

    /// Bind all interfaces on the configured port and serve until Ctrl+C
    pub async fn run(&self) -> Result<()> {
        self.config.validate()?;

        let address = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(address)
            .await
            .map_err(|e| GatewayError::Connection(format!("Failed to bind {}: {}", address, e)))?;

        info!("Listening on port {} ...", self.config.port);

        tokio::select! {
            result = self.serve(listener) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                Ok(())
            }
        }
    }

    /// Accept connections from an already bound listener until `stop` is called
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let permits = Arc::new(Semaphore::new(self.config.max_sessions.max(1)));
        let mut shutdown = self.shutdown.subscribe();

        while !*shutdown.borrow_and_update() {
            // Wait for a free slot before taking the next connection
            let permit = tokio::select! {
                permit = Arc::clone(&permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                _ = shutdown.changed() => break,
            };

            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        error!("Incoming TCP connection errored: {}", e);
                        continue;
                    }
                },
                _ = shutdown.changed() => break,
            };

            info!("Connected by {}", peer);

            let session = Session::new(peer, Arc::clone(&self.config), Arc::clone(&self.publisher));
            tokio::spawn(async move {
                let stats = session.run(stream).await;
                if let Some(SessionEnd::Failed(e)) = &stats.end {
                    warn!("{} session ended: {}", peer, e);
                }
                info!(
                    "{} closed after {} frames ({} fixes, {} not fixes, {} decode errors, {}/{} publishes failed)",
                    peer,
                    stats.frames,
                    stats.fixes,
                    stats.not_fixes,
                    stats.decode_errors,
                    stats.publish_failures,
                    stats.publish_attempts,
                );
                drop(permit);
            });
        }

        Ok(())
    }

    /// Stop accepting new connections; running sessions finish on their own
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }
}
