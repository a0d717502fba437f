//! `ParlorServer` builder and accept loop.
//!
//! This is the entry point for running a Parlor server. It ties the
//! layers together: store → services → broadcast listener → transport.

use std::net::SocketAddr;
use std::sync::Arc;

use parlor_store::{MemoryStore, RedisStore, StateStore};
use parlor_transport::{Transport, WebSocketTransport};
use tokio::task::JoinHandle;

use crate::connection::handle_connection;
use crate::{Dispatcher, ParlorError, ServerConfig, Services, StoreUrl, health};

/// Builder for configuring and starting a Parlor server.
///
/// # Example
///
/// ```rust,ignore
/// let server = ParlorServer::builder()
///     .config(ServerConfig::from_env()?)
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ParlorServerBuilder {
    config: ServerConfig,
    store: Option<Arc<dyn StateStore>>,
}

impl ParlorServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            store: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address the WebSocket listener binds to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind = addr.to_string();
        self
    }

    /// Serves `/health` on `addr`.
    pub fn health_bind(mut self, addr: &str) -> Self {
        self.config.health_bind = Some(addr.to_string());
        self
    }

    /// Uses an already-open store instead of opening `config.store`.
    pub fn store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Opens the store, starts the broadcast listener and binds the
    /// listeners.
    pub async fn build(self) -> Result<ParlorServer, ParlorError> {
        let store = match self.store {
            Some(store) => store,
            None => open_store(&self.config.store).await?,
        };
        let transport = WebSocketTransport::bind(&self.config.bind).await?;
        let health = match &self.config.health_bind {
            Some(addr) => Some(health::spawn(addr).await?),
            None => None,
        };

        let services = Arc::new(Services::new(store, self.config));
        let listener = services.broadcaster().listen().await?;

        Ok(ParlorServer {
            transport,
            services,
            dispatcher: Arc::new(Dispatcher::new()),
            listener,
            health,
        })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn open_store(url: &StoreUrl) -> Result<Arc<dyn StateStore>, ParlorError> {
    Ok(match url {
        StoreUrl::Memory => {
            tracing::info!("using in-process store");
            Arc::new(MemoryStore::new())
        }
        StoreUrl::Redis(url) => {
            let store = RedisStore::connect(url).await?;
            tracing::info!("connected to redis");
            Arc::new(store)
        }
    })
}

/// A bound Parlor server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ParlorServer {
    transport: WebSocketTransport,
    services: Arc<Services>,
    dispatcher: Arc<Dispatcher>,
    listener: JoinHandle<()>,
    health: Option<(JoinHandle<()>, SocketAddr)>,
}

impl ParlorServer {
    /// Creates a new builder.
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }

    /// Returns the local address the WebSocket listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the address `/health` is served on, if enabled.
    pub fn health_addr(&self) -> Option<SocketAddr> {
        self.health.as_ref().map(|(_, addr)| *addr)
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Runs the accept loop.
    ///
    /// Spawns one task per accepted connection. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), ParlorError> {
        tracing::info!(addr = ?self.local_addr().ok(), "parlor server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let services = Arc::clone(&self.services);
                    let dispatcher = Arc::clone(&self.dispatcher);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, services, dispatcher).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

impl Drop for ParlorServer {
    fn drop(&mut self) {
        self.listener.abort();
        if let Some((handle, _)) = &self.health {
            handle.abort();
        }
    }
}
