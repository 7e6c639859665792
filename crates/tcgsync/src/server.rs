//! `TcgsyncServer` builder and server loop.
//!
//! This is the entry point for running a tcgsync server. It ties together
//! all the layers: transport → protocol → rooms.

use std::sync::Arc;

use tcgsync_protocol::{Codec, JsonCodec};
use tcgsync_room::RoomRegistry;
use tcgsync_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{DirectorySounds, ServerConfig, SoundLibrary, TcgsyncError};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The registry
/// sits behind a `Mutex` because joins from different connections may
/// create rooms at the same time; it is only held for map operations.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) codec: C,
    pub(crate) sounds: Box<dyn SoundLibrary>,
    pub(crate) sound_url_prefix: String,
}

/// Builder for configuring and starting a tcgsync server.
///
/// # Example
///
/// ```rust,ignore
/// use tcgsync::prelude::*;
///
/// let server = TcgsyncServer::builder()
///     .bind("127.0.0.1:5000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct TcgsyncServerBuilder {
    config: ServerConfig,
    bind_addr: Option<String>,
    sounds: Option<Box<dyn SoundLibrary>>,
}

impl TcgsyncServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            bind_addr: None,
            sounds: None,
        }
    }

    /// Sets the address to bind the server to. Takes precedence over the
    /// address in [`config`](Self::config), whichever is called first.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = Some(addr.to_string());
        self
    }

    /// Replaces the whole server configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `library` for victory sounds instead of listing
    /// `config.sounds_dir`.
    pub fn sounds(mut self, library: impl SoundLibrary) -> Self {
        self.sounds = Some(Box::new(library));
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<TcgsyncServer<JsonCodec>, TcgsyncError> {
        let Self {
            config,
            bind_addr,
            sounds,
        } = self;
        let bind_addr = bind_addr.unwrap_or_else(|| config.bind_addr.clone());

        let transport = WebSocketTransport::bind(&bind_addr).await?;
        let sounds = sounds.unwrap_or_else(|| {
            Box::new(DirectorySounds::new(config.sounds_dir.clone()))
        });

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomRegistry::new(config.room.clone())),
            codec: JsonCodec,
            sounds,
            sound_url_prefix: config.sound_url_prefix.clone(),
        });

        Ok(TcgsyncServer { transport, state })
    }
}

impl Default for TcgsyncServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound tcgsync server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TcgsyncServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl TcgsyncServer {
    /// Creates a new builder.
    pub fn builder() -> TcgsyncServerBuilder {
        TcgsyncServerBuilder::new()
    }
}

impl<C: Codec> TcgsyncServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until the
    /// process is terminated.
    pub async fn run(self) -> Result<(), TcgsyncError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes, then stops every
    /// room.
    ///
    /// Connections that are already open stay open, but any request that
    /// reaches a room after this point is answered with a 503 `error`.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), TcgsyncError> {
        match self.local_addr() {
            Ok(addr) => tracing::info!(%addr, "tcgsync server running"),
            Err(_) => tracing::info!("tcgsync server running"),
        }

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        // Release the registry before waiting on the rooms.
        let rooms = self.state.rooms.lock().await.close();
        for room in rooms {
            if let Err(e) = room.shutdown().await {
                tracing::debug!(error = %e, "room already stopped");
            }
        }
        tracing::info!("tcgsync server stopped");
        Ok(())
    }
}
