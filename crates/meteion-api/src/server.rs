//! Control server lifecycle.
//!
//! `Stopped -> Starting -> Listening -> Stopping -> Stopped`. Transport
//! failures (bind and accept) never escape `start`; they go to the exception
//! callback.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use meteion_core::ActionRegistry;

use crate::error::ServerError;
use crate::listener::{Acceptor, ReportingListener};
use crate::routes::{create_router, RouterState};

/// How long `stop` waits for in-flight exchanges before aborting.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Called with the error and the port it concerns.
pub type ExceptionCallback = Arc<dyn Fn(&ServerError, u16) + Send + Sync>;

/// Control server configuration.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    pub host: String,
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

impl ControlConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            request_timeout: Duration::from_secs(10),
            max_body_bytes: 64 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Starting,
    Listening,
    Stopping,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Listening => "listening",
            Self::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

struct Running {
    addr: SocketAddr,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// HTTP control server.
pub struct ControlServer {
    config: ControlConfig,
    registry: Arc<ActionRegistry>,
    state: Arc<RwLock<ServerState>>,
    callback: Arc<RwLock<Option<ExceptionCallback>>>,
    running: Mutex<Option<Running>>,
    // Serializes start/stop across their await points.
    lifecycle: tokio::sync::Mutex<()>,
}

impl ControlServer {
    pub fn new(config: ControlConfig, registry: Arc<ActionRegistry>) -> Self {
        Self {
            config,
            registry,
            state: Arc::new(RwLock::new(ServerState::Stopped)),
            callback: Arc::new(RwLock::new(None)),
            running: Mutex::new(None),
            lifecycle: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    pub fn state(&self) -> ServerState {
        *self.state.read()
    }

    /// Address of the live listener.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running
            .lock()
            .as_ref()
            .filter(|r| !r.task.is_finished())
            .map(|r| r.addr)
    }

    /// Attach the exception callback, replacing any previous one.
    pub fn on_exception(&self, callback: ExceptionCallback) {
        *self.callback.write() = Some(callback);
    }

    pub fn has_exception_callback(&self) -> bool {
        self.callback.read().is_some()
    }

    /// Bind `host:port` and serve in the background.
    ///
    /// Returns the bound address, or `None` after reporting a bind failure.
    /// Port 0 binds an ephemeral port. Starting a listening server is a
    /// no-op that returns the current address.
    pub async fn start(&self, port: u16) -> Option<SocketAddr> {
        let _lifecycle = self.lifecycle.lock().await;

        {
            let mut running = self.running.lock();
            if let Some(current) = running.as_ref() {
                if !current.task.is_finished() {
                    warn!(addr = %current.addr, "Control server already listening");
                    return Some(current.addr);
                }
                // The serve loop died and was already reported.
                running.take();
            }
        }

        *self.state.write() = ServerState::Starting;
        let addr = format!("{}:{}", self.config.host, port);
        match TcpListener::bind(&addr).await {
            Ok(listener) => self.serve(listener, port),
            Err(source) => {
                *self.state.write() = ServerState::Stopped;
                report(&self.callback, &ServerError::Bind { addr, source }, port);
                None
            }
        }
    }

    /// Serve connections from `acceptor` instead of a freshly bound socket.
    #[cfg(test)]
    pub(crate) async fn start_with<A: Acceptor>(&self, acceptor: A, port: u16) -> Option<SocketAddr> {
        let _lifecycle = self.lifecycle.lock().await;
        *self.state.write() = ServerState::Starting;
        self.serve(acceptor, port)
    }

    fn serve<A: Acceptor>(&self, acceptor: A, port: u16) -> Option<SocketAddr> {
        let local = match acceptor.local_addr() {
            Ok(local) => local,
            Err(source) => {
                *self.state.write() = ServerState::Stopped;
                let addr = format!("{}:{}", self.config.host, port);
                report(&self.callback, &ServerError::Bind { addr, source }, port);
                return None;
            }
        };

        let listener = ReportingListener::new(acceptor, local.port(), self.callback.clone());
        let router = create_router(
            RouterState::new(self.registry.clone(), self.state.clone()),
            &self.config,
        );
        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();
        let state = self.state.clone();
        let callback = self.callback.clone();

        let task = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await;
            if let Err(e) = result {
                *state.write() = ServerState::Stopped;
                report(&callback, &ServerError::Serve(e), local.port());
            }
        });

        *self.running.lock() = Some(Running {
            addr: local,
            cancel,
            task,
        });
        *self.state.write() = ServerState::Listening;
        info!("Control server listening on {}", local);
        Some(local)
    }

    /// Release the socket and detach the exception callback.
    ///
    /// Returns `false` if the server was not running.
    pub async fn stop(&self) -> bool {
        let _lifecycle = self.lifecycle.lock().await;
        self.callback.write().take();

        let Some(Running {
            addr,
            cancel,
            mut task,
        }) = self.running.lock().take()
        else {
            debug!("Control server not running");
            return false;
        };

        *self.state.write() = ServerState::Stopping;
        cancel.cancel();
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
            warn!(%addr, "Control server did not drain in time, aborting");
            task.abort();
        }

        *self.state.write() = ServerState::Stopped;
        info!(%addr, "Control server stopped");
        true
    }
}

/// Hand `err` to the callback, or log it if none is attached.
pub(crate) fn report(callback: &RwLock<Option<ExceptionCallback>>, err: &ServerError, port: u16) {
    let callback = callback.read().clone();
    match callback {
        Some(callback) => callback(err, port),
        None => error!(port, kind = err.kind(), "{}", err),
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
