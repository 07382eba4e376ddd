//! Listener that reports accept failures through the exception callback.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

use crate::error::ServerError;
use crate::server::{report, ExceptionCallback};

/// Pause after a reported accept failure, e.g. while out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// Source of inbound connections.
pub(crate) trait Acceptor: Send + 'static {
    type Io: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn try_accept(&mut self) -> impl Future<Output = io::Result<(Self::Io, SocketAddr)>> + Send;

    fn local_addr(&self) -> io::Result<SocketAddr>;
}

impl Acceptor for TcpListener {
    type Io = TcpStream;

    fn try_accept(&mut self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        TcpListener::accept(self)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpListener::local_addr(self)
    }
}

pub(crate) struct ReportingListener<A> {
    inner: A,
    port: u16,
    callback: Arc<RwLock<Option<ExceptionCallback>>>,
}

impl<A: Acceptor> ReportingListener<A> {
    pub(crate) fn new(inner: A, port: u16, callback: Arc<RwLock<Option<ExceptionCallback>>>) -> Self {
        Self {
            inner,
            port,
            callback,
        }
    }
}

impl<A: Acceptor> axum::serve::Listener for ReportingListener<A> {
    type Io = A::Io;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        loop {
            match self.inner.try_accept().await {
                Ok(conn) => return conn,
                // Failures of a single peer do not concern the listener.
                Err(e) if is_connection_error(&e) => {
                    debug!(error = %e, "Connection dropped during accept");
                }
                Err(e) => {
                    report(&self.callback, &ServerError::Accept(e), self.port);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }

    fn local_addr(&self) -> io::Result<Self::Addr> {
        self.inner.local_addr()
    }
}

fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}
