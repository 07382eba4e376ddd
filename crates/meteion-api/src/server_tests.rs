use super::*;
use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::net::TcpStream;

fn server() -> ControlServer {
    let registry = Arc::new(ActionRegistry::new());
    registry.register_fn("echo", |payload: &str| Ok(format!("echo:{}", payload)));
    ControlServer::new(ControlConfig::default(), registry)
}

fn counting_callback() -> (ExceptionCallback, Arc<AtomicUsize>, Arc<Mutex<Vec<String>>>) {
    let count = Arc::new(AtomicUsize::new(0));
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let count_clone = count.clone();
    let kinds_clone = kinds.clone();
    let callback: ExceptionCallback = Arc::new(move |err: &ServerError, _port: u16| {
        count_clone.fetch_add(1, Ordering::SeqCst);
        kinds_clone.lock().push(err.kind().to_string());
    });
    (callback, count, kinds)
}

#[test]
fn test_control_config_default() {
    let config = ControlConfig::default();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.request_timeout, Duration::from_secs(10));
    assert_eq!(config.max_body_bytes, 65536);
}

#[test]
fn test_server_state_display() {
    assert_eq!(ServerState::Stopped.to_string(), "stopped");
    assert_eq!(ServerState::Listening.to_string(), "listening");
}

#[tokio::test]
async fn test_start_serve_stop() {
    let server = server();
    assert_eq!(server.state(), ServerState::Stopped);

    let addr = server.start(0).await.unwrap();
    assert_eq!(server.state(), ServerState::Listening);
    assert_eq!(server.local_addr(), Some(addr));

    let body = reqwest::Client::new()
        .post(format!("http://{}/echo", addr))
        .body("ping")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "echo:ping");

    assert!(server.stop().await);
    assert_eq!(server.state(), ServerState::Stopped);
    assert!(server.local_addr().is_none());
    assert!(reqwest::get(format!("http://{}/health", addr)).await.is_err());
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let server = server();
    assert!(!server.stop().await);

    server.start(0).await.unwrap();
    assert!(server.stop().await);
    assert!(!server.stop().await);
}

#[tokio::test]
async fn test_double_start_keeps_listener() {
    let server = server();
    let first = server.start(0).await.unwrap();
    let second = server.start(0).await.unwrap();
    assert_eq!(first, second);
    server.stop().await;
}

#[tokio::test]
async fn test_port_in_use_reports_once() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let server = server();
    let (callback, count, kinds) = counting_callback();
    server.on_exception(callback);

    assert!(server.start(port).await.is_none());
    assert_eq!(server.state(), ServerState::Stopped);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(*kinds.lock(), vec!["TransportBindFailure".to_string()]);
}

#[tokio::test]
async fn test_stop_detaches_callback() {
    let server = server();
    let (callback, count, _) = counting_callback();
    server.on_exception(callback);
    assert!(server.has_exception_callback());

    server.stop().await;
    assert!(!server.has_exception_callback());

    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();
    assert!(server.start(port).await.is_none());
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_restart_after_stop() {
    let server = server();
    server.start(0).await.unwrap();
    server.stop().await;

    let addr = server.start(0).await.unwrap();
    let status = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .status();
    assert!(status.is_success());
    server.stop().await;
}

/// Fails the first `failures` accepts, then hands out real connections.
struct FlakyAcceptor {
    inner: TcpListener,
    failures: usize,
}

impl Acceptor for FlakyAcceptor {
    type Io = TcpStream;

    fn try_accept(&mut self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        async move {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::other("too many open files"));
            }
            self.inner.accept().await
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }
}

#[tokio::test]
async fn test_accept_failure_reaches_callback() {
    let inner = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = server();
    let (callback, count, kinds) = counting_callback();
    server.on_exception(callback);

    let addr = server
        .start_with(FlakyAcceptor { inner, failures: 1 }, 0)
        .await
        .unwrap();

    // The listener backs off and keeps serving.
    let status = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .status();
    assert!(status.is_success());

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(*kinds.lock(), vec!["TransportAcceptFailure".to_string()]);
    assert_eq!(server.state(), ServerState::Listening);
    server.stop().await;
}
