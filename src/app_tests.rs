use super::*;
use std::io::{self, Write};

use meteion_api::ServerState;
use parking_lot::Mutex;

use crate::host::ConsoleHost;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn app_with(config: Config) -> (Meteion, SharedBuf) {
    let buf = SharedBuf::default();
    let host = Arc::new(ConsoleHost::with_writer(Box::new(buf.clone())));
    (Meteion::new(config, host.capabilities()).unwrap(), buf)
}

fn app() -> (Meteion, SharedBuf) {
    app_with(Config::default())
}

#[tokio::test]
async fn test_builtin_command_reaches_host() {
    let (app, buf) = app();
    assert_eq!(app.do_action("command", "/who"), "Executed");
    assert_eq!(String::from_utf8(buf.0.lock().clone()).unwrap(), "/who\n");

    assert_eq!(
        app.do_action("COMMAND", "who"),
        "DoTextCommandWrong(InvalidCommand):who"
    );
}

#[tokio::test]
async fn test_waymark_alias_pair() {
    let (app, _) = app();
    assert_eq!(app.do_action("waymark", "[1, 2]"), "Placed 2 waymarks");
    assert_eq!(app.do_action("place", "[1]"), "Placed 1 waymarks");
    assert!(app.do_action("place", "nope").starts_with("DoActionWrong(HostError):"));
}

#[tokio::test]
async fn test_set_and_clear_actions() {
    let (app, _) = app();
    app.set_action(
        "Ping",
        Arc::new(|_: &str| -> Result<String, meteion_protocols::ActionError> {
            Ok("pong".to_string())
        }),
    );
    assert_eq!(app.do_action("ping", ""), "pong");

    app.clear_actions();
    assert_eq!(app.do_action("ping", ""), "DoActionWrong(NoSuchAction):ping");
    assert_eq!(app.do_action("query", ""), "DoActionWrong(NoSuchAction):query");

    app.restore_builtin_actions();
    assert!(app.do_action("query", "x").contains("\"query\":\"x\""));
}

#[tokio::test]
async fn test_server_roundtrip_and_shutdown() {
    let (app, _) = app();
    let addr = app.server_start(0).await.unwrap();

    let body = reqwest::Client::new()
        .post(format!("http://{}/command", addr))
        .body("/dance")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "Executed");

    app.shutdown().await;
    assert_eq!(app.server().state(), ServerState::Stopped);
    assert_eq!(app.do_action("command", "/dance"), "DoActionWrong(NoSuchAction):command");
}

#[tokio::test]
async fn test_server_start_on_busy_port_stays_stopped() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let (app, _) = app();
    assert!(app.server_start(port).await.is_none());
    assert_eq!(app.server().state(), ServerState::Stopped);
}

#[tokio::test]
async fn test_auto_start_follows_config() {
    let mut config = Config::default();
    config.server.port = 0;
    config.webhook.auto_start = true;
    config.webhook.url = "http://127.0.0.1:9".to_string();

    let (app, _) = app_with(config);
    app.start().await;
    assert_eq!(app.server().state(), ServerState::Listening);
    assert!(app.relay().is_registered());

    app.shutdown().await;
    assert!(!app.relay().is_registered());
}

#[tokio::test]
async fn test_webhook_url_locked_while_running() {
    let (app, _) = app();
    app.webhook_start();
    assert!(matches!(
        app.set_webhook_url("http://127.0.0.1:3000"),
        Err(AppError::Relay(RelayError::EndpointLocked))
    ));

    app.webhook_stop();
    app.set_webhook_url("http://127.0.0.1:3000").unwrap();
    assert_eq!(app.relay().client().endpoint(), "http://127.0.0.1:3000");
}
