// Server loop module
// Accepts connections until shutdown, then drains the active ones

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::Instant;

use super::connection::accept_connection;
use super::signal::shutdown_requested;
use crate::config::AppState;
use crate::logger;

/// How often the drain phase re-checks the active connection count
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept connections until `shutdown` flips, then wait for in-flight
/// connections to finish.
///
/// The listener is closed as soon as shutdown starts. Connections still open
/// after `write_timeout` seconds are abandoned.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(
                        stream,
                        peer_addr,
                        &state,
                        &active_connections,
                        shutdown.clone(),
                    ),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown_requested(&mut shutdown) => break,
        }
    }

    drop(listener);
    logger::log_shutdown_started(active_connections.load(Ordering::SeqCst));
    let grace = Duration::from_secs(state.config.performance.write_timeout);
    drain_connections(&active_connections, grace).await;
    logger::log_shutdown_complete();
}

/// Wait until no connection is active or `grace` has passed
async fn drain_connections(active_connections: &AtomicUsize, grace: Duration) {
    let deadline = Instant::now() + grace;
    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 {
            return;
        }
        if Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown grace period elapsed with {remaining} connections still open"
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use crate::store::fixtures::{create_store, starters};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let counter = AtomicUsize::new(0);
        drain_connections(&counter, Duration::from_secs(5)).await;
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let counter = AtomicUsize::new(1);
        let started = std::time::Instant::now();
        drain_connections(&counter, Duration::from_millis(100)).await;
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    struct TestServer {
        addr: std::net::SocketAddr,
        counter: Arc<AtomicUsize>,
        handle: tokio::task::JoinHandle<()>,
        _dir: tempfile::TempDir,
    }

    async fn spawn_server(shutdown: watch::Receiver<bool>) -> TestServer {
        let dir = tempfile::tempdir().unwrap();
        let db = create_store(dir.path(), &starters()).await;
        let mut cfg = Config::load_from("definitely-missing-pokedex-config").unwrap();
        cfg.database.path = db.to_string_lossy().to_string();
        cfg.logging.access_log = false;
        let state = Arc::new(AppState::new(&cfg));

        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = tokio::spawn(start_server_loop(
            listener,
            state,
            Arc::clone(&counter),
            shutdown,
        ));
        TestServer {
            addr,
            counter,
            handle,
            _dir: dir,
        }
    }

    async fn get_charmander(addr: std::net::SocketAddr) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /pokemon/charmander HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        raw
    }

    #[tokio::test]
    async fn test_serves_and_shuts_down() {
        let (tx, rx) = watch::channel(false);
        let server = spawn_server(rx).await;

        let raw = get_charmander(server.addr).await;
        assert!(raw.starts_with("HTTP/1.1 200 OK"), "{raw}");
        assert!(raw.contains("\"name\":\"Charmander\""));

        tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(5), server.handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(server.counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_keeps_serving_until_signalled() {
        let (_tx, rx) = watch::channel(false);
        let server = spawn_server(rx).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!server.handle.is_finished());
        assert!(get_charmander(server.addr).await.starts_with("HTTP/1.1 200 OK"));
        assert!(!server.handle.is_finished());
        server.handle.abort();
    }

    #[tokio::test]
    async fn test_dropped_sender_does_not_stop_server() {
        let (tx, rx) = watch::channel(false);
        let server = spawn_server(rx).await;
        drop(tx);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!server.handle.is_finished());
        assert!(get_charmander(server.addr).await.starts_with("HTTP/1.1 200 OK"));
        assert!(!server.handle.is_finished());
        server.handle.abort();
    }
}
