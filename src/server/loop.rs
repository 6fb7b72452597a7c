// Server loop module
// Accepts connections until shutdown, then drains in-flight ones

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// How often the drain phase re-checks the connection count
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept connections until `shutdown` fires.
///
/// After shutdown no new connections are accepted; in-flight ones get up to
/// `drain_timeout` to finish.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    shutdown: Arc<Notify>,
    drain_timeout: Duration,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => {
                logger::log_info("Shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    drop(listener);
    drain(&active_connections, drain_timeout).await;
}

/// Wait until no connection is active or the timeout passes
async fn drain(active_connections: &AtomicUsize, drain_timeout: Duration) {
    let waited = tokio::time::timeout(drain_timeout, async {
        while active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL).await;
        }
    })
    .await;

    match waited {
        Ok(()) => logger::log_info("All connections closed"),
        Err(_) => logger::log_warning(&format!(
            "{} connection(s) still open after {}s, exiting anyway",
            active_connections.load(Ordering::SeqCst),
            drain_timeout.as_secs()
        )),
    }
}
