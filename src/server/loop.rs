// Server loop module
// Accepts connections until a shutdown signal arrives, then drains briefly

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::ShutdownSignal;
use crate::config::AppState;
use crate::logger;

/// How long in-flight connections get after shutdown is requested
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept loop. Must run inside a `LocalSet`, connections are local tasks.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    mut shutdown: ShutdownSignal,
) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            signal = shutdown.recv() => {
                tracing::info!("{signal} received");
                logger::log_shutdown();
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&active_connections).await;
    Ok(())
}

/// Wait for active connections to finish, up to `DRAIN_TIMEOUT`
async fn drain_connections(active: &AtomicUsize) {
    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;

    while active.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Drain timeout, closing {} active connection(s)",
                active.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
