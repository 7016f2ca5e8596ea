//! The TCP accept loop.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::logic::SharedBoard;
use crate::session;

/// Accepts connections forever, spawning one task per client; the accept
/// loop never waits on a session. Only a failure of the listening socket
/// itself ends the loop — per-connection errors are logged and die with
/// their own task.
pub async fn serve(
    listener: TcpListener,
    board: SharedBoard,
    debug_mode: bool,
) -> io::Result<()> {
    let players = Arc::new(AtomicUsize::new(0));

    loop {
        let (stream, peer) = listener.accept().await?;
        let board = board.clone();
        let players = players.clone();

        tokio::spawn(async move {
            let online = players.fetch_add(1, Ordering::SeqCst) + 1;
            info!("client connected from {}, {} online", peer, online);

            if let Err(err) =
                session::handle_connection(stream, board, players.clone(), debug_mode).await
            {
                warn!("connection error from {}: {}", peer, err);
            }

            let online = players.fetch_sub(1, Ordering::SeqCst) - 1;
            info!("client disconnected from {}, {} online", peer, online);
        });
    }
}
