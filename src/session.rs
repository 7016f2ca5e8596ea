//! Per-connection command loop.
//!
//! A session owns nothing but its socket halves: it greets the client, then
//! reads one line at a time, parses it, applies exactly one board operation
//! under the shared lock, and writes the reply. The reply is rendered under
//! the same lock acquisition as the mutation, so no client ever sees a
//! half-applied command from another.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tracing::{debug, info};
use uuid::Uuid;

use crate::logic::{DigOutcome, SharedBoard};
use crate::protocol::{self, Command};

/// What dispatch wants written back, and whether the connection survives it.
enum Reply {
    Line(String),
    Boom,
    Bye,
}

/// Runs one client from greeting to disconnect. Returns when the peer goes
/// away, the client says `bye`, or (outside debug mode) a dig detonates.
pub async fn handle_connection(
    stream: TcpStream,
    board: SharedBoard,
    players: Arc<AtomicUsize>,
    debug_mode: bool,
) -> io::Result<()> {
    let session = Uuid::new_v4();
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    let greeting = {
        let board = board.lock().await;
        protocol::greeting(
            board.width(),
            board.height(),
            players.load(Ordering::SeqCst),
        )
    };
    send_line(&mut writer, &greeting).await?;
    debug!("session {} greeted", session);

    while let Some(line) = lines.next_line().await? {
        match dispatch(&line, &board).await {
            Reply::Line(text) => send_line(&mut writer, &text).await?,
            Reply::Boom => {
                send_line(&mut writer, protocol::BOOM).await?;
                if !debug_mode {
                    info!("session {} detonated a mine, disconnecting", session);
                    break;
                }
                info!("session {} detonated a mine, staying connected", session);
            }
            Reply::Bye => {
                debug!("session {} said bye", session);
                break;
            }
        }
    }

    Ok(())
}

async fn dispatch(line: &str, board: &SharedBoard) -> Reply {
    let Some(command) = Command::parse(line) else {
        debug!("unrecognized command {:?}", line);
        return Reply::Line(protocol::HELP.to_string());
    };

    match command {
        Command::Help => Reply::Line(protocol::HELP.to_string()),
        Command::Bye => Reply::Bye,
        Command::Look => {
            let board = board.lock().await;
            Reply::Line(board.render())
        }
        Command::Dig { x, y } => {
            let mut board = board.lock().await;
            match board.dig(x, y) {
                DigOutcome::Detonated => Reply::Boom,
                DigOutcome::Revealed | DigOutcome::Ignored => Reply::Line(board.render()),
            }
        }
        Command::Flag { x, y } => {
            let mut board = board.lock().await;
            board.flag(x, y);
            Reply::Line(board.render())
        }
        Command::Deflag { x, y } => {
            let mut board = board.lock().await;
            board.deflag(x, y);
            Reply::Line(board.render())
        }
    }
}

async fn send_line(writer: &mut OwnedWriteHalf, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    writer.flush().await
}
