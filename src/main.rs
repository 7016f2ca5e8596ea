use std::process;
use std::sync::Arc;

use clap::Parser;
use minesweeperd::config::Args;
use minesweeperd::server;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let debug_mode = args.debug;

    // Build and validate the board before touching the network: a malformed
    // file or bad size must prevent startup entirely.
    let board = match args.board() {
        Ok(board) => board,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    info!(
        "starting minesweeper server: {}x{} board, debug mode {}",
        board.width(),
        board.height(),
        if debug_mode { "on" } else { "off" }
    );

    let listener = match TcpListener::bind(("0.0.0.0", args.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("cannot listen on port {}: {err}", args.port);
            process::exit(1);
        }
    };
    info!("listening on port {}", args.port);

    let board = Arc::new(Mutex::new(board));
    if let Err(err) = server::serve(listener, board, debug_mode).await {
        error!("listening socket failed: {}", err);
        process::exit(1);
    }
}
