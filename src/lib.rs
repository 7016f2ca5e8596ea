//! Multiplayer Minesweeper Server
//!
//! Every client digs at the same board. Clients connect over TCP, send one
//! text command per line (`look`, `dig x y`, `flag x y`, `deflag x y`,
//! `help`, `bye`) and get textual replies back; the board lives behind a
//! single mutex so each command applies atomically with respect to every
//! other connection.
//!
//! The binary wires everything together from the command line, but the
//! server can also be embedded:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use minesweeperd::{data::Board, server};
//! use tokio::net::TcpListener;
//! use tokio::sync::Mutex;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let listener = TcpListener::bind("0.0.0.0:4444").await?;
//!     let board = Arc::new(Mutex::new(Board::random(10, 10)));
//!     server::serve(listener, board, false).await
//! }
//! ```

pub mod config;
pub mod data;
pub mod loader;
pub mod logic;
pub mod protocol;
pub mod server;
pub mod session;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
