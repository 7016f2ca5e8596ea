//! Startup configuration.
//!
//! The option surface mirrors the classic server: `--debug`/`--no-debug`
//! toggle whether a detonation disconnects the client, `--port` picks the
//! listening port, and the starting board comes from `--size W,H`,
//! `--file PATH`, or a random 10x10 default. Every validation failure here
//! aborts startup before any socket is opened.

use std::path::PathBuf;

use clap::Parser;

use crate::Result;
use crate::data::Board;
use crate::loader;

pub const DEFAULT_PORT: u16 = 4444;
pub const DEFAULT_SIZE: usize = 10;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Args {
    /// Keep connections open after a BOOM reply
    #[clap(long, overrides_with = "no_debug")]
    pub debug: bool,

    /// Disconnect a client after a BOOM reply (default)
    #[clap(long)]
    pub no_debug: bool,

    /// Port to listen on
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Dimensions of the randomly generated board
    #[clap(long, value_name = "W,H", conflicts_with = "file")]
    pub size: Option<String>,

    /// Load the starting board from a file instead of generating one
    #[clap(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

impl Args {
    /// Builds the starting board, failing fast on any invalid input.
    pub fn board(&self) -> Result<Board> {
        if let Some(path) = &self.file {
            return loader::load_board(path);
        }
        let (width, height) = match &self.size {
            Some(size) => parse_size(size)?,
            None => (DEFAULT_SIZE, DEFAULT_SIZE),
        };
        Ok(Board::random(width, height))
    }
}

fn parse_size(size: &str) -> Result<(usize, usize)> {
    let Some((width, height)) = size.split_once(',') else {
        return Err(format!("invalid size {size:?}, expected W,H").into());
    };
    let width: usize = width
        .parse()
        .map_err(|_| format!("invalid board width {width:?}"))?;
    let height: usize = height
        .parse()
        .map_err(|_| format!("invalid board height {height:?}"))?;
    if width == 0 || height == 0 {
        return Err("board dimensions must be positive".into());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_server() {
        let args = Args::parse_from(["minesweeperd"]);
        assert!(!args.debug);
        assert_eq!(args.port, DEFAULT_PORT);
        assert!(args.size.is_none());
        assert!(args.file.is_none());
    }

    #[test]
    fn last_debug_flag_wins() {
        let args = Args::parse_from(["minesweeperd", "--debug", "--no-debug"]);
        assert!(!args.debug);
        let args = Args::parse_from(["minesweeperd", "--no-debug", "--debug"]);
        assert!(args.debug);
    }

    #[test]
    fn size_and_file_conflict() {
        let parsed = Args::try_parse_from(["minesweeperd", "--size", "4,4", "--file", "b.txt"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn port_must_fit_sixteen_bits() {
        assert!(Args::try_parse_from(["minesweeperd", "--port", "65535"]).is_ok());
        assert!(Args::try_parse_from(["minesweeperd", "--port", "65536"]).is_err());
    }

    #[test]
    fn size_parses_dimensions() {
        assert_eq!(parse_size("42,58").unwrap(), (42, 58));
        assert!(parse_size("42").is_err());
        assert!(parse_size("42,").is_err());
        assert!(parse_size("0,5").is_err());
        assert!(parse_size("a,b").is_err());
    }

    #[test]
    fn sized_args_build_a_board() {
        let args = Args::parse_from(["minesweeperd", "--size", "5,7"]);
        let board = args.board().unwrap();
        assert_eq!(board.width(), 5);
        assert_eq!(board.height(), 7);
    }
}
