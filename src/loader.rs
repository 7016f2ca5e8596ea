//! Loading a starting board from its on-disk text form.
//!
//! The format is a header line `X Y` followed by exactly `Y` lines of
//! exactly `X` space-separated `0`/`1` values (1 = mine). Anything else is a
//! fatal error at startup, before the listening socket opens.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::Result;
use crate::data::Board;

pub fn load_board(path: &Path) -> Result<Board> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("cannot read board file {}: {err}", path.display()))?;
    let board = parse_board(&text)
        .map_err(|err| format!("malformed board file {}: {err}", path.display()))?;
    info!(
        "loaded {}x{} board from {}",
        board.width(),
        board.height(),
        path.display()
    );
    Ok(board)
}

fn parse_board(text: &str) -> Result<Board> {
    let mut lines = text.lines();
    let header = lines.next().ok_or("missing dimension header")?;

    let mut dimensions = header.split_whitespace();
    let width: usize = dimensions
        .next()
        .ok_or("missing board width")?
        .parse()
        .map_err(|_| format!("invalid board width in header {header:?}"))?;
    let height: usize = dimensions
        .next()
        .ok_or("missing board height")?
        .parse()
        .map_err(|_| format!("invalid board height in header {header:?}"))?;
    if dimensions.next().is_some() {
        return Err(format!("unexpected tokens after dimensions in header {header:?}").into());
    }
    if width == 0 || height == 0 {
        return Err("board dimensions must be positive".into());
    }

    let mut mines = Vec::with_capacity(width * height);
    for row in 0..height {
        let line = lines
            .next()
            .ok_or_else(|| format!("expected {height} rows, found {row}"))?;
        let values: Vec<&str> = line.split_whitespace().collect();
        if values.len() != width {
            return Err(format!(
                "row {row} has {} values, expected {width}",
                values.len()
            )
            .into());
        }
        for value in values {
            match value {
                "0" => mines.push(false),
                "1" => mines.push(true),
                other => {
                    return Err(format!("row {row} contains {other:?}, expected 0 or 1").into());
                }
            }
        }
    }
    if lines.next().is_some() {
        return Err(format!("unexpected content after {height} rows").into());
    }

    Ok(Board::with_mines(width, height, mines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_board() {
        let board = parse_board("3 2\r\n0 1 0\r\n0 0 1\r\n").unwrap();
        assert_eq!(board.width(), 3);
        assert_eq!(board.height(), 2);
        assert!(board.has_mine(1, 0));
        assert!(board.has_mine(2, 1));
        assert!(!board.has_mine(0, 0));
    }

    #[test]
    fn rejects_a_short_row() {
        let err = parse_board("3 2\n0 1\n0 0 1\n").unwrap_err();
        assert!(err.to_string().contains("expected 3"));
    }

    #[test]
    fn rejects_a_missing_row() {
        let err = parse_board("2 3\n0 0\n1 1\n").unwrap_err();
        assert!(err.to_string().contains("expected 3 rows"));
    }

    #[test]
    fn rejects_extra_rows() {
        assert!(parse_board("2 1\n0 0\n0 0\n").is_err());
    }

    #[test]
    fn rejects_values_outside_the_alphabet() {
        let err = parse_board("2 1\n0 2\n").unwrap_err();
        assert!(err.to_string().contains("expected 0 or 1"));
    }

    #[test]
    fn rejects_a_bad_header() {
        assert!(parse_board("").is_err());
        assert!(parse_board("two 2\n").is_err());
        assert!(parse_board("2\n0 0\n").is_err());
        assert!(parse_board("2 2 2\n").is_err());
        assert!(parse_board("0 4\n").is_err());
    }
}
