//! Plain-text rendering of boards and parsing of typed commands.

use std::fmt::Write as _;

use crate::board::Board;
use crate::common::{CellState, ShotMark};
use crate::config::GRID_SIZE;
use crate::ship::Orientation;

/// `(col, row)` as the letter/number form players type, e.g. `C7`.
pub fn coord_to_string(col: usize, row: usize) -> String {
    let letter = (b'A' + col as u8) as char;
    format!("{}{}", letter, row + 1)
}

/// Parse `A1`..`J10` (case-insensitive) into zero-based `(col, row)`.
pub fn parse_coord(input: &str) -> Result<(usize, usize), String> {
    let input = input.trim();
    if input.len() < 2 {
        return Err("need a column letter and a row number (e.g. A5)".to_string());
    }
    let mut chars = input.chars();
    let col_ch = chars
        .next()
        .ok_or("missing column letter")?
        .to_ascii_uppercase();
    if !col_ch.is_ascii_alphabetic() {
        return Err(format!("invalid column '{}', use A-J", col_ch));
    }
    let col = (col_ch as u8 - b'A') as usize;
    if col >= GRID_SIZE {
        return Err(format!("column '{}' out of bounds, use A-J", col_ch));
    }
    let row_str = chars.as_str();
    let row: usize = row_str
        .parse()
        .map_err(|_| format!("invalid row '{}', use 1-10", row_str))?;
    if row == 0 || row > GRID_SIZE {
        return Err(format!("row {} out of bounds, use 1-10", row));
    }
    Ok((col, row - 1))
}

pub fn parse_orientation(input: &str) -> Result<Orientation, String> {
    match input.trim() {
        "h" | "H" => Ok(Orientation::Horizontal),
        "v" | "V" => Ok(Orientation::Vertical),
        other => Err(format!("invalid orientation '{}', use h or v", other)),
    }
}

/// A line typed by a human player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Place {
        col: usize,
        row: usize,
        orientation: Orientation,
    },
    /// Place every remaining ship at random.
    Auto,
    Fire { col: usize, row: usize },
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().ok_or("empty command")?.to_ascii_lowercase();
        let cmd = match verb.as_str() {
            "place" | "p" => {
                let (col, row) = parse_coord(parts.next().ok_or("usage: place <A1> <h|v>")?)?;
                let orientation = parts.next().map_or(Ok(Orientation::Horizontal), parse_orientation)?;
                Command::Place { col, row, orientation }
            }
            "auto" => Command::Auto,
            "fire" | "f" => {
                let (col, row) = parse_coord(parts.next().ok_or("usage: fire <A1>")?)?;
                Command::Fire { col, row }
            }
            "show" | "s" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(format!("unknown command '{}', try 'help'", other)),
        };
        if parts.next().is_some() {
            return Err("too many arguments".to_string());
        }
        Ok(cmd)
    }
}

pub const HELP: &str = "\
Commands:
  place <A1> <h|v>   place the next ship of the fleet
  auto               place the remaining ships at random
  fire <A1>          fire at a cell of the opponent's board
  show               print both boards
  quit               leave the game";

fn header(out: &mut String) {
    out.push_str("   ");
    for col in 0..GRID_SIZE {
        let _ = write!(out, " {}", (b'A' + col as u8) as char);
    }
    out.push('\n');
}

/// The owner's board: ships, incoming hits and misses.
pub fn render_board(board: &Board) -> String {
    let grid = board.grid();
    let mut out = String::new();
    header(&mut out);
    for (row, cells) in grid.iter().enumerate() {
        let _ = write!(out, "{:2} ", row + 1);
        for cell in cells {
            let ch = match cell {
                CellState::Empty => '.',
                CellState::ShipPresent => '#',
                CellState::Hit => 'X',
                CellState::Miss => 'o',
            };
            let _ = write!(out, " {}", ch);
        }
        out.push('\n');
    }
    out
}

/// The owner's outgoing shots at the opponent.
pub fn render_shots(board: &Board) -> String {
    let grid = board.shots_grid();
    let mut out = String::new();
    header(&mut out);
    for (row, cells) in grid.iter().enumerate() {
        let _ = write!(out, "{:2} ", row + 1);
        for mark in cells {
            let ch = match mark {
                ShotMark::NotFired => '.',
                ShotMark::Hit => 'X',
                ShotMark::Miss => 'o',
            };
            let _ = write!(out, " {}", ch);
        }
        out.push('\n');
    }
    out
}

/// Opponent board on top, own board below.
pub fn render_player_view(board: &Board) -> String {
    format!(
        "Opponent board:\n{}\nYour board:\n{}Legend: #=Ship X=Hit o=Miss .=Unknown",
        render_shots(board),
        render_board(board)
    )
}
