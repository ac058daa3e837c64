use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Side;

pub const BOARD_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cell {
    #[serde(rename = ".")]
    Empty,
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl Cell {
    /// The side owning the pawn in this cell, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            Cell::White => Some(Side::White),
            Cell::Black => Some(Side::Black),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::White => 'w',
            Cell::Black => 'b',
        }
    }

    fn from_symbol(c: char) -> Option<Cell> {
        match c {
            '.' => Some(Cell::Empty),
            'w' => Some(Cell::White),
            'b' => Some(Cell::Black),
            _ => None,
        }
    }
}

/// A square on the board. Row 0 is White's back rank, row 2 Black's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// `None` if the coordinates fall outside the board.
    pub fn new(row: usize, col: usize) -> Option<Position> {
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Position { row, col })
    }

    /// Step by signed offsets, staying on the board.
    pub(crate) fn offset(self, d_row: isize, d_col: isize) -> Option<Position> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        Position::new(row, col)
    }
}

impl TryFrom<(usize, usize)> for Position {
    type Error = String;

    fn try_from((row, col): (usize, usize)) -> Result<Self, Self::Error> {
        Position::new(row, col).ok_or_else(|| format!("position ({row}, {col}) is off the board"))
    }
}

impl From<Position> for (usize, usize) {
    fn from(pos: Position) -> Self {
        (pos.row, pos.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseBoardError {
    #[error("expected {BOARD_SIZE} rows separated by '/', found {0}")]
    RowCount(usize),
    #[error("row {row} must have {BOARD_SIZE} cells, found {len}")]
    RowLength { row: usize, len: usize },
    #[error("unknown cell symbol '{0}' (expected 'w', 'b' or '.')")]
    Symbol(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Opening position: White fills row 0, Black fills row 2.
    pub fn new() -> Self {
        Board {
            cells: [
                [Cell::White; BOARD_SIZE],
                [Cell::Empty; BOARD_SIZE],
                [Cell::Black; BOARD_SIZE],
            ],
        }
    }

    pub fn empty() -> Self {
        Board {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn rows(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.row][pos.col]
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.row][pos.col] = cell;
    }

    /// Number of pawns `side` has left.
    pub fn count(&self, side: Side) -> usize {
        let cell = side.to_cell();
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == cell)
            .count()
    }

    /// Positions holding one of `side`'s pawns, in row-major order.
    pub fn pawns(&self, side: Side) -> impl Iterator<Item = Position> + '_ {
        let cell = side.to_cell();
        (0..BOARD_SIZE)
            .flat_map(|row| (0..BOARD_SIZE).map(move |col| Position { row, col }))
            .filter(move |&pos| self.get(pos) == cell)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            for cell in row {
                write!(f, "{}", cell.symbol())?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ParseBoardError;

    /// Parse the compact `www/.../bbb` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.trim().split('/').collect();
        if rows.len() != BOARD_SIZE {
            return Err(ParseBoardError::RowCount(rows.len()));
        }

        let mut board = Board::empty();
        for (row, text) in rows.iter().enumerate() {
            let len = text.chars().count();
            if len != BOARD_SIZE {
                return Err(ParseBoardError::RowLength { row, len });
            }
            for (col, c) in text.chars().enumerate() {
                board.cells[row][col] = Cell::from_symbol(c).ok_or(ParseBoardError::Symbol(c))?;
            }
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_layout() {
        let board = Board::new();
        for col in 0..BOARD_SIZE {
            assert_eq!(board.rows()[0][col], Cell::White);
            assert_eq!(board.rows()[1][col], Cell::Empty);
            assert_eq!(board.rows()[2][col], Cell::Black);
        }
        assert_eq!(board.count(Side::White), 3);
        assert_eq!(board.count(Side::Black), 3);
    }

    #[test]
    fn test_parse_and_display() {
        let board: Board = "w.b/.w./b..".parse().unwrap();
        assert_eq!(board.get(Position { row: 0, col: 2 }), Cell::Black);
        assert_eq!(board.get(Position { row: 1, col: 1 }), Cell::White);
        assert_eq!(board.to_string(), "w.b/.w./b..");
        assert_eq!(Board::new().to_string(), "www/.../bbb");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("www/...".parse::<Board>(), Err(ParseBoardError::RowCount(2)));
        assert_eq!(
            "www/..../bbb".parse::<Board>(),
            Err(ParseBoardError::RowLength { row: 1, len: 4 })
        );
        assert_eq!("wxw/.../bbb".parse::<Board>(), Err(ParseBoardError::Symbol('x')));
    }

    #[test]
    fn test_position_bounds() {
        assert!(Position::new(2, 2).is_some());
        assert!(Position::new(3, 0).is_none());
        assert!(Position::new(0, 3).is_none());
        let corner = Position { row: 0, col: 0 };
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(1, 1), Some(Position { row: 1, col: 1 }));
    }

    #[test]
    fn test_pawns_row_major() {
        let board: Board = "b.w/w../...".parse().unwrap();
        let white: Vec<Position> = board.pawns(Side::White).collect();
        assert_eq!(
            white,
            vec![Position { row: 0, col: 2 }, Position { row: 1, col: 0 }]
        );
    }

    #[test]
    fn test_board_json_uses_symbols() {
        let json = serde_json::to_string(&Board::new()).unwrap();
        assert_eq!(
            json,
            r#"[["w","w","w"],[".",".","."],["b","b","b"]]"#
        );
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Board::new());
    }

    #[test]
    fn test_position_json_rejects_off_board() {
        let pos: Position = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(pos, Position { row: 1, col: 2 });
        assert!(serde_json::from_str::<Position>("[3, 0]").is_err());
    }
}
