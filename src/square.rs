use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, FromRepr};

use crate::position::Side;

/// Number of rows (and columns) on the board.
pub const BOARD_SIZE: u8 = 8;

/// A tile of the board, indexed row-major from white's back rank: `idx = row * 8 + column`.
#[allow(dead_code)]
#[rustfmt::skip]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumString, FromRepr, Display, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    pub const fn from_row_column(row: u8, column: u8) -> Option<Square> {
        if row >= BOARD_SIZE || column >= BOARD_SIZE {
            return None;
        }
        Square::from_repr(row * BOARD_SIZE + column)
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn row(self) -> u8 {
        self as u8 / BOARD_SIZE
    }

    pub const fn column(self) -> u8 {
        self as u8 % BOARD_SIZE
    }

    /// Steps `d_row` rows and `d_column` columns away, or `None` if that leaves the board.
    ///
    /// Row and column are bounded separately, so stepping sideways off an edge never
    /// wraps onto the neighbouring row.
    pub const fn offset(self, d_row: i8, d_column: i8) -> Option<Square> {
        let row = self.row() as i8 + d_row;
        let column = self.column() as i8 + d_column;
        if row < 0 || column < 0 {
            return None;
        }
        Square::from_row_column(row as u8, column as u8)
    }

    /// Tiles walked from here in one direction, nearest first, up to the edge.
    pub fn ray(self, d_row: i8, d_column: i8) -> impl Iterator<Item = Square> {
        std::iter::successors(self.offset(d_row, d_column), move |sq| {
            sq.offset(d_row, d_column)
        })
    }

    /// The tile one step towards `side`'s promotion rank.
    pub const fn forward(self, side: Side) -> Option<Square> {
        self.offset(side.forward_rows(), 0)
    }

    /// Same column, row seen from the other side of the board.
    pub const fn mirror(self) -> Square {
        Square::list_white_perspective()[self.index()]
    }

    /// Chebyshev distance: the number of king steps between two tiles.
    pub const fn distance(self, other: Square) -> u8 {
        let rows = self.row().abs_diff(other.row());
        let columns = self.column().abs_diff(other.column());
        if rows > columns {
            rows
        } else {
            columns
        }
    }

    /// Lowercase coordinate, as used by FEN and long algebraic notation.
    pub fn coordinate(self) -> String {
        self.to_string().to_ascii_lowercase()
    }

    #[rustfmt::skip]
    pub const fn list_white_perspective() -> [Square; 64] {
        use Square::*;
        [
            A8, B8, C8, D8, E8, F8, G8, H8,
            A7, B7, C7, D7, E7, F7, G7, H7,
            A6, B6, C6, D6, E6, F6, G6, H6,
            A5, B5, C5, D5, E5, F5, G5, H5,
            A4, B4, C4, D4, E4, F4, G4, H4,
            A3, B3, C3, D3, E3, F3, G3, H3,
            A2, B2, C2, D2, E2, F2, G2, H2,
            A1, B1, C1, D1, E1, F1, G1, H1,
        ]
    }
}
