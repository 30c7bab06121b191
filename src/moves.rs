use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, FromRepr};

use crate::position::{Piece, Side};
use crate::square::Square;
use crate::square::Square::*;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MoveError {
    #[error("move flag code out of range: {0}")]
    FlagOutOfRange(u8),

    #[error("can't promote to {0}")]
    InvalidPromotionPiece(Piece),

    #[error("flag {flag} is inconsistent with {src} -> {dest}")]
    InconsistentFlag {
        src: Square,
        dest: Square,
        flag: MoveFlag,
    },
}

/// Promotion choices in flag order.
pub const PROMOTION_PIECES: [Piece; 4] = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];

/// What kind of ply a [`Move`] is. Every code names exactly one category.
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, FromRepr, Display, Deserialize, Serialize,
)]
pub enum MoveFlag {
    Quiet = 0,
    DoublePawnPush = 1,
    Capture = 2,
    EnPassant = 3,
    WhiteKingCastle = 4,
    WhiteQueenCastle = 5,
    BlackKingCastle = 6,
    BlackQueenCastle = 7,
    KnightPromotion = 8,
    BishopPromotion = 9,
    RookPromotion = 10,
    QueenPromotion = 11,
    KnightPromotionCapture = 12,
    BishopPromotionCapture = 13,
    RookPromotionCapture = 14,
    QueenPromotionCapture = 15,
}

impl MoveFlag {
    pub fn promotion(piece: Piece, capture: bool) -> Result<MoveFlag, MoveError> {
        let offset = PROMOTION_PIECES
            .iter()
            .position(|&p| p == piece)
            .ok_or(MoveError::InvalidPromotionPiece(piece))? as u8;
        let base = if capture { 12 } else { 8 };
        MoveFlag::try_from(base + offset)
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn is_capture(self) -> bool {
        matches!(self, MoveFlag::Capture | MoveFlag::EnPassant) || self as u8 >= 12
    }

    pub const fn is_promotion(self) -> bool {
        self as u8 >= 8
    }

    pub const fn is_castle(self) -> bool {
        matches!(
            self,
            MoveFlag::WhiteKingCastle
                | MoveFlag::WhiteQueenCastle
                | MoveFlag::BlackKingCastle
                | MoveFlag::BlackQueenCastle
        )
    }

    pub const fn promotion_piece(self) -> Option<Piece> {
        if self.is_promotion() {
            Some(PROMOTION_PIECES[(self as u8 & 0b11) as usize])
        } else {
            None
        }
    }

    /// King and rook squares `(king_src, king_dest, rook_src, rook_dest)` of a castle.
    pub(crate) const fn castle_squares(self) -> Option<(Square, Square, Square, Square)> {
        match self {
            MoveFlag::WhiteKingCastle => Some((E1, G1, H1, F1)),
            MoveFlag::WhiteQueenCastle => Some((E1, C1, A1, D1)),
            MoveFlag::BlackKingCastle => Some((E8, G8, H8, F8)),
            MoveFlag::BlackQueenCastle => Some((E8, C8, A8, D8)),
            _ => None,
        }
    }

    pub(crate) const fn castle_side(self) -> Option<Side> {
        match self {
            MoveFlag::WhiteKingCastle | MoveFlag::WhiteQueenCastle => Some(Side::White),
            MoveFlag::BlackKingCastle | MoveFlag::BlackQueenCastle => Some(Side::Black),
            _ => None,
        }
    }
}

impl TryFrom<u8> for MoveFlag {
    type Error = MoveError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        MoveFlag::from_repr(value).ok_or(MoveError::FlagOutOfRange(value))
    }
}

/// One ply: origin, destination and what kind of move it is.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct Move {
    pub src: Square,
    pub dest: Square,
    pub flag: MoveFlag,
}

impl Move {
    /// Builds a move without geometric validation. Generators use this for moves they
    /// derive from the board.
    pub const fn new(src: Square, dest: Square, flag: MoveFlag) -> Move {
        Self { src, dest, flag }
    }

    pub const fn quiet(src: Square, dest: Square) -> Move {
        Self::new(src, dest, MoveFlag::Quiet)
    }

    pub const fn capture(src: Square, dest: Square) -> Move {
        Self::new(src, dest, MoveFlag::Capture)
    }

    /// Builds a move, rejecting flags that can't describe a ply between `src` and `dest`.
    pub fn try_new(src: Square, dest: Square, flag: MoveFlag) -> Result<Move, MoveError> {
        let consistent = src != dest
            && match flag {
                MoveFlag::Quiet | MoveFlag::Capture => true,
                MoveFlag::DoublePawnPush => {
                    src.column() == dest.column()
                        && ((src.row() == 1 && dest.row() == 3) || (src.row() == 6 && dest.row() == 4))
                }
                MoveFlag::EnPassant => {
                    src.column().abs_diff(dest.column()) == 1
                        && ((src.row() == 4 && dest.row() == 5) || (src.row() == 3 && dest.row() == 2))
                }
                _ if flag.is_castle() => matches!(
                    flag.castle_squares(),
                    Some((king_src, king_dest, _, _)) if king_src == src && king_dest == dest
                ),
                _ => {
                    let columns = src.column().abs_diff(dest.column());
                    let want_columns = if flag.is_capture() { 1 } else { 0 };
                    columns == want_columns
                        && ((src.row() == 6 && dest.row() == 7) || (src.row() == 1 && dest.row() == 0))
                }
            };

        if consistent {
            Ok(Self::new(src, dest, flag))
        } else {
            Err(MoveError::InconsistentFlag { src, dest, flag })
        }
    }

    pub const fn is_capture(&self) -> bool {
        self.flag.is_capture()
    }

    pub const fn promotion(&self) -> Option<Piece> {
        self.flag.promotion_piece()
    }

    /// Packs into 16 bits: source in bits 0-5, destination in 6-11, flag in 12-15.
    pub const fn to_bits(self) -> u16 {
        (self.src as u16) | (self.dest as u16) << 6 | (self.flag as u16) << 12
    }

    pub fn from_bits(bits: u16) -> Result<Move, MoveError> {
        let flag = MoveFlag::try_from((bits >> 12) as u8)?;
        // Six-bit fields always name a square.
        let src = Square::from_repr((bits & 0x3f) as u8).unwrap_or(A1);
        let dest = Square::from_repr(((bits >> 6) & 0x3f) as u8).unwrap_or(A1);
        Move::try_new(src, dest, flag)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dest)?;
        if self.flag != MoveFlag::Quiet {
            write!(f, " ({})", self.flag)?;
        }
        Ok(())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.src.coordinate(), self.dest.coordinate())?;
        if let Some(promotion) = self.promotion() {
            let promotion_ch: char = promotion.into();
            write!(f, "{}", promotion_ch)?;
        }
        Ok(())
    }
}
