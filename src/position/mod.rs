use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::moves::{Move, MoveFlag};
use crate::square::Square::{self, *};

pub(crate) mod attacks;
mod fen;

pub use fen::FenParseError;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PositionError {
    #[error("char -> piece: got {0}")]
    FromCharPiece(char),

    #[error("no piece at {0}")]
    MoveNoPiece(Square),

    #[error("no piece at {0}")]
    RemoveNoPiece(Square),

    #[error("{0} is already occupied")]
    SquareOccupied(Square),

    #[error("to_move is the other side, for move: {0} {1} -> {2}")]
    MoveNotToMove(Side, Square, Square),

    #[error("move {mve:?} doesn't fit the board: {reason}")]
    InconsistentMove { mve: Move, reason: &'static str },

    #[error("internal state error: {0} is occupied but missing from the piece list")]
    PieceListMismatch(Square),
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, EnumIter, Clone, Copy, Display, Hash, Deserialize, Serialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub const fn opposite_side(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Row delta of a pawn push.
    pub const fn forward_rows(self) -> i8 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }

    pub const fn back_row(self) -> u8 {
        match self {
            Side::White => 0,
            Side::Black => 7,
        }
    }

    pub const fn pawn_start_row(self) -> u8 {
        match self {
            Side::White => 1,
            Side::Black => 6,
        }
    }

    pub const fn promotion_row(self) -> u8 {
        self.opposite_side().back_row()
    }

    /// Row a pawn must stand on to capture en passant.
    pub const fn en_passant_row(self) -> u8 {
        match self {
            Side::White => 4,
            Side::Black => 3,
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, EnumIter, Clone, Copy, Display, Hash, Deserialize, Serialize)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl From<Piece> for char {
    fn from(piece: Piece) -> char {
        match piece {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }
}

impl TryFrom<char> for Piece {
    type Error = PositionError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'p' => Ok(Piece::Pawn),
            'n' => Ok(Piece::Knight),
            'b' => Ok(Piece::Bishop),
            'r' => Ok(Piece::Rook),
            'q' => Ok(Piece::Queen),
            'k' => Ok(Piece::King),
            _ => Err(PositionError::FromCharPiece(value)),
        }
    }
}

/// A piece as the board stores it. `never_moved` only matters for kings and rooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardPiece {
    pub piece: Piece,
    pub side: Side,
    pub square: Square,
    pub never_moved: bool,
}

impl BoardPiece {
    /// A piece that hasn't moved yet. Only kings, rooks and pawns on their starting
    /// squares keep the flag.
    fn unmoved(piece: Piece, side: Side, square: Square) -> Self {
        let never_moved = match piece {
            Piece::Pawn => square.row() == side.pawn_start_row(),
            Piece::King => square.row() == side.back_row() && square.column() == 4,
            Piece::Rook => square.row() == side.back_row() && matches!(square.column(), 0 | 7),
            _ => false,
        };
        Self {
            piece,
            side,
            square,
            never_moved,
        }
    }

    fn to_char(self) -> char {
        let ch: char = self.piece.into();
        match self.side {
            Side::White => ch.to_ascii_uppercase(),
            Side::Black => ch,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Deserialize, Serialize)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    fn start() -> Self {
        Self::new(true, true, true, true)
    }

    pub fn new(
        white_king_side: bool,
        white_queen_side: bool,
        black_king_side: bool,
        black_queen_side: bool,
    ) -> Self {
        Self {
            white_king_side,
            white_queen_side,
            black_king_side,
            black_queen_side,
        }
    }

    pub fn none() -> Self {
        Self::new(false, false, false, false)
    }

    pub fn get(&self, side: Side, king_side: bool) -> bool {
        match (side, king_side) {
            (Side::White, true) => self.white_king_side,
            (Side::White, false) => self.white_queen_side,
            (Side::Black, true) => self.black_king_side,
            (Side::Black, false) => self.black_queen_side,
        }
    }

    pub fn any(&self, side: Side) -> bool {
        self.get(side, true) || self.get(side, false)
    }

    /// Drops every right that depends on a king or rook standing on `square`.
    fn revoke_square(&mut self, square: Square) {
        match square {
            E1 => {
                self.white_king_side = false;
                self.white_queen_side = false;
            }
            E8 => {
                self.black_king_side = false;
                self.black_queen_side = false;
            }
            H1 => self.white_king_side = false,
            A1 => self.white_queen_side = false,
            H8 => self.black_king_side = false,
            A8 => self.black_queen_side = false,
            _ => {}
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct State {
    pub to_move: Side,
    pub half_move_clock: u8,
    /// Column of the pawn that just made a double push, if any.
    pub en_passant_file: Option<u8>,
    pub castling_rights: CastlingRights,
    pub full_move_counter: u16,
}

impl State {
    fn start() -> Self {
        Self {
            to_move: Side::White,
            half_move_clock: 0,
            en_passant_file: None,
            castling_rights: CastlingRights::start(),
            full_move_counter: 1,
        }
    }
}

/// Occupied squares per side, kept in step with the occupancy array.
#[derive(Clone, Debug, Default)]
struct SquareLists {
    white: ArrayVec<Square, 64>,
    black: ArrayVec<Square, 64>,
}

impl SquareLists {
    fn get(&self, side: Side) -> &ArrayVec<Square, 64> {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    fn get_mut(&mut self, side: Side) -> &mut ArrayVec<Square, 64> {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }
}

#[rustfmt::skip]
const START_BACK_ROW: [Piece; 8] = [
    Piece::Rook, Piece::Knight, Piece::Bishop, Piece::Queen,
    Piece::King, Piece::Bishop, Piece::Knight, Piece::Rook,
];

/// A board snapshot: occupancy, per-side square lists and game state.
#[derive(Clone)]
pub struct Position {
    pub state: State,
    squares: [Option<BoardPiece>; 64],
    square_lists: SquareLists,
}

impl Position {
    pub fn empty() -> Self {
        Self {
            state: State {
                castling_rights: CastlingRights::none(),
                ..State::start()
            },
            squares: [None; 64],
            square_lists: SquareLists::default(),
        }
    }

    pub fn start() -> Self {
        let mut position = Self::empty();
        position.state = State::start();
        for side in [Side::White, Side::Black] {
            for (column, &piece) in START_BACK_ROW.iter().enumerate() {
                if let Some(square) = Square::from_row_column(side.back_row(), column as u8) {
                    position.place(BoardPiece::unmoved(piece, side, square));
                }
                if let Some(square) = Square::from_row_column(side.pawn_start_row(), column as u8) {
                    position.place(BoardPiece::unmoved(Piece::Pawn, side, square));
                }
            }
        }
        position
    }

    pub fn piece_at(&self, square: Square) -> Option<BoardPiece> {
        self.squares[square.index()]
    }

    pub(crate) fn is_piece_at(&self, square: Square, piece: Piece, side: Side) -> bool {
        matches!(self.piece_at(square), Some(bp) if bp.piece == piece && bp.side == side)
    }

    pub fn squares_of(&self, side: Side) -> &[Square] {
        self.square_lists.get(side)
    }

    pub fn to_move(&self) -> Side {
        self.state.to_move
    }

    pub fn en_passant_file(&self) -> Option<u8> {
        self.state.en_passant_file
    }

    pub fn castling_rights(&self) -> &CastlingRights {
        &self.state.castling_rights
    }

    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.squares_of(side)
            .iter()
            .copied()
            .find(|&sq| self.is_piece_at(sq, Piece::King, side))
    }

    /// Adds a piece to an empty square. Kings, rooks and pawns on their starting
    /// squares count as never moved.
    pub fn put_piece(&mut self, piece: Piece, side: Side, square: Square) -> Result<(), PositionError> {
        if self.piece_at(square).is_some() {
            return Err(PositionError::SquareOccupied(square));
        }
        self.place(BoardPiece::unmoved(piece, side, square));
        Ok(())
    }

    pub fn remove_piece(&mut self, square: Square) -> Result<BoardPiece, PositionError> {
        self.lift(square)
    }

    fn place(&mut self, board_piece: BoardPiece) {
        debug_assert!(
            self.squares[board_piece.square.index()].is_none(),
            "placing onto occupied square {}",
            board_piece.square
        );
        self.squares[board_piece.square.index()] = Some(board_piece);
        self.square_lists
            .get_mut(board_piece.side)
            .push(board_piece.square);
    }

    fn lift(&mut self, square: Square) -> Result<BoardPiece, PositionError> {
        let board_piece = self.squares[square.index()].ok_or(PositionError::RemoveNoPiece(square))?;
        let list = self.square_lists.get_mut(board_piece.side);
        let list_idx = list
            .iter()
            .position(|&sq| sq == square)
            .ok_or(PositionError::PieceListMismatch(square))?;
        list.remove(list_idx);
        self.squares[square.index()] = None;
        Ok(board_piece)
    }

    /// True when the square lists and the occupancy array describe the same pieces.
    pub fn is_consistent(&self) -> bool {
        let occupied = self.squares.iter().flatten().count();
        let listed = self.square_lists.white.len() + self.square_lists.black.len();
        occupied == listed
            && [Side::White, Side::Black].iter().all(|&side| {
                self.squares_of(side).iter().all(|&sq| {
                    matches!(self.piece_at(sq), Some(bp) if bp.side == side && bp.square == sq)
                })
            })
    }

    fn check_move(&self, mve: Move, moving: BoardPiece) -> Result<(), PositionError> {
        let inconsistent =
            |reason: &'static str| -> Result<(), PositionError> { Err(PositionError::InconsistentMove { mve, reason }) };
        let side = moving.side;
        let target = self.piece_at(mve.dest);

        match mve.flag {
            MoveFlag::EnPassant => {
                if moving.piece != Piece::Pawn || target.is_some() {
                    return inconsistent("en passant needs a pawn moving to an empty square");
                }
                let victim = mve.dest.offset(-side.forward_rows(), 0);
                if !matches!(victim, Some(sq) if self.is_piece_at(sq, Piece::Pawn, side.opposite_side())) {
                    return inconsistent("no pawn to capture en passant");
                }
            }
            flag if flag.is_capture() => {
                if !matches!(target, Some(bp) if bp.side != side) {
                    return inconsistent("capture without an opposing piece on the destination");
                }
            }
            _ => {
                if target.is_some() {
                    return inconsistent("destination is occupied");
                }
            }
        }

        if (mve.flag.is_promotion() || mve.flag == MoveFlag::DoublePawnPush) && moving.piece != Piece::Pawn {
            return inconsistent("only pawns push twice or promote");
        }
        if moving.piece == Piece::Pawn && mve.dest.row() == side.promotion_row() && !mve.flag.is_promotion() {
            return inconsistent("pawn reaching the last rank must promote");
        }

        if let Some((king_src, _, rook_src, _)) = mve.flag.castle_squares() {
            if moving.piece != Piece::King || mve.flag.castle_side() != Some(side) || mve.src != king_src {
                return inconsistent("castle flag for the wrong piece");
            }
            let king_side = rook_src.column() > king_src.column();
            if !self.state.castling_rights.get(side, king_side) {
                return inconsistent("castling right not held");
            }
            if !self.is_piece_at(rook_src, Piece::Rook, side) {
                return inconsistent("no rook to castle with");
            }
            // Covers the rook's destination on both wings.
            let d_column = if king_side { 1 } else { -1 };
            let path_blocked = king_src
                .ray(0, d_column)
                .take_while(|&sq| sq != rook_src)
                .any(|sq| self.piece_at(sq).is_some());
            if path_blocked {
                return inconsistent("pieces between king and rook");
            }
        }
        Ok(())
    }

    /// Plays `mve` on this board. The move is validated against the board before
    /// anything changes, so an `Err` leaves the position untouched.
    pub fn make_move(&mut self, mve: Move) -> Result<(), PositionError> {
        let moving = self
            .piece_at(mve.src)
            .ok_or(PositionError::MoveNoPiece(mve.src))?;
        let side = moving.side;

        if side != self.state.to_move {
            return Err(PositionError::MoveNotToMove(side, mve.src, mve.dest));
        }
        self.check_move(mve, moving)?;

        let captured_square = match mve.flag {
            MoveFlag::EnPassant => mve.dest.offset(-side.forward_rows(), 0),
            flag if flag.is_capture() => Some(mve.dest),
            _ => None,
        };
        if let Some(captured_square) = captured_square {
            self.lift(captured_square)?;
        }

        let mut moved = self.lift(mve.src)?;
        moved.square = mve.dest;
        moved.never_moved = false;
        if let Some(promotion) = mve.promotion() {
            moved.piece = promotion;
        }
        self.place(moved);

        if let Some((_, _, rook_src, rook_dest)) = mve.flag.castle_squares() {
            let mut rook = self.lift(rook_src)?;
            rook.square = rook_dest;
            rook.never_moved = false;
            self.place(rook);
        }

        self.state.castling_rights.revoke_square(mve.src);
        self.state.castling_rights.revoke_square(mve.dest);

        self.state.en_passant_file = if mve.flag == MoveFlag::DoublePawnPush {
            Some(mve.src.column())
        } else {
            None
        };

        if moving.piece == Piece::Pawn || captured_square.is_some() {
            self.state.half_move_clock = 0;
        } else {
            self.state.half_move_clock = self.state.half_move_clock.saturating_add(1);
        }
        if side == Side::Black {
            self.state.full_move_counter += 1;
        }
        self.state.to_move = side.opposite_side();

        debug_assert!(self.is_consistent(), "piece lists out of step after {:?}\n{}", mve, self);
        Ok(())
    }

    /// Plays `mve` on a copy, leaving `self` untouched.
    pub fn apply_move(&self, mve: Move) -> Result<Position, PositionError> {
        let mut next = self.clone();
        next.make_move(mve)?;
        Ok(next)
    }

    /// The same position with colours swapped and the board flipped top to bottom.
    pub fn mirrored(&self) -> Position {
        let mut mirrored = Position::empty();
        for board_piece in self.squares.iter().flatten() {
            mirrored.place(BoardPiece {
                side: board_piece.side.opposite_side(),
                square: board_piece.square.mirror(),
                ..*board_piece
            });
        }
        let rights = self.state.castling_rights;
        mirrored.state = State {
            to_move: self.state.to_move.opposite_side(),
            castling_rights: CastlingRights::new(
                rights.black_king_side,
                rights.black_queen_side,
                rights.white_king_side,
                rights.white_queen_side,
            ),
            ..self.state
        };
        mirrored
    }
}

// List order depends on move history, so only occupancy and state are compared.
impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state && self.squares == other.squares
    }
}

impl Eq for Position {}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut board_str = String::with_capacity(64 + 7);
        for (idx, square) in Square::list_white_perspective().into_iter().enumerate() {
            let ch = self.piece_at(square).map_or('.', BoardPiece::to_char);
            board_str.push(ch);
            if (idx + 1) % 8 == 0 && idx != 63 {
                board_str.push('\n');
            }
        }
        write!(f, "{}", board_str)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self, self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use testresult::TestResult;

    #[test]
    fn test_display() {
        let got = Position::start();
        let want = "rnbqkbnr\npppppppp\n........\n........\n........\n........\nPPPPPPPP\nRNBQKBNR";

        assert_eq!(format!("{}", got), want);
    }

    #[test]
    fn test_state_start() {
        let pos = Position::start();

        assert!(pos.state.castling_rights.white_king_side);
        assert!(pos.state.castling_rights.white_queen_side);
        assert!(pos.state.castling_rights.black_king_side);
        assert!(pos.state.castling_rights.black_queen_side);

        assert_eq!(pos.state.half_move_clock, 0);
        assert_eq!(pos.en_passant_file(), None);
        assert_eq!(pos.to_move(), Side::White);
        assert_eq!(pos.squares_of(Side::White).len(), 16);
        assert_eq!(pos.squares_of(Side::Black).len(), 16);
        assert!(pos.is_consistent());
    }

    #[test_case(Position::start(), Move::new(D2, D4, MoveFlag::DoublePawnPush))]
    #[test_case(Position::start(), Move::quiet(G1, F3))]
    fn test_make_move(mut position: Position, mve: Move) -> TestResult {
        assert!(position.piece_at(mve.src).is_some());
        assert!(position.piece_at(mve.dest).is_none());

        position.make_move(mve)?;

        assert!(position.piece_at(mve.src).is_none());
        assert!(position.piece_at(mve.dest).is_some());
        assert!(!position.squares_of(Side::White).contains(&mve.src));
        assert!(position.squares_of(Side::White).contains(&mve.dest));
        assert!(position.is_consistent());
        Ok(())
    }

    #[test_case(Position::start(), Move::new(D7, D5, MoveFlag::DoublePawnPush), PositionError::MoveNotToMove(Side::Black, D7, D5) ; "wrong side")]
    #[test_case(Position::start(), Move::quiet(D4, D5), PositionError::MoveNoPiece(D4) ; "no piece")]
    fn test_make_move_err(mut position: Position, mve: Move, want: PositionError) {
        assert_eq!(position.make_move(mve), Err(want));
    }

    #[test_case(Position::start(), Move::capture(D2, D3) ; "capture of empty square")]
    #[test_case(Position::start(), Move::quiet(D1, D2) ; "quiet onto own piece")]
    #[test_case(Position::start(), Move::new(E1, G1, MoveFlag::WhiteKingCastle) ; "castle through pieces still needs empty dest")]
    #[test_case(Position::start(), Move::new(G1, F3, MoveFlag::DoublePawnPush) ; "knight double push")]
    #[test_case(Position::from_fen("4k3/8/8/8/8/8/8/4KB1R w K - 0 1").unwrap(), Move::new(E1, G1, MoveFlag::WhiteKingCastle) ; "castle onto occupied rook destination")]
    #[test_case(Position::from_fen("4k3/8/8/8/8/8/8/3K3R w - - 0 1").unwrap(), Move::new(D1, G1, MoveFlag::WhiteKingCastle) ; "castle from off the king square")]
    #[test_case(Position::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 0 1").unwrap(), Move::new(E1, G1, MoveFlag::WhiteKingCastle) ; "castle without the right")]
    #[test_case(Position::from_fen("rn2k3/8/8/8/8/8/8/4K3 b q - 0 1").unwrap(), Move::new(E8, C8, MoveFlag::BlackQueenCastle) ; "queen side castle past a knight")]
    fn test_make_move_inconsistent(mut position: Position, mve: Move) {
        let before = position.clone();
        let got = position.make_move(mve);
        assert!(matches!(got, Err(PositionError::InconsistentMove { .. })), "{:?}", got);
        assert_eq!(position, before);
        assert!(position.is_consistent());
    }

    #[test]
    fn test_make_move_sets_en_passant_file() -> TestResult {
        let mut position = Position::start();
        position.make_move(Move::new(A2, A4, MoveFlag::DoublePawnPush))?;
        assert_eq!(position.en_passant_file(), Some(0));

        position.make_move(Move::quiet(G8, F6))?;
        assert_eq!(position.en_passant_file(), None);
        Ok(())
    }

    #[test]
    fn test_make_move_en_passant_removes_pawn() -> TestResult {
        let mut position = Position::from_fen("4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 1")?;
        position.make_move(Move::new(D5, E6, MoveFlag::EnPassant))?;

        assert_eq!(position.piece_at(E5), None);
        assert!(position.is_piece_at(E6, Piece::Pawn, Side::White));
        assert!(position.squares_of(Side::Black).iter().all(|&sq| sq == E8));
        assert!(position.is_consistent());
        Ok(())
    }

    #[test]
    fn test_make_move_castle_moves_rook() -> TestResult {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")?;
        position.make_move(Move::new(E1, G1, MoveFlag::WhiteKingCastle))?;

        assert!(position.is_piece_at(G1, Piece::King, Side::White));
        assert!(position.is_piece_at(F1, Piece::Rook, Side::White));
        assert_eq!(position.piece_at(H1), None);
        assert!(!position.castling_rights().any(Side::White));
        assert!(position.castling_rights().any(Side::Black));
        Ok(())
    }

    #[test]
    fn test_make_move_promotion() -> TestResult {
        let mut position = Position::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1")?;
        position.make_move(Move::new(A7, B8, MoveFlag::QueenPromotionCapture))?;

        assert!(position.is_piece_at(B8, Piece::Queen, Side::White));
        assert_eq!(position.squares_of(Side::Black), &[E8]);
        Ok(())
    }

    #[test]
    fn test_capturing_rook_removes_castling_rights() -> TestResult {
        let mut position =
            Position::from_fen("r3k2r/p1pp1pb1/bn2pnN1/2qP4/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 1 2")?;
        position.make_move(Move::capture(G6, H8))?;

        assert!(!position.castling_rights().black_king_side);
        assert!(position.castling_rights().black_queen_side);
        Ok(())
    }

    #[test]
    fn test_apply_move_leaves_original() -> TestResult {
        let position = Position::start();
        let next = position.apply_move(Move::new(E2, E4, MoveFlag::DoublePawnPush))?;

        assert_eq!(position, Position::start());
        assert_ne!(next, position);
        assert_eq!(next.to_move(), Side::Black);
        Ok(())
    }

    #[test]
    fn test_put_and_remove_piece() -> TestResult {
        let mut position = Position::empty();
        position.put_piece(Piece::Rook, Side::White, H1)?;
        assert_eq!(
            position.put_piece(Piece::Knight, Side::Black, H1),
            Err(PositionError::SquareOccupied(H1))
        );
        assert!(position.piece_at(H1).is_some_and(|bp| bp.never_moved));

        let removed = position.remove_piece(H1)?;
        assert_eq!(removed.piece, Piece::Rook);
        assert_eq!(position.remove_piece(H1), Err(PositionError::RemoveNoPiece(H1)));
        assert!(position.squares_of(Side::White).is_empty());
        Ok(())
    }

    #[test]
    fn test_mirrored() -> TestResult {
        let position = Position::from_fen("4k3/2p5/8/8/8/5N2/PP6/4K2R w K - 0 1")?;
        let want = Position::from_fen("4k2r/pp6/5n2/8/8/8/2P5/4K3 b k - 0 1")?;

        assert_eq!(position.mirrored(), want);
        assert_eq!(position.mirrored().mirrored(), position);
        Ok(())
    }
}
