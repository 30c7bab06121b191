pub mod evaluation;
pub mod move_gen;
pub mod moves;
pub mod perft;
pub mod position;
pub mod search;
pub mod square;

pub use evaluation::{
    EvalError, EvaluatePosition, IsolationRule, MaterialEvaluator, MaterialParams, NullEvaluator,
    PieceSquareEvaluator, PieceSquareParams, Score,
};
pub use move_gen::{find_legal_move, gen_legal_moves, gen_piece_moves, gen_pseudo_legal_moves, MoveGenError};
pub use moves::{Move, MoveError, MoveFlag};
pub use perft::{perft, perft_full, PerftDepthResult, PerftResult};
pub use position::{BoardPiece, CastlingRights, FenParseError, Piece, Position, PositionError, Side};
pub use search::{GreedySelector, RandomSelector, SelectError, SelectMove};
pub use square::Square;
