// src/codec.rs
//
// Pure position/move-to-text primitives shared by the language adapters.
//
// Everything here is a deterministic function of (board, move): no state,
// no I/O. A move that is not legal for the board it is rendered against is
// an input-contract violation and propagates as an error.

use chess::{Board, BoardStatus, ChessMove, Color, Piece, Square};

use crate::types::EnvError;

/// Empty-square marker used in board token sequences.
pub const EMPTY_SQUARE: &str = ".";

/// Stable display name for a player.
pub fn player_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// Stable lowercase name for a piece kind.
pub fn piece_name(piece: Piece) -> &'static str {
    match piece {
        Piece::Pawn => "pawn",
        Piece::Knight => "knight",
        Piece::Bishop => "bishop",
        Piece::Rook => "rook",
        Piece::Queen => "queen",
        Piece::King => "king",
    }
}

/// FEN-style single-character token for the piece on `square`, or `"."`.
pub fn piece_token(board: &Board, square: Square) -> String {
    match (board.piece_on(square), board.color_on(square)) {
        (Some(piece), Some(color)) => {
            let c = match piece {
                Piece::Pawn => 'p',
                Piece::Knight => 'n',
                Piece::Bishop => 'b',
                Piece::Rook => 'r',
                Piece::Queen => 'q',
                Piece::King => 'k',
            };
            match color {
                Color::White => c.to_ascii_uppercase().to_string(),
                Color::Black => c.to_string(),
            }
        }
        _ => EMPTY_SQUARE.to_string(),
    }
}

/// Algebraic coordinate for a square ("e4").
pub fn square_name(square: Square) -> String {
    let file = (b'a' + square.get_file().to_index() as u8) as char;
    let rank = (b'1' + square.get_rank().to_index() as u8) as char;
    format!("{file}{rank}")
}

/// Cardinal-number spelling for small counts ("eight"), digits beyond.
pub fn count_to_words(n: u32) -> String {
    const WORDS: [&str; 21] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
        "nineteen", "twenty",
    ];
    match WORDS.get(n as usize) {
        Some(word) => (*word).to_string(),
        None => n.to_string(),
    }
}

/// Render an action as a basic clause: "White pawn from e2 to e4".
///
/// The board must be the position the move is played *from*; a move whose
/// origin square is empty cannot be rendered and signals a contract
/// violation.
pub fn move_phrase(board: &Board, mv: ChessMove) -> Result<String, EnvError> {
    let (piece, color) = piece_and_color_at(board, mv)?;
    Ok(format!(
        "{} from {} to {}",
        move_subject(color, piece),
        square_name(mv.get_source()),
        square_name(mv.get_dest()),
    ))
}

/// Subject of a move clause: "White pawn". Shared by both renderers so the
/// basic and elaborated forms of one action always open identically.
fn move_subject(color: Color, piece: Piece) -> String {
    format!("{} {}", player_name(color), piece_name(piece))
}

/// Elaborate an action into a fuller description using piece-kind-specific
/// phrasing rules: "White pawn moves forward two squares".
pub fn describe_move(board: &Board, mv: ChessMove) -> Result<String, EnvError> {
    let (piece, color) = piece_and_color_at(board, mv)?;
    let subject = move_subject(color, piece);
    let from = mv.get_source();
    let to = mv.get_dest();
    let file_delta = to.get_file().to_index() as i32 - from.get_file().to_index() as i32;
    let rank_delta = to.get_rank().to_index() as i32 - from.get_rank().to_index() as i32;
    // En passant lands on an empty square, so also treat a pawn's diagonal
    // step onto an empty square as a capture.
    let is_capture =
        board.piece_on(to).is_some() || (piece == Piece::Pawn && file_delta != 0);

    let clause = match piece {
        Piece::Pawn => {
            if let Some(promo) = mv.get_promotion() {
                format!("promotes to {} on {}", piece_name(promo), square_name(to))
            } else if is_capture {
                format!("captures diagonally on {}", square_name(to))
            } else {
                format!(
                    "moves forward {} {}",
                    count_to_words(rank_delta.unsigned_abs()),
                    plural_squares(rank_delta.unsigned_abs()),
                )
            }
        }
        Piece::Knight => format!(
            "jumps from {} to {}{}",
            square_name(from),
            square_name(to),
            capture_suffix(is_capture),
        ),
        Piece::Bishop => format!(
            "slides diagonally from {} to {}{}",
            square_name(from),
            square_name(to),
            capture_suffix(is_capture),
        ),
        Piece::Rook => {
            let axis = if file_delta == 0 { "file" } else { "rank" };
            format!(
                "slides along the {axis} from {} to {}{}",
                square_name(from),
                square_name(to),
                capture_suffix(is_capture),
            )
        }
        Piece::Queen => format!(
            "moves from {} to {}{}",
            square_name(from),
            square_name(to),
            capture_suffix(is_capture),
        ),
        Piece::King => {
            if file_delta.abs() == 2 {
                let side = if file_delta > 0 { "kingside" } else { "queenside" };
                format!("castles {side}")
            } else {
                format!(
                    "steps from {} to {}{}",
                    square_name(from),
                    square_name(to),
                    capture_suffix(is_capture),
                )
            }
        }
    };

    Ok(format!("{subject} {clause}"))
}

fn plural_squares(n: u32) -> &'static str {
    if n == 1 {
        "square"
    } else {
        "squares"
    }
}

fn capture_suffix(is_capture: bool) -> &'static str {
    if is_capture {
        ", capturing"
    } else {
        ""
    }
}

fn piece_and_color_at(board: &Board, mv: ChessMove) -> Result<(Piece, Color), EnvError> {
    match (board.piece_on(mv.get_source()), board.color_on(mv.get_source())) {
        (Some(piece), Some(color)) => Ok((piece, color)),
        _ => Err(EnvError::IllegalAction {
            action: format!(
                "{}{}",
                square_name(mv.get_source()),
                square_name(mv.get_dest())
            ),
            fen: board.to_string(),
        }),
    }
}

/// Formal game result as reported by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Ongoing,
    WhiteWins,
    BlackWins,
    Draw,
}

/// Map the rules engine's terminal signal onto a formal result.
pub fn formal_result(board: &Board) -> GameResult {
    match board.status() {
        BoardStatus::Ongoing => GameResult::Ongoing,
        BoardStatus::Stalemate => GameResult::Draw,
        BoardStatus::Checkmate => match board.side_to_move() {
            Color::White => GameResult::BlackWins,
            Color::Black => GameResult::WhiteWins,
        },
    }
}

/// Material signature: sum of piece-kind ordinals over all occupied squares.
///
/// The untouched 32-piece start position scores 74; any capture drops the
/// signature below that, which is what the first-capture sub-goal keys on.
pub fn material_signature(board: &Board) -> u32 {
    chess::ALL_SQUARES
        .iter()
        .filter_map(|sq| board.piece_on(*sq))
        .map(|piece| match piece {
            Piece::Pawn => 1,
            Piece::Knight => 2,
            Piece::Bishop => 3,
            Piece::Rook => 4,
            Piece::Queen => 5,
            Piece::King => 6,
        })
        .sum()
}

/// Signature of the untouched start position.
pub const FULL_MATERIAL_SIGNATURE: u32 = 74;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;
    use std::str::FromStr;

    #[test]
    fn test_count_to_words() {
        assert_eq!(count_to_words(0), "zero");
        assert_eq!(count_to_words(2), "two");
        assert_eq!(count_to_words(8), "eight");
        assert_eq!(count_to_words(42), "42");
    }

    #[test]
    fn test_move_phrase_start_pawn() {
        let board = Board::default();
        let mv = Action::new("e2e4").to_move().unwrap();
        assert_eq!(move_phrase(&board, mv).unwrap(), "White pawn from e2 to e4");
    }

    #[test]
    fn test_describe_move_pawn_double_step() {
        let board = Board::default();
        let mv = Action::new("e2e4").to_move().unwrap();
        assert_eq!(
            describe_move(&board, mv).unwrap(),
            "White pawn moves forward two squares"
        );
    }

    #[test]
    fn test_describe_move_knight() {
        let board = Board::default();
        let mv = Action::new("g1f3").to_move().unwrap();
        assert_eq!(
            describe_move(&board, mv).unwrap(),
            "White knight jumps from g1 to f3"
        );
    }

    #[test]
    fn test_phrase_and_description_share_the_subject() {
        let board = Board::default();
        for uci in ["e2e4", "g1f3", "b1c3", "h2h3"] {
            let mv = Action::new(uci).to_move().unwrap();
            let phrase = move_phrase(&board, mv).unwrap();
            let description = describe_move(&board, mv).unwrap();
            let subject = phrase.split(" from ").next().unwrap();
            assert!(
                description.starts_with(subject),
                "{description:?} does not open with {subject:?}"
            );
        }
    }

    #[test]
    fn test_phrase_from_empty_square_is_contract_violation() {
        let board = Board::default();
        let mv = Action::new("e4e5").to_move().unwrap();
        assert!(matches!(
            move_phrase(&board, mv),
            Err(EnvError::IllegalAction { .. })
        ));
    }

    #[test]
    fn test_formal_result_mapping() {
        assert_eq!(formal_result(&Board::default()), GameResult::Ongoing);

        // White to move and mated (Fool's mate).
        let black_wins =
            Board::from_str("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert_eq!(formal_result(&black_wins), GameResult::BlackWins);

        // Black to move and mated (Scholar's mate).
        let white_wins =
            Board::from_str("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 4")
                .unwrap();
        assert_eq!(formal_result(&white_wins), GameResult::WhiteWins);

        let stalemate = Board::from_str("5k2/5P2/5K2/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(formal_result(&stalemate), GameResult::Draw);
    }

    #[test]
    fn test_material_signature_full_board() {
        assert_eq!(material_signature(&Board::default()), FULL_MATERIAL_SIGNATURE);
    }

    #[test]
    fn test_material_signature_drops_after_capture() {
        // Scandinavian: 1. e4 d5 2. exd5 removes a black pawn.
        let board =
            Board::from_str("rnbqkbnr/ppp1pppp/8/3P4/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2").unwrap();
        assert!(material_signature(&board) < FULL_MATERIAL_SIGNATURE);
    }
}
