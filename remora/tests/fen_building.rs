extern crate remora;

use remora::position::fen::{ALL_FENS, START_POS_FEN};
use remora::position::FenBuildError;
use remora::{Player, Position};

#[test]
fn round_trips_every_test_position() {
    for fen in ALL_FENS.iter() {
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(&pos.fen(), fen, "fen round trip failed");

        let again = Position::from_fen(&pos.fen()).unwrap();
        assert_eq!(pos, again);
        assert_eq!(pos.zobrist(), again.zobrist());
        assert_eq!(pos.pawn_key(), again.pawn_key());
    }
}

#[test]
fn optional_counters_default() {
    let pos = Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").unwrap();
    assert_eq!(pos.halfmove_clock(), 0);
    assert_eq!(pos.fullmove_number(), 1);
    assert_eq!(pos.fen(), START_POS_FEN);
}

#[test]
fn rejects_missing_sections() {
    assert!(matches!(
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq"),
        Err(FenBuildError::NotEnoughSections { sections: 3 })
    ));
    assert!(Position::from_fen("").is_err());
}

#[test]
fn rejects_malformed_boards() {
    // Rank with only seven files.
    assert!(Position::from_fen("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
    // Rank with nine files.
    assert!(
        Position::from_fen("rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err()
    );
    // Only seven ranks.
    assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
    // Unknown piece letter.
    assert!(
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1").is_err()
    );
}

#[test]
fn rejects_bad_side_and_counters() {
    assert!(matches!(
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1"),
        Err(FenBuildError::UnrecognizedTurn { .. })
    ));
    assert!(
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1").is_err()
    );
}

#[test]
fn rejects_castling_not_matching_the_board() {
    // The white king has moved off e1, yet the FEN claims both white rights.
    assert!(matches!(
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1KNR w KQkq - 0 1"),
        Err(FenBuildError::CastlingMismatch { .. })
    ));
    // The king-side rook is gone.
    assert!(matches!(
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN1 w K - 0 1"),
        Err(FenBuildError::CastlingMismatch { letter: 'K' })
    ));
    // Bad castling letter.
    assert!(
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w X - 0 1").is_err()
    );
}

#[test]
fn rejects_bad_en_passant() {
    // No pawn behind the claimed en-passant square.
    assert!(matches!(
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e6 0 1"),
        Err(FenBuildError::EPSquareInvalid { .. })
    ));
    // Wrong rank for the side to move.
    assert!(
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e3 0 1").is_err()
    );
    // Unreadable square.
    assert!(
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq i6 0 1").is_err()
    );
}

#[test]
fn rejects_illegal_positions() {
    // No black king.
    assert!(matches!(
        Position::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
        Err(FenBuildError::IncorrectKingNum {
            player: Player::Black,
            num: 0
        })
    ));
    // Two white kings.
    assert!(Position::from_fen("4k3/8/8/8/8/8/8/2K1K3 w - - 0 1").is_err());
    // The side not to move is in check: white queen attacks the black king
    // while white is to move.
    assert!(matches!(
        Position::from_fen("4k3/4Q3/8/8/8/8/8/4K3 w - - 0 1"),
        Err(FenBuildError::OppositeCheck)
    ));
    // Pawn on the back rank.
    assert!(matches!(
        Position::from_fen("P3k3/8/8/8/8/8/8/4K3 w - - 0 1"),
        Err(FenBuildError::PawnOnBackRank)
    ));
}
