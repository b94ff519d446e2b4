//! Whole-game scenarios driven through the state machine.

use tictactoe_engine::{Cell, Game, GameMode, GameStatus, Move, MoveError, Outcome, Player};

/// Plays `cells` in order, feeding each transition into the next step.
fn play_all(mode: GameMode, cells: &[(i64, i64)]) -> (Game, Vec<Move>) {
    let mut game = Game::new(1, mode);
    let mut moves = Vec::new();
    for &(x, y) in cells {
        let cell = Cell::try_new(x, y).expect("Valid cell");
        let (next, _, history) = game.apply_move(&moves, cell).expect("Valid move").into_parts();
        game = next;
        moves = history;
    }
    (game, moves)
}

fn coords(moves: &[Move]) -> Vec<(u8, u8)> {
    moves.iter().map(|m| (m.cell().x(), m.cell().y())).collect()
}

#[test]
fn test_automated_game_ends_in_draw() {
    let human = [(1, 1), (2, 0), (0, 1), (1, 2)];
    let mut game = Game::new(1, GameMode::HumanVsAutomated);
    let mut moves = Vec::new();

    for (i, &(x, y)) in human.iter().enumerate() {
        let step = game
            .apply_move(&moves, Cell::try_new(x, y).unwrap())
            .expect("Valid move");
        assert_eq!(step.game().status(), GameStatus::InProgress);
        assert_eq!(step.game().winner(), Outcome::Undetermined);
        assert_eq!(step.game().active_turn(), Some(Player::Human));
        assert_eq!(step.moves().len(), (i + 1) * 2);
        game = *step.game();
        moves = step.moves().clone();
    }

    let step = game
        .apply_move(&moves, Cell::try_new(2, 2).unwrap())
        .expect("Valid move");
    assert_eq!(step.game().status(), GameStatus::Finished);
    assert_eq!(step.game().winner(), Outcome::Draw);
    assert_eq!(step.game().active_turn(), None);
    assert_eq!(step.moves().len(), 9);
}

#[test]
fn test_automated_replies_are_deterministic() {
    let (_, moves) = play_all(GameMode::HumanVsAutomated, &[(1, 1), (2, 0), (0, 1), (1, 2)]);
    assert_eq!(
        coords(&moves),
        vec![
            (1, 1),
            (0, 0),
            (2, 0),
            (0, 2),
            (0, 1),
            (2, 1),
            (1, 2),
            (1, 0)
        ]
    );
    let numbers: Vec<u32> = moves.iter().map(Move::number).collect();
    assert_eq!(numbers, (1..=8).collect::<Vec<_>>());
}

#[test]
fn test_automated_opponent_wins_in_three() {
    let (game, moves) = play_all(GameMode::HumanVsAutomated, &[(2, 2), (0, 2), (0, 0)]);
    assert_eq!(game.status(), GameStatus::Finished);
    assert_eq!(game.winner(), Outcome::Won(Player::Automated));
    assert_eq!(game.active_turn(), None);
    assert_eq!(moves.len(), 6);
    assert_eq!(coords(&moves)[5], (1, 0));
}

#[test]
fn test_human_game_won_by_first_player() {
    let (game, moves) = play_all(
        GameMode::HumanVsHuman,
        &[(1, 1), (0, 0), (1, 0), (0, 1), (1, 2)],
    );
    assert_eq!(game.status(), GameStatus::Finished);
    assert_eq!(game.winner(), Outcome::Won(Player::PlayerA));
    assert_eq!(game.active_turn(), None);
    assert_eq!(moves.len(), 5);
}

#[test]
fn test_human_game_ends_in_draw() {
    let (game, moves) = play_all(
        GameMode::HumanVsHuman,
        &[
            (1, 1),
            (0, 0),
            (0, 1),
            (2, 1),
            (0, 2),
            (2, 0),
            (1, 0),
            (1, 2),
            (2, 2),
        ],
    );
    assert_eq!(game.status(), GameStatus::Finished);
    assert_eq!(game.winner(), Outcome::Draw);
    assert_eq!(moves.len(), 9);
}

#[test]
fn test_no_move_after_finish() {
    let (game, moves) = play_all(
        GameMode::HumanVsHuman,
        &[(1, 1), (0, 0), (1, 0), (0, 1), (1, 2)],
    );
    let result = game.apply_move(&moves, Cell::try_new(2, 2).unwrap());
    assert_eq!(result, Err(MoveError::GameFinished));
}

#[test]
fn test_out_of_range_reported_before_state() {
    let err = Cell::try_new(3, 0).unwrap_err();
    assert_eq!(err, MoveError::OutOfRange { x: 3, y: 0 });
    assert_eq!(
        err.to_string(),
        "Incorrect input data. Coordinates should be between 0 and 2."
    );
}

#[test]
fn test_error_messages_identify_the_cell() {
    let (game, moves) = play_all(GameMode::HumanVsHuman, &[(1, 1)]);
    let err = game
        .apply_move(&moves, Cell::try_new(1, 1).unwrap())
        .unwrap_err();
    assert_eq!(err.to_string(), "Cell x:1, y: 1 was used.");
}
