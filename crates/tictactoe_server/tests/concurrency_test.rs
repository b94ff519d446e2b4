//! Concurrent access to the game service.

use tempfile::NamedTempFile;
use tictactoe_engine::{GameMode, GameStatus, MoveError, Outcome};
use tictactoe_server::{GameRepository, GameService, ServiceError};

fn setup_service() -> (NamedTempFile, GameService) {
    let db = NamedTempFile::new().expect("Failed to create temp file");
    let path = db.path().to_str().expect("Invalid path").to_string();
    let repo = GameRepository::open(path).expect("Failed to open repository");
    (db, GameService::new(repo))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_submissions_for_one_cell() {
    let (_db, service) = setup_service();
    let game = service
        .create_game(GameMode::HumanVsAutomated)
        .await
        .expect("Create failed");
    let id = game.id();

    let a = tokio::spawn({
        let service = service.clone();
        async move { service.play(id, 1, 1).await }
    });
    let b = tokio::spawn({
        let service = service.clone();
        async move { service.play(id, 1, 1).await }
    });
    let results = [a.await.unwrap(), b.await.unwrap()];

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1, "exactly one submission wins: {results:?}");
    let rejected = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        rejected,
        ServiceError::Move(MoveError::CellOccupied { x: 1, y: 1 })
            | ServiceError::ConcurrentConflict { .. }
    ));

    let stored = service.get_game(id).await.expect("Game exists");
    assert_eq!(stored.moves().len(), 2);
    assert_eq!(
        stored
            .moves()
            .iter()
            .filter(|m| m.cell().x() == 1 && m.cell().y() == 1)
            .count(),
        1
    );
    assert!(service.locks().active() == 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_games_all_draw() {
    let (_db, service) = setup_service();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                let game = service.create_game(GameMode::HumanVsAutomated).await?;
                let mut last = game;
                for (x, y) in [(1, 1), (2, 0), (0, 1), (1, 2), (2, 2)] {
                    last = service.play(last.id(), x, y).await?;
                }
                Ok::<_, ServiceError>(last)
            })
        })
        .collect();

    for task in tasks {
        let last = task.await.unwrap().expect("Game should complete");
        assert_eq!(last.game().status(), GameStatus::Finished);
        assert_eq!(last.game().winner(), Outcome::Draw);
        assert_eq!(last.moves().len(), 9);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_delete_serialized_with_moves() {
    let (_db, service) = setup_service();
    let game = service
        .create_game(GameMode::HumanVsHuman)
        .await
        .expect("Create failed");
    let id = game.id();

    let play = tokio::spawn({
        let service = service.clone();
        async move { service.play(id, 0, 0).await }
    });
    let delete = tokio::spawn({
        let service = service.clone();
        async move { service.delete_game(id).await }
    });

    let played = play.await.unwrap();
    delete.await.unwrap().expect("Delete failed");

    // Whichever ran first, the game and all its moves are gone afterwards.
    if let Err(err) = played {
        assert!(matches!(err, ServiceError::GameNotFound { .. }), "{err}");
    }
    assert!(matches!(
        service.get_game(id).await,
        Err(ServiceError::GameNotFound { .. })
    ));
}
