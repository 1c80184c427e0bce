//! Integration tests for the join protocol.
//!
//! These tests drive `TournamentManager` against the in-memory repositories,
//! covering sequential joins, joins through registration codes and concurrent
//! joins racing for the last places.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tournamate::db::{InMemoryStore, MembershipRepository, Repositories, TournamentRepository};
use tournamate::events::{DomainEvent, RecordingPublisher};
use tournamate::tournament::{
    CodeAllocator, Tournament, TournamentConfig, TournamentError, TournamentManager,
    TournamentRecord, TournamentStatus, UserId,
};

fn config(max_participants: u32) -> TournamentConfig {
    TournamentConfig {
        title: "Saturday Scramble".to_string(),
        description: Some("Four-ball scramble".to_string()),
        game: "Golf".to_string(),
        location: "Riverside".to_string(),
        start_at: Utc::now() + Duration::days(3),
        end_at: Some(Utc::now() + Duration::days(3) + Duration::hours(5)),
        prize_pool: None,
        rules: None,
        max_participants,
    }
}

fn setup() -> (TournamentManager, Repositories, Arc<RecordingPublisher>) {
    let repos = Repositories::in_memory();
    let publisher = Arc::new(RecordingPublisher::new());
    let manager = TournamentManager::new(&repos, publisher.clone(), CodeAllocator::default());
    (manager, repos, publisher)
}

async fn create(manager: &TournamentManager, max_participants: u32) -> Tournament {
    manager
        .create_tournament(UserId::new_v4(), config(max_participants))
        .await
        .expect("Failed to create tournament")
}

async fn member_count(repos: &Repositories, tournament: &Tournament) -> u32 {
    repos.memberships.count_members(tournament.id).await.unwrap()
}

#[tokio::test]
async fn test_join_scenario_with_two_places() {
    let (manager, repos, _) = setup();
    let t = create(&manager, 2).await;
    let (u1, u2, u3) = (UserId::new_v4(), UserId::new_v4(), UserId::new_v4());

    manager.join_by_tournament(u1, t.id).await.unwrap();
    assert_eq!(member_count(&repos, &t).await, 1);

    let err = manager.join_by_tournament(u1, t.id).await.unwrap_err();
    assert!(matches!(err, TournamentError::AlreadyJoined));
    assert_eq!(member_count(&repos, &t).await, 1);

    manager.join_by_tournament(u2, t.id).await.unwrap();
    assert_eq!(member_count(&repos, &t).await, 2);

    let err = manager.join_by_tournament(u3, t.id).await.unwrap_err();
    assert!(matches!(err, TournamentError::TournamentFull));
    assert_eq!(member_count(&repos, &t).await, 2);
}

#[tokio::test]
async fn test_single_place_tournament() {
    let (manager, _, _) = setup();
    let t = create(&manager, 1).await;

    assert!(manager.join_by_tournament(UserId::new_v4(), t.id).await.is_ok());
    let err = manager
        .join_by_tournament(UserId::new_v4(), t.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::TournamentFull));
}

#[tokio::test]
async fn test_join_by_code_any_case() {
    let (manager, _, _) = setup();
    let t = create(&manager, 4).await;

    let upper = manager
        .join_by_code(UserId::new_v4(), &t.registration_code)
        .await
        .unwrap();
    let lower = manager
        .join_by_code(UserId::new_v4(), &t.registration_code.to_lowercase())
        .await
        .unwrap();
    assert_eq!(upper.tournament_id, t.id);
    assert_eq!(lower.tournament_id, t.id);
}

#[tokio::test]
async fn test_unknown_code_is_invalid_in_any_case() {
    let (manager, _, _) = setup();
    create(&manager, 4).await;

    for code in ["golf-1234ab", "GOLF-1234AB"] {
        let err = manager
            .join_by_code(UserId::new_v4(), code)
            .await
            .unwrap_err();
        assert!(
            matches!(&err, TournamentError::InvalidCode(c) if c == "GOLF-1234AB"),
            "{code}: {err:?}"
        );
    }
}

#[tokio::test]
async fn test_completed_tournament_closed_despite_capacity() {
    let store = Arc::new(InMemoryStore::new());
    let repos = Repositories::from_store(store.clone());
    let manager = TournamentManager::new(
        &repos,
        Arc::new(RecordingPublisher::new()),
        CodeAllocator::default(),
    );

    store
        .insert_tournament(&TournamentRecord {
            registration_code: "GOLF-1234AB".to_string(),
            status: TournamentStatus::Completed,
            created_by: UserId::new_v4(),
            config: config(50),
        })
        .await
        .unwrap();

    let err = manager
        .join_by_code(UserId::new_v4(), "golf-1234ab")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TournamentError::RegistrationClosed(TournamentStatus::Completed)
    ));
}

#[tokio::test]
async fn test_join_by_code_propagates_join_failures() {
    let (manager, _, _) = setup();
    let t = create(&manager, 1).await;
    let user = UserId::new_v4();

    manager.join_by_code(user, &t.registration_code).await.unwrap();

    let err = manager
        .join_by_code(user, &t.registration_code)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::AlreadyJoined));

    let err = manager
        .join_by_code(UserId::new_v4(), &t.registration_code)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::TournamentFull));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_never_exceed_capacity() {
    let (manager, repos, _) = setup();
    let t = create(&manager, 5).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let manager = manager.clone();
        let tournament_id = t.id;
        handles.push(tokio::spawn(async move {
            manager
                .join_by_tournament(UserId::new_v4(), tournament_id)
                .await
        }));
    }

    let mut admitted = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(TournamentError::TournamentFull) => full += 1,
            Err(e) => panic!("unexpected join error: {e}"),
        }
    }

    assert_eq!(admitted, 5);
    assert_eq!(full, 15);
    assert_eq!(member_count(&repos, &t).await, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_joins_admit_once() {
    let (manager, repos, _) = setup();
    let t = create(&manager, 10).await;
    let user = UserId::new_v4();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = manager.clone();
        let tournament_id = t.id;
        handles.push(tokio::spawn(async move {
            manager.join_by_tournament(user, tournament_id).await
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(TournamentError::AlreadyJoined) => {}
            Err(e) => panic!("unexpected join error: {e}"),
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(member_count(&repos, &t).await, 1);
}

#[tokio::test]
async fn test_events_follow_successful_operations_only() {
    let (manager, _, publisher) = setup();
    let t = create(&manager, 1).await;
    let user = UserId::new_v4();

    manager.join_by_tournament(user, t.id).await.unwrap();
    let _ = manager.join_by_tournament(user, t.id).await;
    let _ = manager.join_by_tournament(UserId::new_v4(), t.id).await;

    let events = publisher.wait_for_events(2).await;
    assert_eq!(events.len(), 2);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, DomainEvent::TournamentCreated { .. }))
    );
    assert!(events.contains(&DomainEvent::TournamentJoined {
        tournament_id: t.id,
        user_id: user,
    }));
}
