//! PostgreSQL repository tests.
//!
//! Run with a database available:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

use chrono::Utc;
use std::sync::Arc;
use tournamate::contact::{ContactManager, ContactSubmission};
use tournamate::db::{
    ContactRepository, Database, DatabaseConfig, MembershipRepository, StoreError,
    TournamentRepository,
};
use tournamate::events::LogPublisher;
use tournamate::tournament::{
    AdmitOutcome, CodeAllocator, TournamentConfig, TournamentError, TournamentManager,
    TournamentRecord, TournamentStatus, UserId,
};

/// Helper to create a test database with the schema applied
async fn setup_test_db() -> Database {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| DatabaseConfig::development().database_url);

    let config = DatabaseConfig {
        database_url,
        max_connections: 10,
        min_connections: 1,
        ..DatabaseConfig::development()
    };

    let db = Database::new(&config)
        .await
        .expect("Failed to create test database");
    db.ensure_schema().await.expect("Failed to apply schema");
    db
}

fn config(max_participants: u32) -> TournamentConfig {
    TournamentConfig {
        title: "Integration Cup".to_string(),
        description: None,
        game: "Golf".to_string(),
        location: "Test Links".to_string(),
        start_at: Utc::now(),
        end_at: None,
        prize_pool: None,
        rules: None,
        max_participants,
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_duplicate_code_maps_to_store_error() {
    let db = setup_test_db().await;
    let repos = db.repositories();
    let record = TournamentRecord {
        registration_code: format!("TEST-{}", UserId::new_v4().simple()),
        status: TournamentStatus::Upcoming,
        created_by: UserId::new_v4(),
        config: config(4),
    };

    repos.tournaments.insert_tournament(&record).await.unwrap();
    let err = repos.tournaments.insert_tournament(&record).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateCode(_)));
    assert!(repos
        .tournaments
        .code_exists(&record.registration_code)
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_admit_member_respects_capacity() {
    let db = setup_test_db().await;
    let repos = db.repositories();
    let manager = TournamentManager::new(&repos, Arc::new(LogPublisher), CodeAllocator::default());

    let t = manager
        .create_tournament(UserId::new_v4(), config(1))
        .await
        .unwrap();
    let user = UserId::new_v4();

    assert!(matches!(
        repos.memberships.admit_member(t.id, user).await.unwrap(),
        AdmitOutcome::Admitted(_)
    ));
    assert_eq!(
        repos.memberships.admit_member(t.id, user).await.unwrap(),
        AdmitOutcome::AlreadyMember
    );
    assert_eq!(
        repos
            .memberships
            .admit_member(t.id, UserId::new_v4())
            .await
            .unwrap(),
        AdmitOutcome::Full
    );
    assert_eq!(
        repos
            .memberships
            .admit_member(i64::MAX, user)
            .await
            .unwrap(),
        AdmitOutcome::TournamentMissing
    );
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_concurrent_joins_against_postgres() {
    let db = setup_test_db().await;
    let repos = db.repositories();
    let manager = TournamentManager::new(&repos, Arc::new(LogPublisher), CodeAllocator::default());

    let t = manager
        .create_tournament(UserId::new_v4(), config(3))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..12 {
        let manager = manager.clone();
        let tournament_id = t.id;
        handles.push(tokio::spawn(async move {
            manager
                .join_by_tournament(UserId::new_v4(), tournament_id)
                .await
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(TournamentError::TournamentFull) => {}
            Err(e) => panic!("unexpected join error: {e}"),
        }
    }

    assert_eq!(admitted, 3);
    assert_eq!(repos.memberships.count_members(t.id).await.unwrap(), 3);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn test_contact_message_is_stored() {
    let db = setup_test_db().await;
    let repos = db.repositories();
    let manager = ContactManager::new(repos.contacts.clone());
    let marker = UserId::new_v4().simple().to_string();

    let stored = manager
        .submit_contact(ContactSubmission {
            name: " Integration ".to_string(),
            email: format!("{marker}@Example.com"),
            message: format!(" ping {marker} "),
        })
        .await
        .unwrap();

    assert_eq!(stored.email, format!("{marker}@example.com"));
    let all = repos.contacts.list_contacts().await.unwrap();
    assert!(all.contains(&stored));
}
