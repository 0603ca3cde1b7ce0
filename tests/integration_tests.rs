//! End-to-end integration tests

use attempt_tracker::attempts::{self, CompleteAttempt, CreateAttempt, STATUS_ACTIVE};
use attempt_tracker::auth::{self, token, AuthError, CarrierSet, Claims};
use attempt_tracker::config::CarrierPrecedence;
use attempt_tracker::storage::Database;
use chrono::{Duration, Utc};
use tempfile::TempDir;

const SECRET: &[u8] = b"integration-test-signing-secret";

fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

fn make_create(user_id: i64, test_id: i64, status: i32) -> CreateAttempt {
    CreateAttempt {
        status: Some(status),
        test_id: Some(test_id),
        user_id: Some(user_id),
    }
}

fn complete(user_id: i64, score: i32, status: i32, old_status: i32) -> CompleteAttempt {
    CompleteAttempt {
        old_status: Some(old_status),
        score: Some(score),
        status: Some(status),
        user_id: Some(user_id),
    }
}

#[test]
fn test_attempt_lifecycle() {
    let (db, _temp) = setup_db();

    // Start an attempt
    let attempt = attempts::create(&db, &make_create(7, 42, STATUS_ACTIVE)).unwrap();
    assert_eq!(attempt.id, 1);
    assert_eq!(attempt.status, STATUS_ACTIVE);
    assert!(attempt.score.is_none());

    // It is now the active attempt
    let active = attempts::get_active(&db, 7).unwrap();
    assert_eq!(active.test_id, 42);
    assert!(active.started_at <= Utc::now());

    // Complete it with a score
    let updated = attempts::transition(&db, &complete(7, 88, 2, STATUS_ACTIVE)).unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].status, 2);
    assert_eq!(updated[0].score, Some(88));
    assert!(updated[0].completed_at.is_some());

    // A duplicate completion finds nothing in the expected prior state
    let result = attempts::transition(&db, &complete(7, 88, 2, STATUS_ACTIVE));
    assert!(matches!(result, Err(attempts::AttemptError::NotFound)));

    // And there is no active attempt left
    assert!(matches!(
        attempts::get_active(&db, 7),
        Err(attempts::AttemptError::NotFound)
    ));
}

#[test]
fn test_racing_transitions_yield_one_winner() {
    let (db, _temp) = setup_db();

    attempts::create(&db, &make_create(7, 42, STATUS_ACTIVE)).unwrap();

    // Two callers race on the same stale state. The store serializes the
    // conditional update, so exactly one sees a matching row.
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..2)
            .map(|_| s.spawn(|| attempts::transition(&db, &complete(7, 88, 2, STATUS_ACTIVE))))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let wins = results.iter().filter(|r| r.is_ok()).count();
    let misses = results
        .iter()
        .filter(|r| matches!(r, Err(attempts::AttemptError::NotFound)))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(misses, 1);

    let record = attempts::list_all(&db, 7).unwrap().remove(0);
    assert_eq!(record.status, 2);
    assert_eq!(record.score, Some(88));
}

#[test]
fn test_history_is_most_recent_first_and_per_user() {
    let (db, _temp) = setup_db();

    for test_id in [10, 11, 12] {
        attempts::create(&db, &make_create(7, test_id, STATUS_ACTIVE)).unwrap();
    }
    attempts::create(&db, &make_create(8, 99, STATUS_ACTIVE)).unwrap();

    let history = attempts::list_all(&db, 7).unwrap();
    assert_eq!(history.len(), 3);
    for pair in history.windows(2) {
        assert!(pair[0].started_at >= pair[1].started_at);
    }

    assert_eq!(attempts::list_all(&db, 8).unwrap().len(), 1);
    assert!(attempts::list_all(&db, 9).unwrap().is_empty());
}

#[test]
fn test_token_gate_end_to_end() {
    let token = token::sign(SECRET, &Claims::new(7, Utc::now(), 3600));

    // Header carrier
    let carriers = CarrierSet {
        authorization: Some(format!("Bearer {token}")),
        cookie: None,
    };
    let principal =
        auth::authenticate(&carriers, CarrierPrecedence::HeaderFirst, SECRET, Utc::now()).unwrap();
    assert_eq!(principal.id, 7);

    // Cookie carrier
    let carriers = CarrierSet {
        authorization: None,
        cookie: Some(token.clone()),
    };
    let principal =
        auth::authenticate(&carriers, CarrierPrecedence::HeaderFirst, SECRET, Utc::now()).unwrap();
    assert_eq!(principal.id, 7);

    // No carriers
    let result = auth::authenticate(
        &CarrierSet::default(),
        CarrierPrecedence::HeaderFirst,
        SECRET,
        Utc::now(),
    );
    assert_eq!(result.unwrap_err(), AuthError::MissingCredential);

    // Wrong secret
    let carriers = CarrierSet {
        authorization: Some(format!("Bearer {token}")),
        cookie: None,
    };
    let result = auth::authenticate(
        &carriers,
        CarrierPrecedence::HeaderFirst,
        b"not-the-signing-secret",
        Utc::now(),
    );
    assert_eq!(result.unwrap_err(), AuthError::InvalidCredential);

    // Expired, checked with a fixed clock
    let issued = Utc::now() - Duration::hours(2);
    let stale = token::sign(SECRET, &Claims::new(7, issued, 3600));
    let carriers = CarrierSet {
        authorization: Some(format!("Bearer {stale}")),
        cookie: None,
    };
    let result = auth::authenticate(&carriers, CarrierPrecedence::HeaderFirst, SECRET, Utc::now());
    assert_eq!(result.unwrap_err(), AuthError::InvalidCredential);
}

#[test]
fn test_gate_precedence_is_configurable() {
    let header_token = token::sign(SECRET, &Claims::new(1, Utc::now(), 3600));
    let cookie_token = token::sign(SECRET, &Claims::new(2, Utc::now(), 3600));

    let carriers = CarrierSet {
        authorization: Some(format!("Bearer {header_token}")),
        cookie: Some(cookie_token),
    };

    let principal =
        auth::authenticate(&carriers, CarrierPrecedence::HeaderFirst, SECRET, Utc::now()).unwrap();
    assert_eq!(principal.id, 1);

    let principal =
        auth::authenticate(&carriers, CarrierPrecedence::CookieFirst, SECRET, Utc::now()).unwrap();
    assert_eq!(principal.id, 2);
}

#[test]
fn test_completed_attempt_can_transition_again() {
    let (db, _temp) = setup_db();

    attempts::create(&db, &make_create(7, 42, STATUS_ACTIVE)).unwrap();
    attempts::transition(&db, &complete(7, 88, 2, STATUS_ACTIVE)).unwrap();

    // No terminal state: supplying the current status as the guard works
    let updated = attempts::transition(&db, &complete(7, 95, 3, 2)).unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].status, 3);
    assert_eq!(updated[0].score, Some(95));
}
