//! Integration tests for encore-core services
//!
//! These tests verify end-to-end functionality that needs no database:
//! session token lifecycle, permission evaluation, and pagination tokens.
//!
//! Run with: cargo test --test integration_tests

use encore_core::{
    models::{
        effective_page_size, next_page_token, parse_page_token, EventListQuery, RoleFacts, UserId,
    },
    service::{permission, JwtService},
};

const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";

fn create_test_jwt_service() -> JwtService {
    JwtService::new(TEST_SECRET, 15).expect("Failed to create JWT service")
}

#[test]
fn access_token_round_trip() {
    let jwt_service = create_test_jwt_service();
    let user_id = UserId::new();

    let (token, issued_at, expires_at) = jwt_service.sign_access_token(&user_id).unwrap();

    let claims = jwt_service.verify_access_token(&token).unwrap();
    assert_eq!(claims.sub, user_id.as_str());
    assert!(claims.is_access_token());
    assert_eq!(claims.iat, issued_at.timestamp());
    assert_eq!(claims.exp, expires_at.timestamp());

    // 15-minute lifetime
    assert_eq!(claims.exp - claims.iat, 15 * 60);
}

#[test]
fn token_from_another_deployment_is_rejected() {
    let jwt_service = create_test_jwt_service();
    let other =
        JwtService::new(b"some-other-deployment-secret-xyz!", 15).expect("jwt service");

    let user_id = UserId::new();
    let (token, _, _) = other.sign_access_token(&user_id).unwrap();

    assert!(jwt_service.verify_access_token(&token).is_err());
}

#[test]
fn malformed_tokens_are_rejected() {
    let jwt_service = create_test_jwt_service();

    assert!(jwt_service.verify_token("invalid.token").is_err());
    assert!(jwt_service.verify_token("").is_err());

    let user_id = UserId::new();
    let (token, _, _) = jwt_service.sign_access_token(&user_id).unwrap();
    let mut parts: Vec<&str> = token.split('.').collect();
    parts[2] = "forged-signature";
    assert!(jwt_service.verify_token(&parts.join(".")).is_err());
}

#[test]
fn permission_matrix_covers_every_gate() {
    let caller = UserId::new();
    let other = UserId::new();

    // No facts: only self-service role joining is allowed
    let none = RoleFacts::default();
    assert!(!permission::can_edit_events(&none));
    assert!(!permission::can_edit_tracklist(&none));
    assert!(!permission::can_edit_song(&none, Some(&other), &caller));
    assert!(permission::can_join_role(&none, &caller, &caller));
    assert!(!permission::can_join_role(&none, &other, &caller));

    // Full facts: everything allowed
    let all = RoleFacts::all();
    assert!(permission::can_edit_events(&all));
    assert!(permission::can_edit_tracklist(&all));
    assert!(permission::can_edit_song(&all, None, &caller));
    assert!(permission::can_join_role(&all, &other, &caller));

    // Song creator keeps edit rights without any facts
    assert!(permission::can_edit_song(&none, Some(&caller), &caller));
}

#[test]
fn event_limit_and_song_page_clamping() {
    let query = EventListQuery {
        limit: Some(1000),
        ..EventListQuery::default()
    };
    assert_eq!(query.effective_limit(), 50);

    assert_eq!(effective_page_size(Some(1000)), 20);
    assert_eq!(effective_page_size(Some(100)), 100);
}

#[test]
fn song_page_tokens_walk_the_listing() {
    // Full first page -> token points at the next offset
    let token = next_page_token(0, 20, 20);
    assert_eq!(parse_page_token(Some(&token)), 20);

    // Short page -> listing exhausted
    assert_eq!(next_page_token(20, 20, 3), "");

    // Garbage tokens restart from the top instead of erroring
    assert_eq!(parse_page_token(Some("not-a-number")), 0);
}
