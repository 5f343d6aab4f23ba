// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Login, session validation and logout tests.

use time::{Duration, OffsetDateTime};
use vms_persistence::Persistence;

use crate::{
    ApiError, AuthError, AuthenticatedActor, AuthenticationService, LoginRequest, LoginResponse,
    LogoutRequest, Role, login, logout,
};

use super::helpers::{setup_test_persistence, test_now};

fn setup_with_users() -> Persistence {
    let mut persistence: Persistence = setup_test_persistence();
    persistence
        .create_user("admin", "admin-password", "Admin")
        .expect("Failed to create admin");
    persistence
        .create_user("viewer", "viewer-password", "Viewer")
        .expect("Failed to create viewer");
    persistence
}

fn login_request(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[test]
fn test_login_issues_tokens_and_role() {
    let mut persistence: Persistence = setup_with_users();
    let service: AuthenticationService = AuthenticationService::default();

    let response: LoginResponse = login(
        &mut persistence,
        &service,
        &login_request("admin", "admin-password"),
        test_now(),
    )
    .unwrap();

    assert_eq!(response.username, "admin");
    assert_eq!(response.role, "Admin");
    assert_eq!(response.access.len(), 32);
    assert_ne!(response.access, response.refresh);
    assert_eq!(response.expires_at, "2024-05-02T00:00:00Z");
}

#[test]
fn test_login_rejects_wrong_password() {
    let mut persistence: Persistence = setup_with_users();
    let service: AuthenticationService = AuthenticationService::default();

    let result: Result<LoginResponse, ApiError> = login(
        &mut persistence,
        &service,
        &login_request("admin", "wrong"),
        test_now(),
    );

    assert!(matches!(result, Err(ApiError::AuthenticationFailed { .. })));
}

#[test]
fn test_login_rejects_unknown_user() {
    let mut persistence: Persistence = setup_with_users();
    let service: AuthenticationService = AuthenticationService::default();

    let result: Result<LoginResponse, ApiError> = login(
        &mut persistence,
        &service,
        &login_request("nobody", "admin-password"),
        test_now(),
    );

    assert!(matches!(result, Err(ApiError::AuthenticationFailed { .. })));
}

#[test]
fn test_login_rejects_inactive_user() {
    let mut persistence: Persistence = setup_with_users();
    let user_id: i64 = persistence
        .get_user_by_username("viewer")
        .unwrap()
        .unwrap()
        .user_id;
    persistence.set_user_active(user_id, false).unwrap();

    let result: Result<LoginResponse, ApiError> = login(
        &mut persistence,
        &AuthenticationService::default(),
        &login_request("viewer", "viewer-password"),
        test_now(),
    );

    assert!(matches!(result, Err(ApiError::AuthenticationFailed { .. })));
}

#[test]
fn test_validate_session_returns_actor() {
    let mut persistence: Persistence = setup_with_users();
    let response: LoginResponse = login(
        &mut persistence,
        &AuthenticationService::default(),
        &login_request("viewer", "viewer-password"),
        test_now(),
    )
    .unwrap();

    let actor: AuthenticatedActor = AuthenticationService::validate_session(
        &mut persistence,
        &response.access,
        test_now() + Duration::hours(1),
    )
    .unwrap();

    assert_eq!(actor.username, "viewer");
    assert_eq!(actor.role, Role::Viewer);
}

#[test]
fn test_validate_session_rejects_expired_session() {
    let mut persistence: Persistence = setup_with_users();
    let service: AuthenticationService = AuthenticationService::new(Duration::hours(1));
    let response: LoginResponse = login(
        &mut persistence,
        &service,
        &login_request("admin", "admin-password"),
        test_now(),
    )
    .unwrap();

    let later: OffsetDateTime = test_now() + Duration::hours(2);
    let result: Result<AuthenticatedActor, AuthError> =
        AuthenticationService::validate_session(&mut persistence, &response.access, later);

    assert!(matches!(
        result,
        Err(AuthError::AuthenticationFailed { reason }) if reason == "Session expired"
    ));
}

#[test]
fn test_validate_session_rejects_refresh_token() {
    let mut persistence: Persistence = setup_with_users();
    let response: LoginResponse = login(
        &mut persistence,
        &AuthenticationService::default(),
        &login_request("admin", "admin-password"),
        test_now(),
    )
    .unwrap();

    let result: Result<AuthenticatedActor, AuthError> =
        AuthenticationService::validate_session(&mut persistence, &response.refresh, test_now());

    assert!(result.is_err());
}

#[test]
fn test_logout_invalidates_session() {
    let mut persistence: Persistence = setup_with_users();
    let response: LoginResponse = login(
        &mut persistence,
        &AuthenticationService::default(),
        &login_request("admin", "admin-password"),
        test_now(),
    )
    .unwrap();
    let actor: AuthenticatedActor =
        AuthenticationService::validate_session(&mut persistence, &response.access, test_now())
            .unwrap();

    logout(
        &mut persistence,
        &actor,
        &LogoutRequest {
            refresh: response.refresh.clone(),
        },
    )
    .unwrap();

    assert!(
        AuthenticationService::validate_session(&mut persistence, &response.access, test_now())
            .is_err()
    );

    // A second logout with the same token is refused
    let again: Result<(), ApiError> = logout(
        &mut persistence,
        &actor,
        &LogoutRequest {
            refresh: response.refresh,
        },
    );
    assert!(matches!(again, Err(ApiError::InvalidToken { .. })));
}

#[test]
fn test_logout_rejects_other_users_token() {
    let mut persistence: Persistence = setup_with_users();
    let service: AuthenticationService = AuthenticationService::default();
    let admin_login: LoginResponse = login(
        &mut persistence,
        &service,
        &login_request("admin", "admin-password"),
        test_now(),
    )
    .unwrap();
    let viewer_login: LoginResponse = login(
        &mut persistence,
        &service,
        &login_request("viewer", "viewer-password"),
        test_now(),
    )
    .unwrap();
    let viewer: AuthenticatedActor =
        AuthenticationService::validate_session(&mut persistence, &viewer_login.access, test_now())
            .unwrap();

    let result: Result<(), ApiError> = logout(
        &mut persistence,
        &viewer,
        &LogoutRequest {
            refresh: admin_login.refresh,
        },
    );

    assert!(matches!(result, Err(ApiError::InvalidToken { .. })));
    assert!(
        AuthenticationService::validate_session(&mut persistence, &admin_login.access, test_now())
            .is_ok()
    );
}

#[test]
fn test_login_purges_expired_sessions() {
    let mut persistence: Persistence = setup_with_users();
    let short: AuthenticationService = AuthenticationService::new(Duration::minutes(5));
    let stale: LoginResponse = login(
        &mut persistence,
        &short,
        &login_request("admin", "admin-password"),
        test_now(),
    )
    .unwrap();

    login(
        &mut persistence,
        &short,
        &login_request("viewer", "viewer-password"),
        test_now() + Duration::hours(1),
    )
    .unwrap();

    assert!(
        persistence
            .get_session_by_refresh_token(&stale.refresh)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_login_with_unrepresentable_expiry_is_internal() {
    let mut persistence: Persistence = setup_with_users();
    let service: AuthenticationService = AuthenticationService::new(Duration::hours(100_000_000));

    let result = service.login(&mut persistence, "admin", "admin-password", test_now());
    assert!(matches!(result, Err(AuthError::Internal { .. })));

    let result = login(
        &mut persistence,
        &service,
        &login_request("admin", "admin-password"),
        test_now(),
    );
    assert!(matches!(result, Err(ApiError::Internal { .. })));
}
