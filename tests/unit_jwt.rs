use axum::http::StatusCode;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use rollcall::middleware::auth::AuthUser;
use rollcall_auth::{Claims, create_access_token, verify_token};
use rollcall_config::JwtConfig;
use rollcall_models::UserRole;
use uuid::Uuid;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
    }
}

#[test]
fn test_token_round_trips_into_auth_user() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    for role in [UserRole::Admin, UserRole::Student] {
        let token =
            create_access_token(user_id, "test@example.com", role.as_str(), &jwt_config).unwrap();
        let auth_user = AuthUser(verify_token(&token, &jwt_config).unwrap());

        assert_eq!(auth_user.user_id().unwrap().into_inner(), user_id);
        assert_eq!(auth_user.role().unwrap(), role);
        assert_eq!(auth_user.email(), "test@example.com");
    }
}

#[test]
fn test_token_expiry_uses_config() {
    let jwt_config = get_test_jwt_config();
    let token =
        create_access_token(Uuid::new_v4(), "test@example.com", "admin", &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn test_expired_token_is_rejected() {
    let jwt_config = get_test_jwt_config();
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        email: "test@example.com".to_string(),
        role: "student".to_string(),
        exp: now - 3600,
        iat: now - 7200,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .unwrap();

    let err = verify_token(&token, &jwt_config).unwrap_err();

    assert_eq!(err.status, StatusCode::FORBIDDEN);
    assert_eq!(err.message(), "Invalid or expired token");
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let token = create_access_token(
        Uuid::new_v4(),
        "test@example.com",
        "admin",
        &JwtConfig {
            secret: "someone_elses_secret".to_string(),
            access_token_expiry: 3600,
        },
    )
    .unwrap();

    let err = verify_token(&token, &get_test_jwt_config()).unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);
}

#[test]
fn test_unknown_role_claim_is_invalid_token() {
    let jwt_config = get_test_jwt_config();
    let token =
        create_access_token(Uuid::new_v4(), "test@example.com", "teacher", &jwt_config).unwrap();
    let auth_user = AuthUser(verify_token(&token, &jwt_config).unwrap());

    assert_eq!(auth_user.role().unwrap_err().status, StatusCode::FORBIDDEN);
}
