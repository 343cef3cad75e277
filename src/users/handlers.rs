use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::AuthResponse,
        jwt::{AuthUser, JwtKeys},
        password::hash_password,
    },
    error::ApiError,
    state::AppState,
    users::{
        dto::{PublicUser, RegisterRequest, UpdateUserRequest},
        repo::User,
        validate::{validate_registration, validate_update},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/me", get(get_me).put(update_me).delete(delete_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    // Single validate-before-persist path; storage is never touched on failure
    let errors = validate_registration(&payload.username, &payload.password, &payload.email);
    if !errors.is_empty() {
        warn!(username = %payload.username, "registration rejected by validation");
        return Err(ApiError::Validation(errors));
    }

    if User::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username already taken");
        return Err(ApiError::Conflict("Username already taken".into()));
    }

    let hash = hash_password(&payload.password)?;
    // The pre-check above races with concurrent registrations; the unique
    // constraint on username is the arbiter, so the loser still gets a 409
    let user = User::create(&state.db, &payload.username, &payload.email, &hash)
        .await
        .map_err(|e| map_unique_violation(e, "Username already taken"))?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.username)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: PublicUser::from(user),
            token,
        }),
    ))
}

fn map_unique_violation(e: anyhow::Error, conflict: &str) -> ApiError {
    let unique = e
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique {
        ApiError::Conflict(conflict.into())
    } else {
        ApiError::Internal(e)
    }
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_username(&state.db, &username)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let email = payload.email.map(|e| e.trim().to_lowercase());

    let errors = validate_update(payload.password.as_deref(), email.as_deref());
    if !errors.is_empty() {
        warn!(username = %username, "update rejected by validation");
        return Err(ApiError::Validation(errors));
    }

    let current = User::find_by_username(&state.db, &username)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let email = email.unwrap_or(current.email);
    let password_hash = match payload.password {
        Some(plain) => hash_password(&plain)?,
        None => current.password_hash,
    };

    let user = User::update(&state.db, &username, &email, &password_hash).await?;
    info!(user_id = %user.id, username = %user.username, "user updated");
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state))]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> Result<StatusCode, ApiError> {
    let deleted = User::delete_by_username(&state.db, &username).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("User"));
    }
    info!(username = %username, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeUniqueViolation;

    impl std::fmt::Display for FakeUniqueViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(
                f,
                "duplicate key value violates unique constraint \"users_username_key\""
            )
        }
    }

    impl std::error::Error for FakeUniqueViolation {}

    impl sqlx::error::DatabaseError for FakeUniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }
        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }
        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn concurrent_duplicate_username_maps_to_conflict() {
        let e = anyhow::Error::from(sqlx::Error::Database(Box::new(FakeUniqueViolation)));
        let mapped = map_unique_violation(e, "Username already taken");
        assert!(matches!(mapped, ApiError::Conflict(msg) if msg == "Username already taken"));
    }

    #[test]
    fn other_create_errors_stay_internal() {
        let mapped = map_unique_violation(anyhow::anyhow!("connection reset"), "unused");
        assert!(matches!(mapped, ApiError::Internal(_)));
    }

    #[test]
    fn public_user_serialization_hides_nothing_it_should_show() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            username: "moviefan42".to_string(),
            email: "test@example.com".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("moviefan42"));
        assert!(json.contains("test@example.com"));
        assert!(json.contains("id"));
    }
}
