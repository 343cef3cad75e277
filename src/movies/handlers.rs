use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser, error::ApiError, movies::dto::MovieRequest, movies::repo::Movie,
    state::AppState,
};

pub fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route(
            "/movies/:id",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
}

#[instrument(skip(state))]
pub async fn list_movies(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let movies = Movie::list(&state.db).await?;
    Ok(Json(movies))
}

#[instrument(skip(state))]
pub async fn get_movie(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Movie>, ApiError> {
    let movie = Movie::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Movie"))?;
    Ok(Json(movie))
}

#[instrument(skip(state, payload))]
pub async fn create_movie(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    Json(payload): Json<MovieRequest>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation(vec![crate::error::FieldError::new(
            "title",
            "must not be empty",
        )]));
    }

    let movie = Movie::create(
        &state.db,
        payload.title.trim(),
        payload.year,
        payload.genre.as_deref(),
        payload.director.as_deref(),
        payload.plot.as_deref(),
    )
    .await?;

    info!(movie_id = %movie.id, username = %username, "movie created");
    Ok((StatusCode::CREATED, Json(movie)))
}

#[instrument(skip(state, payload))]
pub async fn update_movie(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MovieRequest>,
) -> Result<Json<Movie>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation(vec![crate::error::FieldError::new(
            "title",
            "must not be empty",
        )]));
    }

    let movie = Movie::update(
        &state.db,
        id,
        payload.title.trim(),
        payload.year,
        payload.genre.as_deref(),
        payload.director.as_deref(),
        payload.plot.as_deref(),
    )
    .await?
    .ok_or(ApiError::NotFound("Movie"))?;

    info!(movie_id = %movie.id, username = %username, "movie updated");
    Ok(Json(movie))
}

#[instrument(skip(state))]
pub async fn delete_movie(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = Movie::delete(&state.db, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Movie"));
    }
    info!(movie_id = %id, username = %username, "movie deleted");
    Ok(StatusCode::NO_CONTENT)
}
