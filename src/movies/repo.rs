use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub plot: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Movie {
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Movie>> {
        let rows = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, year, genre, director, plot, created_at
            FROM movies
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, year, genre, director, plot, created_at
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(movie)
    }

    pub async fn create(
        db: &PgPool,
        title: &str,
        year: Option<i32>,
        genre: Option<&str>,
        director: Option<&str>,
        plot: Option<&str>,
    ) -> anyhow::Result<Movie> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (title, year, genre, director, plot)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, year, genre, director, plot, created_at
            "#,
        )
        .bind(title)
        .bind(year)
        .bind(genre)
        .bind(director)
        .bind(plot)
        .fetch_one(db)
        .await?;
        Ok(movie)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        title: &str,
        year: Option<i32>,
        genre: Option<&str>,
        director: Option<&str>,
        plot: Option<&str>,
    ) -> anyhow::Result<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            UPDATE movies
            SET title = $2, year = $3, genre = $4, director = $5, plot = $6
            WHERE id = $1
            RETURNING id, title, year, genre, director, plot, created_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(year)
        .bind(genre)
        .bind(director)
        .bind(plot)
        .fetch_optional(db)
        .await?;
        Ok(movie)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query(r#"DELETE FROM movies WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
