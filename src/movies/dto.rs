use serde::Deserialize;

/// Request body for creating or replacing a movie.
#[derive(Debug, Deserialize)]
pub struct MovieRequest {
    pub title: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub plot: Option<String>,
}
