use async_trait::async_trait;
use tracing::debug;
use validator::Validate;

use super::PaginatedService;
use crate::{
    error::{AppError, AppResult},
    models::{Film, FilmFilter},
    pagination::{PaginatedList, PaginationParams},
    repository::{CrudRepository, FilmRepository, ReadRepository},
};

#[derive(Clone)]
pub struct FilmService {
    repo: FilmRepository,
}

impl FilmService {
    pub fn new(repo: FilmRepository) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Film>> {
        self.repo.get_all().await
    }

    pub async fn get_one_by_id(&self, id: i32) -> AppResult<Option<Film>> {
        self.repo.get_by_id(&id).await
    }

    pub async fn add(&self, film: Film) -> AppResult<i32> {
        validate_film(&film)?;
        self.repo.insert(film).await
    }

    pub async fn update(&self, film: Film) -> AppResult<()> {
        validate_film(&film)?;
        self.repo.update(film).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repo.delete(&id).await
    }
}

#[async_trait]
impl PaginatedService for FilmService {
    type Item = Film;
    type Filter = FilmFilter;

    async fn get_all_paginated_and_filtered(
        &self,
        params: PaginationParams,
        filter: &FilmFilter,
    ) -> AppResult<PaginatedList<Film>> {
        let films = self
            .repo
            .get_all_by_title_genre_or_year(
                filter.title.as_deref(),
                filter.genre.as_deref(),
                filter.year,
            )
            .await?;
        Ok(PaginatedList::from_vec(films, params))
    }
}

/// Checked before any write: the business rules first, so their messages win, then the
/// field constraints. Year 1800 itself is rejected.
pub fn validate_film(film: &Film) -> AppResult<()> {
    if film.title.trim().is_empty() {
        debug!(id = film.id, "rejected film without title");
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    if film.year <= 1800 {
        debug!(id = film.id, year = film.year, "rejected film year");
        return Err(AppError::Validation("year must exceed 1800".to_string()));
    }
    film.validate()?;
    Ok(())
}
