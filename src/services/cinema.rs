use async_trait::async_trait;

use super::PaginatedService;
use crate::{
    error::AppResult,
    models::{Cinema, CinemaFilter, contains_ignore_case, search_term},
    pagination::{PaginatedList, PaginationParams},
    repository::{CinemaRepository, CrudRepository, ReadRepository},
};

#[derive(Clone)]
pub struct CinemaService {
    repo: CinemaRepository,
}

impl CinemaService {
    pub fn new(repo: CinemaRepository) -> Self {
        Self { repo }
    }

    /// Cinemas whose name contains `search`, ignoring case; all of them when blank.
    pub async fn get_all_cinemas(&self, search: Option<&str>) -> AppResult<Vec<Cinema>> {
        let cinemas = self.repo.get_all().await?;
        Ok(match search_term(search) {
            Some(term) => cinemas.into_iter().filter(|c| contains_ignore_case(&c.name, term)).collect(),
            None => cinemas,
        })
    }

    pub async fn get_all(&self) -> AppResult<Vec<Cinema>> {
        self.repo.get_all().await
    }

    pub async fn get_one_by_id(&self, name: &str) -> AppResult<Option<Cinema>> {
        self.repo.get_by_id(&name.to_string()).await
    }

    pub async fn add(&self, cinema: Cinema) -> AppResult<String> {
        self.repo.insert(cinema).await
    }

    pub async fn update(&self, cinema: Cinema) -> AppResult<()> {
        self.repo.update(cinema).await
    }

    pub async fn delete(&self, name: &str) -> AppResult<()> {
        self.repo.delete(&name.to_string()).await
    }
}

#[async_trait]
impl PaginatedService for CinemaService {
    type Item = Cinema;
    type Filter = CinemaFilter;

    async fn get_all_paginated_and_filtered(
        &self,
        params: PaginationParams,
        filter: &CinemaFilter,
    ) -> AppResult<PaginatedList<Cinema>> {
        let cinemas = self.repo.search_by_name_or_street(filter.search.as_deref()).await?;
        Ok(PaginatedList::from_vec(cinemas, params))
    }
}
