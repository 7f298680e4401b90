use async_trait::async_trait;
use jiff::civil::Date;
use tracing::debug;
use validator::Validate;

use super::PaginatedService;
use crate::{
    error::{AppError, AppResult},
    models::{Showtime, ShowtimeDetails, ShowtimeFilter},
    pagination::{PaginatedList, PaginationParams},
    repository::{CrudRepository, ReadRepository, ShowtimeRepository},
};

#[derive(Clone)]
pub struct ShowtimeService {
    repo: ShowtimeRepository,
}

impl ShowtimeService {
    pub fn new(repo: ShowtimeRepository) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self) -> AppResult<Vec<ShowtimeDetails>> {
        self.repo.get_all().await
    }

    pub async fn get_all_with_filters(
        &self,
        filter: &ShowtimeFilter,
    ) -> AppResult<Vec<ShowtimeDetails>> {
        self.repo.get_all_with_filters(filter).await
    }

    pub async fn get_one_by_id(&self, id: i32) -> AppResult<Option<ShowtimeDetails>> {
        self.repo.get_by_id(&id).await
    }

    pub async fn add(&self, showtime: Showtime) -> AppResult<i32> {
        validate_showtime(&showtime, local_today())?;
        self.repo.insert(showtime).await
    }

    pub async fn update(&self, showtime: Showtime) -> AppResult<()> {
        validate_showtime(&showtime, local_today())?;
        self.repo.update(showtime).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repo.delete(&id).await
    }
}

#[async_trait]
impl PaginatedService for ShowtimeService {
    type Item = ShowtimeDetails;
    type Filter = ShowtimeFilter;

    async fn get_all_paginated_and_filtered(
        &self,
        params: PaginationParams,
        filter: &ShowtimeFilter,
    ) -> AppResult<PaginatedList<ShowtimeDetails>> {
        let showtimes = self.repo.get_all_with_filters(filter).await?;
        Ok(PaginatedList::from_vec(showtimes, params))
    }
}

pub fn local_today() -> Date {
    jiff::Zoned::now().date()
}

/// Checked before any write: the business rules first, then the field constraints. A
/// showtime dated `today` is accepted.
pub fn validate_showtime(showtime: &Showtime, today: Date) -> AppResult<()> {
    // NaN fails this too
    if !(showtime.price > 0.0) {
        debug!(id = showtime.id, price = showtime.price, "rejected showtime price");
        return Err(AppError::Validation("price must exceed 0".to_string()));
    }
    if showtime.show_date < today {
        debug!(id = showtime.id, date = %showtime.show_date, "rejected past showtime");
        return Err(AppError::Validation("show date cannot be in the past".to_string()));
    }
    showtime.validate()?;
    Ok(())
}
