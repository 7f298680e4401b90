mod cinema;
mod film;
mod home;
mod room;
mod showtime;
mod timeslot;

use async_trait::async_trait;

pub use cinema::CinemaService;
pub use film::FilmService;
pub use home::{HomePage, HomeQuery, HomeService};
pub use room::RoomService;
pub use showtime::{ShowtimeService, local_today};
pub use timeslot::TimeslotService;

use crate::{
    error::AppResult,
    pagination::{PaginatedList, PaginationParams},
};

/// Filtered listing cut into pages. Filtering happens in the repository, paging in memory.
#[async_trait]
pub trait PaginatedService: Send + Sync {
    type Item: Send;
    type Filter: Sync;

    async fn get_all_paginated_and_filtered(
        &self,
        params: PaginationParams,
        filter: &Self::Filter,
    ) -> AppResult<PaginatedList<Self::Item>>;
}
