use async_trait::async_trait;

use super::PaginatedService;
use crate::{
    error::AppResult,
    models::{Room, RoomFilter, RoomKey},
    pagination::{PaginatedList, PaginationParams},
    repository::{CrudRepository, ReadRepository, RoomRepository},
};

#[derive(Clone)]
pub struct RoomService {
    repo: RoomRepository,
}

impl RoomService {
    pub fn new(repo: RoomRepository) -> Self {
        Self { repo }
    }

    pub async fn get_all_by_cinema(&self, cinema_name: &str) -> AppResult<Vec<Room>> {
        self.repo.get_all_by_cinema(cinema_name).await
    }

    pub async fn get_one_by_id(&self, key: &RoomKey) -> AppResult<Option<Room>> {
        self.repo.get_by_id(key).await
    }

    pub async fn add(&self, room: Room) -> AppResult<RoomKey> {
        self.repo.insert(room).await
    }

    pub async fn update(&self, room: Room) -> AppResult<()> {
        self.repo.update(room).await
    }

    pub async fn delete(&self, key: &RoomKey) -> AppResult<()> {
        self.repo.delete(key).await
    }
}

#[async_trait]
impl PaginatedService for RoomService {
    type Item = Room;
    type Filter = RoomFilter;

    async fn get_all_paginated_and_filtered(
        &self,
        params: PaginationParams,
        filter: &RoomFilter,
    ) -> AppResult<PaginatedList<Room>> {
        let rooms = self.repo.get_all_by_cinema_with_filters(filter).await?;
        Ok(PaginatedList::from_vec(rooms, params))
    }
}
