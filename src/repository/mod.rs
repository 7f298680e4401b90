mod cinema;
mod film;
mod room;
mod showtime;
mod timeslot;

use async_trait::async_trait;

pub use cinema::CinemaRepository;
pub use film::FilmRepository;
pub use room::RoomRepository;
pub use showtime::ShowtimeRepository;
pub use timeslot::TimeslotRepository;

use crate::error::AppResult;

/// Lookups shared by every repository.
#[async_trait]
pub trait ReadRepository: Send + Sync {
    type Entity: Send;
    type Id: Send + Sync;

    async fn get_all(&self) -> AppResult<Vec<Self::Entity>>;

    async fn get_by_id(&self, id: &Self::Id) -> AppResult<Option<Self::Entity>>;
}

/// Full create/update/delete access. Reference data such as timeslots only implements
/// [`ReadRepository`].
#[async_trait]
pub trait CrudRepository: ReadRepository {
    /// What a write carries; may differ from what a read returns.
    type Record: Send;

    async fn insert(&self, record: Self::Record) -> AppResult<Self::Id>;

    async fn update(&self, record: Self::Record) -> AppResult<()>;

    async fn delete(&self, id: &Self::Id) -> AppResult<()>;
}
