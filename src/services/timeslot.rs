use crate::{
    error::AppResult,
    models::Timeslot,
    repository::{ReadRepository, TimeslotRepository},
};

/// Read access to the fixed daily timeslots.
#[derive(Clone)]
pub struct TimeslotService {
    repo: TimeslotRepository,
}

impl TimeslotService {
    pub fn new(repo: TimeslotRepository) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Timeslot>> {
        self.repo.get_all().await
    }

    pub async fn get_one_by_id(&self, id: i32) -> AppResult<Option<Timeslot>> {
        self.repo.get_by_id(&id).await
    }
}
