use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use super::ReadRepository;
use crate::{entities::timeslot, error::AppResult, models::Timeslot};

/// Timeslots are reference data seeded by migration; there is no write path.
#[derive(Clone)]
pub struct TimeslotRepository {
    db: DatabaseConnection,
}

impl TimeslotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReadRepository for TimeslotRepository {
    type Entity = Timeslot;
    type Id = i32;

    async fn get_all(&self) -> AppResult<Vec<Timeslot>> {
        let rows = timeslot::Entity::find()
            .order_by_asc(timeslot::Column::StartTime)
            .all(&self.db)
            .await?;
        rows.into_iter().map(to_timeslot).collect()
    }

    async fn get_by_id(&self, id: &i32) -> AppResult<Option<Timeslot>> {
        timeslot::Entity::find_by_id(*id).one(&self.db).await?.map(to_timeslot).transpose()
    }
}

pub(super) fn to_timeslot(row: timeslot::Model) -> AppResult<Timeslot> {
    Ok(Timeslot { id: row.id, start_time: row.start_time.parse()?, end_time: row.end_time.parse()? })
}
