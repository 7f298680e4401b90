use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use tracing::debug;

use super::{CrudRepository, ReadRepository};
use crate::{
    entities::{cinema, room},
    error::{AppError, AppResult},
    models::{Room, RoomFilter, RoomKey, date_key},
};

#[derive(Clone)]
pub struct RoomRepository {
    db: DatabaseConnection,
}

impl RoomRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn exists_by_id(&self, key: &RoomKey) -> AppResult<bool> {
        Ok(find_row(&self.db, key).await?.is_some())
    }

    /// Rooms of one cinema, by number. A blank cinema name matches nothing.
    pub async fn get_all_by_cinema(&self, cinema_name: &str) -> AppResult<Vec<Room>> {
        if cinema_name.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.get_all_by_cinema_with_filters(&RoomFilter::for_cinema(cinema_name)).await
    }

    /// Rooms of `filter.cinema_name` matching every criterion that is set. Range bounds are
    /// inclusive.
    pub async fn get_all_by_cinema_with_filters(&self, filter: &RoomFilter) -> AppResult<Vec<Room>> {
        let mut query =
            room::Entity::find().filter(room::Column::CinemaName.eq(filter.cinema_name.as_str()));

        if let Some(number) = filter.number {
            query = query.filter(room::Column::Number.eq(number));
        }
        if let Some(min) = filter.capacity_min {
            query = query.filter(room::Column::Capacity.gte(min));
        }
        if let Some(max) = filter.capacity_max {
            query = query.filter(room::Column::Capacity.lte(max));
        }
        if let Some(from) = filter.built_from {
            query = query.filter(room::Column::ConstructionDate.gte(date_key(from)));
        }
        if let Some(to) = filter.built_to {
            query = query.filter(room::Column::ConstructionDate.lte(date_key(to)));
        }

        let rows = query.order_by_asc(room::Column::Number).all(&self.db).await?;
        debug!(cinema = %filter.cinema_name, rooms = rows.len(), "filtered rooms");
        rows.into_iter().map(to_room).collect()
    }
}

#[async_trait]
impl ReadRepository for RoomRepository {
    type Entity = Room;
    type Id = RoomKey;

    async fn get_all(&self) -> AppResult<Vec<Room>> {
        let rows = room::Entity::find()
            .order_by_asc(room::Column::CinemaName)
            .order_by_asc(room::Column::Number)
            .all(&self.db)
            .await?;
        rows.into_iter().map(to_room).collect()
    }

    async fn get_by_id(&self, key: &RoomKey) -> AppResult<Option<Room>> {
        find_row(&self.db, key).await?.map(to_room).transpose()
    }
}

#[async_trait]
impl CrudRepository for RoomRepository {
    type Record = Room;

    async fn insert(&self, record: Room) -> AppResult<RoomKey> {
        let key = record.key();
        if self.exists_by_id(&key).await? {
            return Err(AppError::Conflict(format!(
                "room number {} already exists for cinema {}",
                key.number, key.cinema_name
            )));
        }
        if cinema::Entity::find_by_id(key.cinema_name.clone()).one(&self.db).await?.is_none() {
            return Err(AppError::not_found(format!("cinema {}", key.cinema_name)));
        }

        let model = room::ActiveModel {
            cinema_name: Set(record.cinema_name),
            number: Set(record.number),
            capacity: Set(record.capacity),
            construction_date: Set(date_key(record.construction_date)),
        };
        room::Entity::insert(model).exec_without_returning(&self.db).await?;

        debug!(cinema = %key.cinema_name, number = key.number, "inserted room");
        Ok(key)
    }

    async fn update(&self, record: Room) -> AppResult<()> {
        let key = record.key();
        let existing = find_row(&self.db, &key).await?.ok_or_else(|| AppError::not_found(&key))?;

        let mut model = existing.into_active_model();
        model.capacity = Set(record.capacity);
        model.construction_date = Set(date_key(record.construction_date));
        model.update(&self.db).await?;

        debug!(cinema = %key.cinema_name, number = key.number, "updated room");
        Ok(())
    }

    async fn delete(&self, key: &RoomKey) -> AppResult<()> {
        let res = room::Entity::delete_by_id((key.cinema_name.clone(), key.number))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found(key));
        }
        debug!(cinema = %key.cinema_name, number = key.number, "deleted room");
        Ok(())
    }
}

pub(super) async fn find_row<C: sea_orm::ConnectionTrait>(
    conn: &C,
    key: &RoomKey,
) -> AppResult<Option<room::Model>> {
    Ok(room::Entity::find_by_id((key.cinema_name.clone(), key.number)).one(conn).await?)
}

pub(super) fn to_room(row: room::Model) -> AppResult<Room> {
    Ok(Room {
        construction_date: row.construction_date.parse()?,
        cinema_name: row.cinema_name,
        number: row.number,
        capacity: row.capacity,
    })
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;
    use crate::test_support::{memory_db, seed_cinema};

    fn room(number: i32, capacity: i32, built: jiff::civil::Date) -> Room {
        Room { cinema_name: "UGC".to_string(), number, capacity, construction_date: built }
    }

    async fn repo_with_rooms() -> RoomRepository {
        let db = memory_db().await;
        seed_cinema(&db, "UGC", None).await;
        seed_cinema(&db, "Pathé", None).await;
        let repo = RoomRepository::new(db);
        repo.insert(room(1, 80, date(1990, 5, 1))).await.unwrap();
        repo.insert(room(2, 150, date(2005, 1, 15))).await.unwrap();
        repo.insert(room(3, 300, date(2018, 9, 30))).await.unwrap();
        repo.insert(Room { cinema_name: "Pathé".to_string(), ..room(1, 200, date(2001, 1, 1)) })
            .await
            .unwrap();
        repo
    }

    fn numbers(rooms: &[Room]) -> Vec<i32> {
        rooms.iter().map(|r| r.number).collect()
    }

    #[tokio::test]
    async fn composite_key_lookup() {
        let repo = repo_with_rooms().await;

        let found = repo.get_by_id(&RoomKey::new("UGC", 2)).await.unwrap().unwrap();
        assert_eq!(found.capacity, 150);
        assert_eq!(found.construction_date, date(2005, 1, 15));

        assert!(repo.get_by_id(&RoomKey::new("UGC", 9)).await.unwrap().is_none());
        assert!(repo.exists_by_id(&RoomKey::new("Pathé", 1)).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_number_in_same_cinema_is_a_conflict() {
        let repo = repo_with_rooms().await;
        let err = repo.insert(room(2, 10, date(2020, 1, 1))).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn room_needs_an_existing_cinema() {
        let repo = repo_with_rooms().await;
        let orphan = Room { cinema_name: "Nowhere".to_string(), ..room(1, 10, date(2020, 1, 1)) };
        assert!(matches!(repo.insert(orphan).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn filters_combine_with_and() {
        let repo = repo_with_rooms().await;

        let all = repo.get_all_by_cinema_with_filters(&RoomFilter::for_cinema("UGC")).await.unwrap();
        assert_eq!(numbers(&all), [1, 2, 3]);

        let filter = RoomFilter { capacity_min: Some(150), ..RoomFilter::for_cinema("UGC") };
        assert_eq!(numbers(&repo.get_all_by_cinema_with_filters(&filter).await.unwrap()), [2, 3]);

        let filter = RoomFilter {
            capacity_min: Some(80),
            capacity_max: Some(150),
            built_from: Some(date(2005, 1, 15)),
            ..RoomFilter::for_cinema("UGC")
        };
        assert_eq!(numbers(&repo.get_all_by_cinema_with_filters(&filter).await.unwrap()), [2]);

        let filter = RoomFilter { built_to: Some(date(2005, 1, 14)), ..RoomFilter::for_cinema("UGC") };
        assert_eq!(numbers(&repo.get_all_by_cinema_with_filters(&filter).await.unwrap()), [1]);

        let filter = RoomFilter { number: Some(3), ..RoomFilter::for_cinema("UGC") };
        assert_eq!(numbers(&repo.get_all_by_cinema_with_filters(&filter).await.unwrap()), [3]);
    }

    #[tokio::test]
    async fn blank_cinema_name_lists_nothing() {
        let repo = repo_with_rooms().await;
        assert!(repo.get_all_by_cinema("  ").await.unwrap().is_empty());
        assert_eq!(repo.get_all_by_cinema("Pathé").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_by_composite_key() {
        let repo = repo_with_rooms().await;

        repo.update(room(1, 90, date(1991, 1, 1))).await.unwrap();
        let updated = repo.get_by_id(&RoomKey::new("UGC", 1)).await.unwrap().unwrap();
        assert_eq!(updated.capacity, 90);

        repo.delete(&RoomKey::new("UGC", 1)).await.unwrap();
        assert!(!repo.exists_by_id(&RoomKey::new("UGC", 1)).await.unwrap());
        assert!(matches!(repo.delete(&RoomKey::new("UGC", 1)).await, Err(AppError::NotFound(_))));
        assert!(matches!(repo.update(room(1, 90, date(1991, 1, 1))).await, Err(AppError::NotFound(_))));
    }
}
