use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryOrder, Set,
};
use tracing::debug;

use super::{CrudRepository, ReadRepository};
use crate::{
    entities::cinema,
    error::{AppError, AppResult},
    models::{Cinema, contains_ignore_case, search_term},
};

#[derive(Clone)]
pub struct CinemaRepository {
    db: DatabaseConnection,
}

impl CinemaRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Cinemas whose name or street contains `term`, ignoring case. A blank term returns
    /// every cinema.
    ///
    /// Matching runs in process: SQLite's `LIKE` only folds ASCII, which would miss
    /// "PATHÉ" against "Pathé".
    pub async fn search_by_name_or_street(&self, term: Option<&str>) -> AppResult<Vec<Cinema>> {
        let cinemas = self.get_all().await?;
        let Some(term) = search_term(term) else {
            return Ok(cinemas);
        };

        let matches: Vec<Cinema> = cinemas
            .into_iter()
            .filter(|c| {
                contains_ignore_case(&c.name, term)
                    || c.street.as_deref().is_some_and(|street| contains_ignore_case(street, term))
            })
            .collect();

        debug!(term = %term, matches = matches.len(), "searched cinemas");
        Ok(matches)
    }
}

#[async_trait]
impl ReadRepository for CinemaRepository {
    type Entity = Cinema;
    type Id = String;

    async fn get_all(&self) -> AppResult<Vec<Cinema>> {
        let rows = cinema::Entity::find()
            .order_by_asc(cinema::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(to_cinema).collect())
    }

    async fn get_by_id(&self, name: &String) -> AppResult<Option<Cinema>> {
        let row = cinema::Entity::find_by_id(name.clone()).one(&self.db).await?;
        Ok(row.map(to_cinema))
    }
}

#[async_trait]
impl CrudRepository for CinemaRepository {
    type Record = Cinema;

    async fn insert(&self, record: Cinema) -> AppResult<String> {
        if cinema::Entity::find_by_id(record.name.clone()).one(&self.db).await?.is_some() {
            return Err(AppError::Conflict(format!("cinema {} already exists", record.name)));
        }

        let model = cinema::ActiveModel {
            name: Set(record.name.clone()),
            street: Set(record.street),
            street_number: Set(record.street_number),
        };
        cinema::Entity::insert(model).exec_without_returning(&self.db).await?;

        debug!(name = %record.name, "inserted cinema");
        Ok(record.name)
    }

    async fn update(&self, record: Cinema) -> AppResult<()> {
        let existing = cinema::Entity::find_by_id(record.name.clone())
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("cinema {}", record.name)))?;

        let mut model = existing.into_active_model();
        model.street = Set(record.street);
        model.street_number = Set(record.street_number);
        model.update(&self.db).await?;

        debug!(name = %record.name, "updated cinema");
        Ok(())
    }

    async fn delete(&self, name: &String) -> AppResult<()> {
        let res = cinema::Entity::delete_by_id(name.clone()).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found(format!("cinema {name}")));
        }
        debug!(name = %name, "deleted cinema and its rooms");
        Ok(())
    }
}

pub(super) fn to_cinema(row: cinema::Model) -> Cinema {
    Cinema { name: row.name, street: row.street, street_number: row.street_number }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_db, seed_cinema, seed_room};
    use crate::repository::RoomRepository;
    use crate::models::RoomKey;

    #[tokio::test]
    async fn search_matches_name_or_street_ignoring_case() {
        let db = memory_db().await;
        seed_cinema(&db, "Pathé", Some("Boulevard de Clichy")).await;
        seed_cinema(&db, "UGC", Some("Rue de la Pathé")).await;
        seed_cinema(&db, "Gaumont", None).await;
        let repo = CinemaRepository::new(db);

        let found = repo.search_by_name_or_street(Some("PATHÉ")).await.unwrap();
        let names: Vec<_> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Pathé", "UGC"]);

        let found = repo.search_by_name_or_street(Some("clichy")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Pathé");
    }

    #[tokio::test]
    async fn blank_search_returns_everything() {
        let db = memory_db().await;
        seed_cinema(&db, "Pathé", None).await;
        seed_cinema(&db, "UGC", None).await;
        let repo = CinemaRepository::new(db);

        assert_eq!(repo.search_by_name_or_street(None).await.unwrap().len(), 2);
        assert_eq!(repo.search_by_name_or_street(Some("  ")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_name_is_a_conflict() {
        let db = memory_db().await;
        let repo = CinemaRepository::new(db);
        let cinema = Cinema { name: "UGC".to_string(), street: None, street_number: 4 };

        repo.insert(cinema.clone()).await.unwrap();
        let err = repo.insert(cinema).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_and_delete_require_an_existing_cinema() {
        let db = memory_db().await;
        let repo = CinemaRepository::new(db);
        let ghost = Cinema { name: "Ghost".to_string(), street: None, street_number: 1 };

        assert!(matches!(repo.update(ghost).await, Err(AppError::NotFound(_))));
        assert!(matches!(repo.delete(&"Ghost".to_string()).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_rewrites_the_address() {
        let db = memory_db().await;
        seed_cinema(&db, "UGC", None).await;
        let repo = CinemaRepository::new(db);

        let changed =
            Cinema { name: "UGC".to_string(), street: Some("Rue Neuve".to_string()), street_number: 77 };
        repo.update(changed.clone()).await.unwrap();

        assert_eq!(repo.get_by_id(&"UGC".to_string()).await.unwrap(), Some(changed));
    }

    #[tokio::test]
    async fn delete_cascades_to_rooms() {
        let db = memory_db().await;
        seed_cinema(&db, "UGC", None).await;
        seed_room(&db, "UGC", 1).await;
        seed_room(&db, "UGC", 2).await;
        let cinemas = CinemaRepository::new(db.clone());
        let rooms = RoomRepository::new(db);

        cinemas.delete(&"UGC".to_string()).await.unwrap();

        assert!(!rooms.exists_by_id(&RoomKey::new("UGC", 1)).await.unwrap());
        assert!(rooms.get_all().await.unwrap().is_empty());
    }
}
