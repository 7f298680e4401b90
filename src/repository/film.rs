use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, NotSet,
    QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use super::{CrudRepository, ReadRepository};
use crate::{
    entities::film,
    error::{AppError, AppResult},
    models::{Film, contains_ignore_case, search_term},
};

#[derive(Clone)]
pub struct FilmRepository {
    db: DatabaseConnection,
}

impl FilmRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Films matching every given criterion: exact year in SQL, then case-insensitive
    /// substring on title and genre in memory, where `%` and `_` are plain characters.
    pub async fn get_all_by_title_genre_or_year(
        &self,
        title: Option<&str>,
        genre: Option<&str>,
        year: Option<i32>,
    ) -> AppResult<Vec<Film>> {
        let mut query = film::Entity::find();
        if let Some(year) = year {
            query = query.filter(film::Column::Year.eq(year));
        }
        let rows = query.order_by_asc(film::Column::Id).all(&self.db).await?;

        let title = search_term(title);
        let genre = search_term(genre);
        let films: Vec<Film> = rows
            .into_iter()
            .filter(|f| title.is_none_or(|t| contains_ignore_case(&f.title, t)))
            .filter(|f| genre.is_none_or(|g| contains_ignore_case(&f.genre, g)))
            .map(to_film)
            .collect();

        debug!(title = ?title, genre = ?genre, year = ?year, films = films.len(), "filtered films");
        Ok(films)
    }
}

#[async_trait]
impl ReadRepository for FilmRepository {
    type Entity = Film;
    type Id = i32;

    async fn get_all(&self) -> AppResult<Vec<Film>> {
        let rows = film::Entity::find().order_by_asc(film::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(to_film).collect())
    }

    async fn get_by_id(&self, id: &i32) -> AppResult<Option<Film>> {
        Ok(film::Entity::find_by_id(*id).one(&self.db).await?.map(to_film))
    }
}

#[async_trait]
impl CrudRepository for FilmRepository {
    type Record = Film;

    async fn insert(&self, record: Film) -> AppResult<i32> {
        let model = film::ActiveModel {
            id: NotSet,
            title: Set(record.title),
            year: Set(record.year),
            genre: Set(record.genre),
        };
        let res = film::Entity::insert(model).exec(&self.db).await?;
        debug!(id = res.last_insert_id, "inserted film");
        Ok(res.last_insert_id)
    }

    async fn update(&self, record: Film) -> AppResult<()> {
        let existing = film::Entity::find_by_id(record.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("film {}", record.id)))?;

        let mut model = existing.into_active_model();
        model.title = Set(record.title);
        model.year = Set(record.year);
        model.genre = Set(record.genre);
        model.update(&self.db).await?;

        debug!(id = record.id, "updated film");
        Ok(())
    }

    async fn delete(&self, id: &i32) -> AppResult<()> {
        let res = film::Entity::delete_by_id(*id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found(format!("film {id}")));
        }
        debug!(id = *id, "deleted film");
        Ok(())
    }
}

pub(super) fn to_film(row: film::Model) -> Film {
    Film { id: row.id, title: row.title, year: row.year, genre: row.genre }
}
