use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    RuntimeErr, Set, SqlErr, TransactionTrait, sea_query::JoinType,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{
    CrudRepository, ReadRepository, film::to_film, room::to_room, timeslot::to_timeslot,
};
use crate::{
    entities::{film, room, showtime, timeslot},
    error::{AppError, AppResult},
    models::{
        Film, Room, RoomKey, Showtime, ShowtimeDetails, ShowtimeFilter, Timeslot,
        contains_ignore_case, date_key, search_term, time_key,
    },
};

const WRITE_ATTEMPTS: u32 = 5;
const BUSY_BACKOFF: Duration = Duration::from_millis(20);

/// Showtimes, read with their film, room and timeslot attached.
///
/// Writes go through `write_lock`, one at a time per repository, and run the reference
/// checks, the slot check and the write in one transaction. A transaction the store refuses
/// as busy (another process holding the write lock) is rerun from the start, so its slot
/// check sees whatever the other writer committed.
#[derive(Clone)]
pub struct ShowtimeRepository {
    db: DatabaseConnection,
    write_lock: Arc<Mutex<()>>,
}

impl ShowtimeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, write_lock: Arc::new(Mutex::new(())) }
    }

    /// Column criteria run in SQL; the film title match runs on the resolved rows so it folds
    /// case beyond ASCII and takes `%` and `_` literally.
    pub async fn get_all_with_filters(
        &self,
        filter: &ShowtimeFilter,
    ) -> AppResult<Vec<ShowtimeDetails>> {
        let mut query = showtime::Entity::find();

        if let Some(name) = search_term(filter.cinema_name.as_deref()) {
            query = query.filter(showtime::Column::RoomCinemaName.eq(name));
        }
        if let Some(number) = filter.room_number {
            query = query.filter(showtime::Column::RoomNumber.eq(number));
        }
        if let Some(film_id) = filter.film_id {
            query = query.filter(showtime::Column::FilmId.eq(film_id));
        }
        if let Some(day) = filter.show_date {
            query = query.filter(showtime::Column::ShowDate.eq(date_key(day)));
        }
        if filter.start_time.is_some() || filter.end_time.is_some() {
            query = query.join(JoinType::InnerJoin, showtime::Relation::Timeslot.def());
            if let Some(start) = filter.start_time {
                query = query.filter(timeslot::Column::StartTime.gte(time_key(start)));
            }
            if let Some(end) = filter.end_time {
                query = query.filter(timeslot::Column::EndTime.lte(time_key(end)));
            }
        }

        let rows = query.order_by_asc(showtime::Column::Id).all(&self.db).await?;
        let mut details = resolve(&self.db, rows).await?;
        if let Some(title) = search_term(filter.film_title.as_deref()) {
            details.retain(|s| contains_ignore_case(&s.film.title, title));
        }

        debug!(showtimes = details.len(), "filtered showtimes");
        Ok(details)
    }

    async fn insert_once(&self, record: &Showtime) -> AppResult<i32> {
        let txn = self.db.begin().await?;

        ensure_references(&txn, record).await?;
        if slot_taken(&txn, record, None).await? {
            return Err(slot_conflict(record));
        }

        let model = showtime::ActiveModel {
            id: NotSet,
            price: Set(record.price),
            show_date: Set(date_key(record.show_date)),
            film_id: Set(record.film_id),
            room_cinema_name: Set(record.room.cinema_name.clone()),
            room_number: Set(record.room.number),
            timeslot_id: Set(record.timeslot_id),
        };
        let res = showtime::Entity::insert(model)
            .exec(&txn)
            .await
            .map_err(|err| occupied_or(err, record))?;
        txn.commit().await?;
        Ok(res.last_insert_id)
    }

    /// The slot check only runs when room, timeslot or date moved; a price or film change
    /// keeps the slot the showtime already holds.
    async fn update_once(&self, record: &Showtime) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        let existing = showtime::Entity::find_by_id(record.id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found(format!("showtime {}", record.id)))?;
        ensure_references(&txn, record).await?;

        let show_date = date_key(record.show_date);
        let moved = existing.room_cinema_name != record.room.cinema_name
            || existing.room_number != record.room.number
            || existing.timeslot_id != record.timeslot_id
            || existing.show_date != show_date;
        if moved && slot_taken(&txn, record, Some(record.id)).await? {
            return Err(slot_conflict(record));
        }

        let mut model = existing.into_active_model();
        model.price = Set(record.price);
        model.show_date = Set(show_date);
        model.film_id = Set(record.film_id);
        model.room_cinema_name = Set(record.room.cinema_name.clone());
        model.room_number = Set(record.room.number);
        model.timeslot_id = Set(record.timeslot_id);
        model.update(&txn).await.map_err(|err| occupied_or(err, record))?;
        txn.commit().await?;
        Ok(moved)
    }
}

#[async_trait]
impl ReadRepository for ShowtimeRepository {
    type Entity = ShowtimeDetails;
    type Id = i32;

    async fn get_all(&self) -> AppResult<Vec<ShowtimeDetails>> {
        let rows = showtime::Entity::find().all(&self.db).await?;
        resolve(&self.db, rows).await
    }

    async fn get_by_id(&self, id: &i32) -> AppResult<Option<ShowtimeDetails>> {
        let Some(row) = showtime::Entity::find_by_id(*id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(resolve(&self.db, vec![row]).await?.pop())
    }
}

#[async_trait]
impl CrudRepository for ShowtimeRepository {
    type Record = Showtime;

    async fn insert(&self, record: Showtime) -> AppResult<i32> {
        let _guard = self.write_lock.lock().await;
        let id = retry_busy("insert", || self.insert_once(&record)).await?;

        debug!(id, room = %record.room, date = %record.show_date, "inserted showtime");
        Ok(id)
    }

    async fn update(&self, record: Showtime) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let moved = retry_busy("update", || self.update_once(&record)).await?;

        debug!(id = record.id, moved, "updated showtime");
        Ok(())
    }

    async fn delete(&self, id: &i32) -> AppResult<()> {
        let res = showtime::Entity::delete_by_id(*id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found(format!("showtime {id}")));
        }
        debug!(id = *id, "deleted showtime");
        Ok(())
    }
}

/// Reruns `op` while the store reports the database as busy, up to `WRITE_ATTEMPTS` times.
async fn retry_busy<T, F, Fut>(op_name: &str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(AppError::Database(err)) if attempt < WRITE_ATTEMPTS && is_busy(&err) => {
                warn!(op = op_name, attempt, error = %err, "store busy, retrying showtime write");
                tokio::time::sleep(BUSY_BACKOFF * attempt).await;
                attempt += 1;
            },
            other => return other,
        }
    }
}

/// SQLITE_BUSY (5) and its extended codes, such as SQLITE_BUSY_SNAPSHOT (517).
fn is_busy(err: &DbErr) -> bool {
    let (DbErr::Conn(RuntimeErr::SqlxError(e))
    | DbErr::Exec(RuntimeErr::SqlxError(e))
    | DbErr::Query(RuntimeErr::SqlxError(e))) = err
    else {
        return false;
    };
    e.as_database_error()
        .and_then(|db| db.code())
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| code & 0xff == 5)
}

async fn ensure_references<C: ConnectionTrait>(conn: &C, record: &Showtime) -> AppResult<()> {
    if film::Entity::find_by_id(record.film_id).one(conn).await?.is_none() {
        return Err(AppError::not_found(format!("film {}", record.film_id)));
    }
    if super::room::find_row(conn, &record.room).await?.is_none() {
        return Err(AppError::not_found(&record.room));
    }
    if timeslot::Entity::find_by_id(record.timeslot_id).one(conn).await?.is_none() {
        return Err(AppError::not_found(format!("timeslot {}", record.timeslot_id)));
    }
    Ok(())
}

/// Whether another showtime holds the same room, timeslot and date.
async fn slot_taken<C: ConnectionTrait>(
    conn: &C,
    record: &Showtime,
    exclude: Option<i32>,
) -> AppResult<bool> {
    let mut query = showtime::Entity::find()
        .filter(showtime::Column::RoomCinemaName.eq(record.room.cinema_name.as_str()))
        .filter(showtime::Column::RoomNumber.eq(record.room.number))
        .filter(showtime::Column::TimeslotId.eq(record.timeslot_id))
        .filter(showtime::Column::ShowDate.eq(date_key(record.show_date)));
    if let Some(id) = exclude {
        query = query.filter(showtime::Column::Id.ne(id));
    }
    Ok(query.count(conn).await? > 0)
}

fn slot_conflict(record: &Showtime) -> AppError {
    AppError::Conflict(format!(
        "a showtime already exists in {} at timeslot {} on {}",
        record.room, record.timeslot_id, record.show_date
    ))
}

fn occupied_or(err: DbErr, record: &Showtime) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            warn!(room = %record.room, date = %record.show_date, "slot taken concurrently");
            slot_conflict(record)
        },
        _ => err.into(),
    }
}

/// Attaches film, room and timeslot to each row, three queries in total.
async fn resolve<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<showtime::Model>,
) -> AppResult<Vec<ShowtimeDetails>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let film_ids: BTreeSet<i32> = rows.iter().map(|r| r.film_id).collect();
    let timeslot_ids: BTreeSet<i32> = rows.iter().map(|r| r.timeslot_id).collect();
    let cinema_names: BTreeSet<&str> = rows.iter().map(|r| r.room_cinema_name.as_str()).collect();

    let films: HashMap<i32, Film> = film::Entity::find()
        .filter(film::Column::Id.is_in(film_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|f| (f.id, to_film(f)))
        .collect();

    let timeslots: HashMap<i32, Timeslot> = timeslot::Entity::find()
        .filter(timeslot::Column::Id.is_in(timeslot_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|t| to_timeslot(t).map(|t| (t.id, t)))
        .collect::<AppResult<_>>()?;

    let rooms: HashMap<RoomKey, Room> = room::Entity::find()
        .filter(room::Column::CinemaName.is_in(cinema_names))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| to_room(r).map(|r| (r.key(), r)))
        .collect::<AppResult<_>>()?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let key = RoomKey::new(row.room_cinema_name, row.room_number);
        let (Some(film), Some(room), Some(timeslot)) =
            (films.get(&row.film_id), rooms.get(&key), timeslots.get(&row.timeslot_id))
        else {
            warn!(id = row.id, "showtime with dangling reference skipped");
            continue;
        };
        out.push(ShowtimeDetails {
            id: row.id,
            price: row.price,
            show_date: row.show_date.parse()?,
            film: film.clone(),
            room: room.clone(),
            timeslot: timeslot.clone(),
        });
    }

    out.sort_by(|a, b| {
        (a.show_date, a.timeslot.start_time, a.id).cmp(&(b.show_date, b.timeslot.start_time, b.id))
    });
    Ok(out)
}
