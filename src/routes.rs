use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;
use validator::Validate;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        Cinema, CinemaFilter, Film, FilmFilter, Room, RoomFilter, RoomKey, Showtime,
        ShowtimeDetails, ShowtimeFilter, Timeslot,
    },
    pagination::{PaginatedList, PaginationQuery},
    services::{HomePage, HomeQuery, PaginatedService, local_today},
};

type Shared = State<Arc<AppState>>;

pub async fn home(State(state): Shared, Query(q): Query<HomeQuery>) -> AppResult<Json<HomePage>> {
    Ok(Json(state.home.home(&q, local_today()).await?))
}

// cinemas

pub async fn list_cinemas(
    State(state): Shared,
    Query(page): Query<PaginationQuery>,
    Query(filter): Query<CinemaFilter>,
) -> AppResult<Json<PaginatedList<Cinema>>> {
    Ok(Json(state.cinemas.get_all_paginated_and_filtered(page.into(), &filter).await?))
}

#[derive(Serialize)]
pub struct CinemaDetails {
    #[serde(flatten)]
    cinema: Cinema,
    rooms: Vec<Room>,
}

pub async fn get_cinema(
    State(state): Shared,
    Path(name): Path<String>,
) -> AppResult<Json<CinemaDetails>> {
    let cinema = state
        .cinemas
        .get_one_by_id(&name)
        .await?
        .ok_or_else(|| AppError::not_found(format!("cinema {name}")))?;
    let rooms = state.rooms.get_all_by_cinema(&cinema.name).await?;
    Ok(Json(CinemaDetails { cinema, rooms }))
}

pub async fn create_cinema(
    State(state): Shared,
    Json(cinema): Json<Cinema>,
) -> AppResult<(StatusCode, Json<Cinema>)> {
    cinema.validate()?;
    state.cinemas.add(cinema.clone()).await?;
    Ok((StatusCode::CREATED, Json(cinema)))
}

pub async fn update_cinema(
    State(state): Shared,
    Path(name): Path<String>,
    Json(mut cinema): Json<Cinema>,
) -> AppResult<StatusCode> {
    cinema.name = name;
    cinema.validate()?;
    state.cinemas.update(cinema).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_cinema(State(state): Shared, Path(name): Path<String>) -> AppResult<StatusCode> {
    state.cinemas.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

// rooms

pub async fn list_rooms(
    State(state): Shared,
    Path(cinema_name): Path<String>,
    Query(page): Query<PaginationQuery>,
    Query(mut filter): Query<RoomFilter>,
) -> AppResult<Json<PaginatedList<Room>>> {
    if state.cinemas.get_one_by_id(&cinema_name).await?.is_none() {
        return Err(AppError::not_found(format!("cinema {cinema_name}")));
    }
    filter.cinema_name = cinema_name;
    Ok(Json(state.rooms.get_all_paginated_and_filtered(page.into(), &filter).await?))
}

pub async fn get_room(
    State(state): Shared,
    Path((cinema_name, number)): Path<(String, i32)>,
) -> AppResult<Json<Room>> {
    let key = RoomKey::new(cinema_name, number);
    let room = state.rooms.get_one_by_id(&key).await?;
    room.map(Json).ok_or_else(|| AppError::not_found(&key))
}

pub async fn create_room(
    State(state): Shared,
    Path(cinema_name): Path<String>,
    Json(mut room): Json<Room>,
) -> AppResult<(StatusCode, Json<Room>)> {
    room.cinema_name = cinema_name;
    room.validate()?;
    state.rooms.add(room.clone()).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn update_room(
    State(state): Shared,
    Path((cinema_name, number)): Path<(String, i32)>,
    Json(mut room): Json<Room>,
) -> AppResult<StatusCode> {
    room.cinema_name = cinema_name;
    room.number = number;
    room.validate()?;
    state.rooms.update(room).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_room(
    State(state): Shared,
    Path((cinema_name, number)): Path<(String, i32)>,
) -> AppResult<StatusCode> {
    state.rooms.delete(&RoomKey::new(cinema_name, number)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// films

pub async fn list_films(
    State(state): Shared,
    Query(page): Query<PaginationQuery>,
    Query(filter): Query<FilmFilter>,
) -> AppResult<Json<PaginatedList<Film>>> {
    Ok(Json(state.films.get_all_paginated_and_filtered(page.into(), &filter).await?))
}

pub async fn get_film(State(state): Shared, Path(id): Path<i32>) -> AppResult<Json<Film>> {
    let film = state.films.get_one_by_id(id).await?;
    film.map(Json).ok_or_else(|| AppError::not_found(format!("film {id}")))
}

pub async fn create_film(
    State(state): Shared,
    Json(mut film): Json<Film>,
) -> AppResult<(StatusCode, Json<Film>)> {
    film.id = state.films.add(film.clone()).await?;
    Ok((StatusCode::CREATED, Json(film)))
}

pub async fn update_film(
    State(state): Shared,
    Path(id): Path<i32>,
    Json(mut film): Json<Film>,
) -> AppResult<StatusCode> {
    film.id = id;
    state.films.update(film).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_film(State(state): Shared, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.films.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// showtimes, always addressed through their film

pub async fn list_showtimes(
    State(state): Shared,
    Path(film_id): Path<i32>,
    Query(page): Query<PaginationQuery>,
    Query(mut filter): Query<ShowtimeFilter>,
) -> AppResult<Json<PaginatedList<ShowtimeDetails>>> {
    if state.films.get_one_by_id(film_id).await?.is_none() {
        return Err(AppError::not_found(format!("film {film_id}")));
    }
    filter.film_id = Some(film_id);
    Ok(Json(state.showtimes.get_all_paginated_and_filtered(page.into(), &filter).await?))
}

pub async fn get_showtime(
    State(state): Shared,
    Path((film_id, id)): Path<(i32, i32)>,
) -> AppResult<Json<ShowtimeDetails>> {
    Ok(Json(film_showtime(&state, film_id, id).await?))
}

pub async fn create_showtime(
    State(state): Shared,
    Path(film_id): Path<i32>,
    Json(mut showtime): Json<Showtime>,
) -> AppResult<(StatusCode, Json<Showtime>)> {
    showtime.film_id = film_id;
    showtime.id = state.showtimes.add(showtime.clone()).await?;
    Ok((StatusCode::CREATED, Json(showtime)))
}

pub async fn update_showtime(
    State(state): Shared,
    Path((film_id, id)): Path<(i32, i32)>,
    Json(mut showtime): Json<Showtime>,
) -> AppResult<StatusCode> {
    film_showtime(&state, film_id, id).await?;
    showtime.id = id;
    showtime.film_id = film_id;
    state.showtimes.update(showtime).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_showtime(
    State(state): Shared,
    Path((film_id, id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    film_showtime(&state, film_id, id).await?;
    state.showtimes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A showtime of another film is reported as missing.
async fn film_showtime(state: &AppState, film_id: i32, id: i32) -> AppResult<ShowtimeDetails> {
    state
        .showtimes
        .get_one_by_id(id)
        .await?
        .filter(|s| s.film.id == film_id)
        .ok_or_else(|| AppError::not_found(format!("showtime {id} of film {film_id}")))
}

// timeslots

pub async fn list_timeslots(State(state): Shared) -> AppResult<Json<Vec<Timeslot>>> {
    Ok(Json(state.timeslots.get_all().await?))
}

pub async fn get_timeslot(State(state): Shared, Path(id): Path<i32>) -> AppResult<Json<Timeslot>> {
    let timeslot = state.timeslots.get_one_by_id(id).await?;
    timeslot.map(Json).ok_or_else(|| AppError::not_found(format!("timeslot {id}")))
}

pub async fn create_timeslot() -> AppError {
    AppError::Unsupported("creating a timeslot")
}

pub async fn update_timeslot(Path(_id): Path<i32>) -> AppError {
    AppError::Unsupported("updating a timeslot")
}

pub async fn delete_timeslot(Path(_id): Path<i32>) -> AppError {
    AppError::Unsupported("deleting a timeslot")
}
