mod config;
mod db;
mod entities;
mod error;
mod models;
mod pagination;
mod repository;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    repository::{
        CinemaRepository, FilmRepository, RoomRepository, ShowtimeRepository, TimeslotRepository,
    },
    services::{
        CinemaService, FilmService, HomeService, RoomService, ShowtimeService, TimeslotService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub cinemas: CinemaService,
    pub rooms: RoomService,
    pub films: FilmService,
    pub showtimes: ShowtimeService,
    pub timeslots: TimeslotService,
    pub home: HomeService,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        let cinemas = CinemaService::new(CinemaRepository::new(db.clone()));
        let films = FilmService::new(FilmRepository::new(db.clone()));
        let showtimes = ShowtimeService::new(ShowtimeRepository::new(db.clone()));
        Self {
            rooms: RoomService::new(RoomRepository::new(db.clone())),
            timeslots: TimeslotService::new(TimeslotRepository::new(db)),
            home: HomeService::new(cinemas.clone(), films.clone(), showtimes.clone()),
            cinemas,
            films,
            showtimes,
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/cinemas", get(routes::list_cinemas).post(routes::create_cinema))
        .route(
            "/cinemas/{name}",
            get(routes::get_cinema).put(routes::update_cinema).delete(routes::delete_cinema),
        )
        .route("/cinemas/{name}/rooms", get(routes::list_rooms).post(routes::create_room))
        .route(
            "/cinemas/{name}/rooms/{number}",
            get(routes::get_room).put(routes::update_room).delete(routes::delete_room),
        )
        .route("/films", get(routes::list_films).post(routes::create_film))
        .route(
            "/films/{id}",
            get(routes::get_film).put(routes::update_film).delete(routes::delete_film),
        )
        .route(
            "/films/{id}/showtimes",
            get(routes::list_showtimes).post(routes::create_showtime),
        )
        .route(
            "/films/{id}/showtimes/{showtime_id}",
            get(routes::get_showtime).put(routes::update_showtime).delete(routes::delete_showtime),
        )
        .route("/timeslots", get(routes::list_timeslots).post(routes::create_timeslot))
        .route(
            "/timeslots/{id}",
            get(routes::get_timeslot).put(routes::update_timeslot).delete(routes::delete_timeslot),
        )
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,cineboard=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let db = db::connect_and_migrate(&config.database_url, config.db_max_connections).await?;
    let state = Arc::new(AppState::new(db));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
