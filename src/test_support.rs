use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

use jiff::civil::date;
use sea_orm::DatabaseConnection;

use crate::{
    db,
    models::{Cinema, Film, Room},
    repository::{CinemaRepository, CrudRepository, FilmRepository, RoomRepository},
};

/// Fresh migrated database. One connection, so every handle sees the same memory store.
pub async fn memory_db() -> DatabaseConnection {
    db::connect_and_migrate("sqlite::memory:", 1).await.unwrap()
}

/// Migrated database in a temporary file, shared by a pool of connections. The files go
/// away on drop.
pub struct FileDb {
    pub db: DatabaseConnection,
    path: PathBuf,
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub async fn file_db(max_connections: u32) -> FileDb {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let name = format!(
        "cineboard-test-{}-{}.db",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    );
    let path = std::env::temp_dir().join(name);
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = db::connect_and_migrate(&url, max_connections).await.unwrap();
    FileDb { db, path }
}

pub async fn seed_cinema(db: &DatabaseConnection, name: &str, street: Option<&str>) {
    let cinema = Cinema { name: name.to_string(), street: street.map(str::to_string), street_number: 1 };
    CinemaRepository::new(db.clone()).insert(cinema).await.unwrap();
}

pub async fn seed_room(db: &DatabaseConnection, cinema: &str, number: i32) {
    let room = Room {
        cinema_name: cinema.to_string(),
        number,
        capacity: 100,
        construction_date: date(2000, 1, 1),
    };
    RoomRepository::new(db.clone()).insert(room).await.unwrap();
}

pub async fn seed_film(db: &DatabaseConnection, title: &str) -> i32 {
    let film = Film { id: 0, title: title.to_string(), year: 1990, genre: "Drame".to_string() };
    FilmRepository::new(db.clone()).insert(film).await.unwrap()
}
