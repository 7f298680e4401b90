use std::collections::{BTreeMap, HashMap};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{CinemaService, FilmService, PaginatedService, ShowtimeService};
use crate::{
    error::AppResult,
    models::{Cinema, Film, FilmFilter, ShowtimeDetails, ShowtimeFilter, search_term},
    pagination::PaginationParams,
};

const FEATURED_FILMS: usize = 10;
const FILM_SEARCH_LIMIT: u32 = 50;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub search_type: Option<String>,
    pub search_cinema: Option<String>,
    pub search_film: Option<String>,
    pub cinema_name: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CinemaShowtimes {
    pub cinema: Cinema,
    pub showtimes: Vec<ShowtimeDetails>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FilmShowtimes {
    pub film: Film,
    pub cinemas: Vec<CinemaShowtimes>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FilmSchedule {
    pub film: Film,
    pub showtimes: Vec<ShowtimeDetails>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CinemaSchedule {
    pub cinema: Cinema,
    pub films: Vec<FilmSchedule>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "search_type", rename_all = "snake_case")]
pub enum HomePage {
    Cinema { search: Option<String>, cinemas: Vec<Cinema> },
    Film { search: Option<String>, films: Vec<FilmShowtimes> },
    Today { date: Date, cinemas: Vec<CinemaSchedule> },
}

/// Visitor-facing catalogue: cinema search, showtimes per film, and today's programme.
#[derive(Clone)]
pub struct HomeService {
    cinemas: CinemaService,
    films: FilmService,
    showtimes: ShowtimeService,
}

impl HomeService {
    pub fn new(cinemas: CinemaService, films: FilmService, showtimes: ShowtimeService) -> Self {
        Self { cinemas, films, showtimes }
    }

    /// Unknown or missing `search_type` falls back to the cinema search.
    pub async fn home(&self, query: &HomeQuery, today: Date) -> AppResult<HomePage> {
        let search_type = query.search_type.as_deref().map(str::to_lowercase);
        match search_type.as_deref() {
            Some("film") => Ok(HomePage::Film {
                search: query.search_film.clone(),
                films: self.film_showtimes(query.search_film.as_deref()).await?,
            }),
            Some("today") => Ok(HomePage::Today {
                date: today,
                cinemas: self.today_showtimes(query.cinema_name.as_deref(), today).await?,
            }),
            _ => Ok(HomePage::Cinema {
                search: query.search_cinema.clone(),
                cinemas: self.search_cinemas(query.search_cinema.as_deref()).await?,
            }),
        }
    }

    pub async fn search_cinemas(&self, term: Option<&str>) -> AppResult<Vec<Cinema>> {
        self.cinemas.get_all_cinemas(term).await
    }

    /// Without a term: the first films in catalogue order. With one: up to fifty title
    /// matches. Each film carries its showtimes grouped by cinema.
    pub async fn film_showtimes(&self, term: Option<&str>) -> AppResult<Vec<FilmShowtimes>> {
        let films: Vec<Film> = match search_term(term) {
            None => self.films.get_all().await?.into_iter().take(FEATURED_FILMS).collect(),
            Some(title) => {
                let filter = FilmFilter { title: Some(title.to_string()), ..Default::default() };
                let params = PaginationParams { page_index: 1, page_size: FILM_SEARCH_LIMIT };
                self.films.get_all_paginated_and_filtered(params, &filter).await?.items
            },
        };
        if films.is_empty() {
            return Ok(Vec::new());
        }

        let cinemas = self.cinema_index().await?;
        let mut by_film: HashMap<i32, Vec<ShowtimeDetails>> = HashMap::new();
        for showtime in self.showtimes.get_all().await? {
            by_film.entry(showtime.film.id).or_default().push(showtime);
        }

        let out: Vec<FilmShowtimes> = films
            .into_iter()
            .map(|film| {
                let showtimes = by_film.remove(&film.id).unwrap_or_default();
                let cinemas = group_by_cinema(showtimes, &cinemas)
                    .into_iter()
                    .map(|(cinema, showtimes)| CinemaShowtimes { cinema, showtimes })
                    .collect();
                FilmShowtimes { film, cinemas }
            })
            .collect();

        debug!(term = ?term, films = out.len(), "film showtimes");
        Ok(out)
    }

    /// Showtimes on `today`, grouped by cinema then film. `cinema_name` narrows to one
    /// cinema, compared without regard to case.
    pub async fn today_showtimes(
        &self,
        cinema_name: Option<&str>,
        today: Date,
    ) -> AppResult<Vec<CinemaSchedule>> {
        let filter = ShowtimeFilter { show_date: Some(today), ..Default::default() };
        let mut showtimes = self.showtimes.get_all_with_filters(&filter).await?;
        if let Some(name) = search_term(cinema_name) {
            let name = name.to_lowercase();
            showtimes.retain(|s| s.room.cinema_name.to_lowercase() == name);
        }

        let cinemas = self.cinema_index().await?;
        let out: Vec<CinemaSchedule> = group_by_cinema(showtimes, &cinemas)
            .into_iter()
            .map(|(cinema, showtimes)| CinemaSchedule { cinema, films: group_by_film(showtimes) })
            .collect();

        debug!(date = %today, cinemas = out.len(), "today's showtimes");
        Ok(out)
    }

    async fn cinema_index(&self) -> AppResult<HashMap<String, Cinema>> {
        Ok(self.cinemas.get_all().await?.into_iter().map(|c| (c.name.clone(), c)).collect())
    }
}

/// Groups ordered by cinema name; each group keeps the input order of its showtimes.
fn group_by_cinema(
    showtimes: Vec<ShowtimeDetails>,
    cinemas: &HashMap<String, Cinema>,
) -> Vec<(Cinema, Vec<ShowtimeDetails>)> {
    let mut groups: BTreeMap<String, Vec<ShowtimeDetails>> = BTreeMap::new();
    for showtime in showtimes {
        groups.entry(showtime.room.cinema_name.clone()).or_default().push(showtime);
    }

    groups
        .into_iter()
        .filter_map(|(name, showtimes)| match cinemas.get(&name) {
            Some(cinema) => Some((cinema.clone(), showtimes)),
            None => {
                warn!(cinema = %name, "showtimes for unknown cinema skipped");
                None
            },
        })
        .collect()
}

/// Films ordered by title, showtimes by timeslot start.
fn group_by_film(showtimes: Vec<ShowtimeDetails>) -> Vec<FilmSchedule> {
    let mut groups: HashMap<i32, FilmSchedule> = HashMap::new();
    for showtime in showtimes {
        groups
            .entry(showtime.film.id)
            .or_insert_with(|| FilmSchedule { film: showtime.film.clone(), showtimes: Vec::new() })
            .showtimes
            .push(showtime);
    }

    let mut films: Vec<FilmSchedule> = groups.into_values().collect();
    for film in &mut films {
        film.showtimes.sort_by_key(|s| (s.timeslot.start_time, s.id));
    }
    films.sort_by(|a, b| a.film.title.cmp(&b.film.title).then(a.film.id.cmp(&b.film.id)));
    films
}
