use jiff::civil::{Date, Time};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Identity of a room: its cinema plus its number within that cinema.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RoomKey {
    pub cinema_name: String,
    pub number: i32,
}

impl RoomKey {
    pub fn new(cinema_name: impl Into<String>, number: i32) -> Self {
        Self { cinema_name: cinema_name.into(), number }
    }
}

impl std::fmt::Display for RoomKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "room {} of cinema {}", self.number, self.cinema_name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Cinema {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(length(max = 200))]
    pub street: Option<String>,
    #[validate(range(min = 1, max = 9999))]
    pub street_number: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Room {
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub cinema_name: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 999))]
    pub number: i32,
    #[validate(range(min = 1, max = 1000))]
    pub capacity: i32,
    pub construction_date: Date,
}

impl Room {
    pub fn key(&self) -> RoomKey {
        RoomKey::new(self.cinema_name.clone(), self.number)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Film {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub title: String,
    #[validate(range(min = 1800, max = 2100))]
    pub year: i32,
    #[validate(length(min = 1, max = 50))]
    pub genre: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timeslot {
    pub id: i32,
    pub start_time: Time,
    pub end_time: Time,
}

/// A screening as written to the store: references are carried by key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Showtime {
    #[serde(default)]
    pub id: i32,
    #[validate(range(min = 0.01, max = 999.99))]
    pub price: f64,
    pub show_date: Date,
    #[serde(default)]
    pub film_id: i32,
    pub room: RoomKey,
    pub timeslot_id: i32,
}

/// A screening as read back, with film, room and timeslot resolved.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShowtimeDetails {
    pub id: i32,
    pub price: f64,
    pub show_date: Date,
    pub film: Film,
    pub room: Room,
    pub timeslot: Timeslot,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CinemaFilter {
    pub search: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RoomFilter {
    #[serde(default)]
    pub cinema_name: String,
    pub number: Option<i32>,
    pub capacity_min: Option<i32>,
    pub capacity_max: Option<i32>,
    pub built_from: Option<Date>,
    pub built_to: Option<Date>,
}

impl RoomFilter {
    pub fn for_cinema(cinema_name: impl Into<String>) -> Self {
        Self { cinema_name: cinema_name.into(), ..Self::default() }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FilmFilter {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ShowtimeFilter {
    pub cinema_name: Option<String>,
    pub room_number: Option<i32>,
    pub film_id: Option<i32>,
    pub film_title: Option<String>,
    pub show_date: Option<Date>,
    /// Timeslot starts at or after this time.
    pub start_time: Option<Time>,
    /// Timeslot ends at or before this time.
    pub end_time: Option<Time>,
}

/// Storage form of a date; lexical order matches calendar order.
pub fn date_key(date: Date) -> String {
    date.strftime("%Y-%m-%d").to_string()
}

pub fn time_key(time: Time) -> String {
    time.strftime("%H:%M:%S").to_string()
}

/// Case-insensitive substring test that also folds non-ASCII letters.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Trimmed, non-empty search text.
pub fn search_term(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, time};
    use validator::Validate;

    use super::*;

    #[test]
    fn keys_sort_like_their_values() {
        assert_eq!(date_key(date(2025, 3, 7)), "2025-03-07");
        assert_eq!(time_key(time(9, 5, 0, 0)), "09:05:00");
        assert!(date_key(date(2025, 3, 7)) < date_key(date(2025, 11, 1)));
        assert!(time_key(time(9, 0, 0, 0)) < time_key(time(14, 0, 0, 0)));
    }

    #[test]
    fn case_folding_covers_accents() {
        assert!(contains_ignore_case("Pathé Wepler", "PATHÉ"));
        assert!(!contains_ignore_case("UGC", "pathé"));
    }

    #[test]
    fn room_keys_compare_by_value() {
        assert_eq!(RoomKey::new("UGC", 3), RoomKey::new("UGC".to_string(), 3));
        assert_ne!(RoomKey::new("UGC", 3), RoomKey::new("UGC", 4));
    }

    #[test]
    fn blank_search_terms_are_dropped() {
        assert_eq!(search_term(None), None);
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(Some(" Pathé ")), Some("Pathé"));
    }

    #[test]
    fn cinema_field_limits() {
        let mut cinema =
            Cinema { name: "Pathé".to_string(), street: None, street_number: 12 };
        assert!(cinema.validate().is_ok());

        cinema.name = "P".to_string();
        assert!(cinema.validate().is_err());

        cinema.name = "Pathé".to_string();
        cinema.street_number = 0;
        assert!(cinema.validate().is_err());
    }

    #[test]
    fn showtime_price_limits() {
        let mut showtime = Showtime {
            id: 0,
            price: 0.01,
            show_date: date(2030, 1, 1),
            film_id: 1,
            room: RoomKey::new("UGC", 1),
            timeslot_id: 1,
        };
        assert!(showtime.validate().is_ok());

        showtime.price = 1000.0;
        assert!(showtime.validate().is_err());
    }
}
