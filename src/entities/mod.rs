pub mod cinema;
pub mod film;
pub mod room;
pub mod showtime;
pub mod timeslot;
