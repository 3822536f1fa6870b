pub mod availability;
pub mod bookings;
pub mod grid;
pub mod tags;
