//! [`Query`] collection producing reports.
//!
//! [`Query`]: crate::Query

pub mod bookings_csv;

pub use self::bookings_csv::BookingsCsv;
