//! Read entities definitions.

pub mod booking;
pub mod ledger;
pub mod user;
