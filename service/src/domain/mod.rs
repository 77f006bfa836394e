//! Domain definitions.

pub mod booking;
pub mod discount;
pub mod ledger;
pub mod payment;
pub mod pricing;
pub mod travel;
pub mod user;

pub use self::{
    booking::Booking, discount::Discount, payment::Payment,
    pricing::PriceTable, user::User,
};
