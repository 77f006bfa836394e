//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_booking;
pub mod create_user;
pub mod create_user_session;
pub mod save_discount;
pub mod top_up_wallet;
pub mod update_booking_status;
pub mod update_user_password;
pub mod update_user_profile;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_booking::CreateBooking, create_user::CreateUser,
    create_user_session::CreateUserSession, save_discount::SaveDiscount,
    top_up_wallet::TopUpWallet, update_booking_status::UpdateBookingStatus,
    update_user_password::UpdateUserPassword,
    update_user_profile::UpdateUserProfile,
};
