//! GraphQL [`Mutation`]s definitions.

use common::Money;
use juniper::{graphql_object, Nullable};
use service::{command, domain, Command as _};

use crate::{api, define_error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers a new agent `User` and signs them in.
    ///
    /// The KYC `documents` must be uploaded to the storage beforehand.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is occupied by another
    ///                      `User`;
    /// - `NO_DOCUMENTS` - no KYC document is provided.
    #[tracing::instrument(
        skip_all,
        fields(
            company = ?company.as_ref().map(ToString::to_string),
            documents = documents.len(),
            email = %email,
            gql.name = "createUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
            phone = %phone,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        email: api::user::Email,
        password: api::user::Password,
        phone: api::user::Phone,
        company: Option<api::user::CompanyName>,
        documents: Vec<api::user::DocumentInput>,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUser {
                name: name.into(),
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                phone: phone.into(),
                company: company.map(Into::into),
                documents: documents.into_iter().map(Into::into).collect(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByUserId(output.user.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Creates a new `UserSession` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials does not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUserSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        email: api::user::Email,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Issues a fresh `UserSession` for the current `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "renewUserSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn renew_user_session(
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateUserSession::ByUserId(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the current `User`'s password to the provided one.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_PASSWORD` - provided `old_password` does not match the current
    ///                      `User` password.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateUserPassword",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_user_password(
        new_password: api::user::Password,
        old_password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateUserPassword {
                user_id: my_id.into(),
                new_password: secrecy::SecretBox::init_with(move || {
                    new_password.into()
                }),
                old_password: secrecy::SecretBox::init_with(move || {
                    old_password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the current `User`'s profile.
    ///
    /// Omitted fields are left intact, while an explicit `null` `company`
    /// removes it.
    #[tracing::instrument(
        skip_all,
        fields(
            company = ?company.clone().explicit().map(|c| c.map(|c| c.to_string())),
            gql.name = "updateUserProfile",
            name = ?name.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
            phone = ?phone.as_ref().map(ToString::to_string),
        ),
    )]
    pub async fn update_user_profile(
        name: Option<api::user::Name>,
        phone: Option<api::user::Phone>,
        company: Nullable<api::user::CompanyName>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateUserProfile {
                user_id: my_id.into(),
                name: name.map(Into::into),
                phone: phone.map(Into::into),
                company: company.explicit().map(|c| c.map(Into::into)),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Books handling services for a group of travelers.
    ///
    /// Paying `USE_SALDO` debits the wallet of the current `User` at once,
    /// while other `PaymentMethod`s leave the `Booking` `PENDING` payment.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_BOOKING` - the draft is invalid, the `fields` extension
    ///                       lists every invalid field with its reason;
    /// - `INVALID_COUNT` - the number of baggage items is negative;
    /// - `BANK_REQUIRED` - `BANK_TRANSFER` is chosen without a `Bank`;
    /// - `INSUFFICIENT_BALANCE` - the wallet balance doesn't cover the total.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createBooking",
            otel.name = Self::SPAN_NAME,
            passengers = draft.passengers,
            payment = ?payment.method,
            travel_types = ?draft.travel_types,
        ),
    )]
    pub async fn create_booking(
        draft: api::booking::DraftInput,
        payment: api::booking::PaymentInput,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let draft = draft.into_draft().map_err(ctx.error())?;
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateBooking {
                user_id: my_id.into(),
                draft,
                payment: payment.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Moves the specified `Booking` to the provided `BookingStatus`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_OPERATOR` - the current `User` is not an operator;
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist;
    /// - `INVALID_STATUS_TRANSITION` - the `Booking` cannot move to the
    ///                                 provided `BookingStatus`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateBookingStatus",
            id = %id,
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn update_booking_status(
        id: api::booking::Id,
        status: api::booking::Status,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateBookingStatus {
                operator_id: my_id.into(),
                booking_id: id.into(),
                status: status.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Grants the `Discount` to an agent `User`, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_OPERATOR` - the current `User` is not an operator;
    /// - `USER_NOT_EXISTS` - the agent `User` does not exist;
    /// - `NOT_AGENT` - the `User` to grant the `Discount` to is an operator;
    /// - `INVALID_PASSENGERS` - the reference passengers are out of range.
    #[tracing::instrument(
        skip_all,
        fields(
            agent_id = %input.agent_id,
            gql.name = "saveDiscount",
            is_active = input.is_active,
            otel.name = Self::SPAN_NAME,
            value = %input.value,
        ),
    )]
    pub async fn save_discount(
        input: api::discount::Input,
        ctx: &Context,
    ) -> Result<api::discount::Discount, Error> {
        let api::discount::Input {
            agent_id,
            value,
            is_active,
            reference_subtotal,
            reference_passengers,
        } = input;
        let reference_passengers = u16::try_from(reference_passengers)
            .ok()
            .and_then(domain::booking::Passengers::new)
            .ok_or_else(|| api::InputError::Passengers.into())
            .map_err(ctx.error())?;
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::SaveDiscount {
                operator_id: my_id.into(),
                user_id: agent_id.into(),
                value: value.into(),
                is_active,
                reference_subtotal,
                reference_passengers,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|(discount, _)| discount.into())
    }

    /// Credits the wallet of the current `User` with the provided amount.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_AMOUNT` - the amount is zero.
    #[tracing::instrument(
        skip_all,
        fields(
            amount = %amount,
            gql.name = "topUpWallet",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn top_up_wallet(
        amount: Money,
        ctx: &Context,
    ) -> Result<api::ledger::Entry, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::TopUpWallet {
                user_id: my_id.into(),
                amount,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|out| out.entry.into())
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserEmail` is occupied by another `User`"]
                EmailOccupied,

                #[code = "NO_DOCUMENTS"]
                #[status = BAD_REQUEST]
                #[message = "At least one KYC document must be provided"]
                NoDocuments,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
            Self::NoDocuments => Some(Error::NoDocuments.into()),
            Self::PasswordHash(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = FORBIDDEN]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::update_user_password::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_PASSWORD"]
                #[status = CONFLICT]
                #[message = "Provided `old_password` does not match the \
                             current `User` password"]
                WrongPassword,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PasswordHash(_) | Self::UserNotExists(_) => None,
            Self::WrongPassword => Some(Error::WrongPassword.into()),
        }
    }
}

impl AsError for command::update_user_profile::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => None,
        }
    }
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use domain::payment::GateError;

        define_error! {
            enum Error {
                #[code = "INVALID_BOOKING"]
                #[status = BAD_REQUEST]
                #[message = "Booking contains invalid fields"]
                InvalidDraft,

                #[code = "PAYMENT_METHOD_REQUIRED"]
                #[status = BAD_REQUEST]
                #[message = "Payment method must be selected"]
                MethodRequired,

                #[code = "BANK_REQUIRED"]
                #[status = BAD_REQUEST]
                #[message = "Bank must be selected for a bank transfer"]
                BankRequired,

                #[code = "INSUFFICIENT_BALANCE"]
                #[status = PAYMENT_REQUIRED]
                #[message = "Wallet balance doesn't cover the booking total"]
                InsufficientBalance,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidDraft(invalid) => Some(
                crate::Error::from(Error::InvalidDraft)
                    .with_fields(invalid.0.iter().copied()),
            ),
            Self::Payment(GateError::MethodRequired) => {
                Some(Error::MethodRequired.into())
            }
            Self::Payment(GateError::BankRequired) => {
                Some(Error::BankRequired.into())
            }
            Self::Payment(GateError::InsufficientBalance) => {
                Some(Error::InsufficientBalance.into())
            }
            Self::UserNotExists(_) => None,
        }
    }
}

impl AsError for command::update_booking_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_STATUS_TRANSITION"]
                #[status = CONFLICT]
                #[message = "`Booking` cannot move to the requested status"]
                InvalidTransition,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BookingNotExists(_) => {
                Some(api::query::BookingError::NotExists.into())
            }
            Self::InvalidTransition { .. } => {
                Some(Error::InvalidTransition.into())
            }
            Self::NotOperator(_) => Some(api::PrivilegeError::Operator.into()),
        }
    }
}

impl AsError for command::save_discount::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum DiscountError {
                #[code = "NOT_AGENT"]
                #[status = BAD_REQUEST]
                #[message = "Discounts are granted to agents only"]
                NotAgent,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotAgent(_) => Some(DiscountError::NotAgent.into()),
            Self::NotOperator(_) => Some(api::PrivilegeError::Operator.into()),
            Self::UserNotExists(_) => {
                Some(api::query::UserError::NotExists.into())
            }
        }
    }
}

impl AsError for command::top_up_wallet::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_AMOUNT"]
                #[status = BAD_REQUEST]
                #[message = "Top up amount must be positive"]
                ZeroAmount,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => None,
            Self::ZeroAmount => Some(Error::ZeroAmount.into()),
        }
    }
}
