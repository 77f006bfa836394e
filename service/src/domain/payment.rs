//! [`Payment`] definitions and the [`Gate`] guarding payment selection.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{Display, Error, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{Booking, User};
use crate::domain::{booking, user};

/// Payment of a [`Booking`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the [`Booking`] being paid.
    pub booking_id: booking::Id,

    /// ID of the [`User`] paying.
    pub user_id: user::Id,

    /// [`Method`] of this [`Payment`].
    pub method: Method,

    /// [`Bank`] transferred through, if [`Method::BankTransfer`].
    pub bank: Option<Bank>,

    /// Amount paid.
    pub amount: Money,

    /// [`Status`] of this [`Payment`].
    pub status: Status,

    /// [`DateTime`] when this [`Payment`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Payment`].
#[derive(
    Clone, Copy, Debug, Display, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new time-ordered [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

define_kind! {
    #[doc = "Method of a [`Payment`]."]
    enum Method {
        #[doc = "Cash on site."]
        #[label = "Cash"]
        Cash = 1,

        #[doc = "Manual transfer to one of the agency [`Bank`] accounts."]
        #[label = "Bank transfer"]
        BankTransfer = 2,

        #[doc = "Debit of the prepaid wallet balance."]
        #[label = "Saldo"]
        UseSaldo = 3,
    }
}

define_kind! {
    #[doc = "Bank accepting a [`Method::BankTransfer`]."]
    enum Bank {
        #[doc = "Bank Central Asia."]
        #[label = "BCA"]
        Bca = 1,

        #[doc = "Bank Negara Indonesia."]
        #[label = "BNI"]
        Bni = 2,

        #[doc = "Bank Rakyat Indonesia."]
        #[label = "BRI"]
        Bri = 3,

        #[doc = "Bank Mandiri."]
        #[label = "Mandiri"]
        Mandiri = 4,
    }
}

define_kind! {
    #[doc = "Status of a [`Payment`]."]
    enum Status {
        #[doc = "Awaiting the money."]
        #[label = "Pending"]
        Pending = 1,

        #[doc = "Money received."]
        #[label = "Paid"]
        Paid = 2,

        #[doc = "Payment did not go through."]
        #[label = "Failed"]
        Failed = 3,
    }
}

/// [`Method`] chosen for paying, along with its [`Bank`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Selection {
    /// Nothing chosen yet.
    #[default]
    Unselected,

    /// [`Method::Cash`].
    Cash,

    /// [`Method::BankTransfer`], with the [`Bank`] once chosen.
    BankTransfer(Option<Bank>),

    /// [`Method::UseSaldo`].
    UseSaldo,
}

impl Selection {
    /// Returns the [`Method`] of this [`Selection`], if any.
    #[must_use]
    pub fn method(&self) -> Option<Method> {
        match self {
            Self::Unselected => None,
            Self::Cash => Some(Method::Cash),
            Self::BankTransfer(_) => Some(Method::BankTransfer),
            Self::UseSaldo => Some(Method::UseSaldo),
        }
    }
}

/// Guard of a payment [`Selection`] against the wallet balance.
///
/// [`Selection::UseSaldo`] is never active while the balance doesn't cover the
/// payable amount.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Gate {
    /// Current [`Selection`].
    selection: Selection,

    /// Wallet balance of the paying [`User`].
    balance: Money,

    /// Amount to be paid.
    payable: Money,
}

impl Gate {
    /// Creates a new [`Gate`] with nothing selected.
    #[must_use]
    pub const fn new(balance: Money, payable: Money) -> Self {
        Self {
            selection: Selection::Unselected,
            balance,
            payable,
        }
    }

    /// Returns the current [`Selection`].
    #[must_use]
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// Indicates whether [`Method::UseSaldo`] may be selected.
    #[must_use]
    pub fn can_use_saldo(&self) -> bool {
        self.balance >= self.payable
    }

    /// Selects the provided [`Method`].
    ///
    /// Selecting [`Method::UseSaldo`] without enough balance keeps the
    /// previous [`Selection`]. Selecting [`Method::BankTransfer`] resets the
    /// chosen [`Bank`].
    pub fn select(&mut self, method: Method) {
        self.selection = match method {
            Method::Cash => Selection::Cash,
            Method::BankTransfer => Selection::BankTransfer(None),
            Method::UseSaldo if self.can_use_saldo() => Selection::UseSaldo,
            Method::UseSaldo => return,
        };
    }

    /// Chooses the [`Bank`] of an active [`Method::BankTransfer`].
    ///
    /// No-op for other [`Selection`]s.
    pub fn choose_bank(&mut self, bank: Bank) {
        if let Selection::BankTransfer(b) = &mut self.selection {
            *b = Some(bank);
        }
    }

    /// Updates the amount to be paid.
    ///
    /// An active [`Selection::UseSaldo`] is dropped if the balance no longer
    /// covers it.
    pub fn set_payable(&mut self, payable: Money) {
        self.payable = payable;
        if self.selection == Selection::UseSaldo && !self.can_use_saldo() {
            self.selection = Selection::Unselected;
        }
    }

    /// Applies the provided [`Selection`] as a user would: [`Method`] first,
    /// then its [`Bank`].
    #[must_use]
    pub fn with(mut self, selection: Selection) -> Self {
        if let Some(method) = selection.method() {
            self.select(method);
        }
        if let Selection::BankTransfer(Some(bank)) = selection {
            self.choose_bank(bank);
        }
        self
    }

    /// Checks whether the current [`Selection`] may be submitted.
    ///
    /// # Errors
    ///
    /// See [`GateError`] for details.
    pub fn validate(&self) -> Result<(Method, Option<Bank>), GateError> {
        match self.selection {
            Selection::Unselected => Err(GateError::MethodRequired),
            Selection::Cash => Ok((Method::Cash, None)),
            Selection::BankTransfer(None) => Err(GateError::BankRequired),
            Selection::BankTransfer(Some(bank)) => {
                Ok((Method::BankTransfer, Some(bank)))
            }
            Selection::UseSaldo if self.can_use_saldo() => {
                Ok((Method::UseSaldo, None))
            }
            Selection::UseSaldo => Err(GateError::InsufficientBalance),
        }
    }
}

/// Reason a [`Gate`] refuses submission.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum GateError {
    /// No [`Method`] selected.
    #[display("Select a payment method")]
    MethodRequired,

    /// [`Method::BankTransfer`] selected without a [`Bank`].
    #[display("Select a bank")]
    BankRequired,

    /// Balance doesn't cover the payable amount.
    #[display("Insufficient balance")]
    InsufficientBalance,
}

/// [`DateTime`] when a [`Payment`] was created.
pub type CreationDateTime = DateTimeOf<(Payment, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::Money;
    use uuid::Uuid;

    use super::{Bank, Gate, GateError, Id, Method, Selection};

    #[test]
    fn ids_are_time_based() {
        assert_eq!(Uuid::from(Id::new()).get_version_num(), 7);
    }

    fn rp(n: u64) -> Money {
        Money::from_rupiah(n)
    }

    #[test]
    fn saldo_rejected_without_balance() {
        let mut gate = Gate::new(rp(100_000), rp(105_000));

        gate.select(Method::UseSaldo);
        assert_eq!(gate.selection(), Selection::Unselected);

        gate.select(Method::Cash);
        gate.select(Method::UseSaldo);
        assert_eq!(gate.selection(), Selection::Cash);
    }

    #[test]
    fn saldo_dropped_when_payable_grows() {
        let mut gate = Gate::new(rp(100_000), rp(90_000));
        gate.select(Method::UseSaldo);
        assert_eq!(gate.validate(), Ok((Method::UseSaldo, None)));

        gate.set_payable(rp(105_000));

        assert_eq!(gate.selection(), Selection::Unselected);
        assert_eq!(gate.validate(), Err(GateError::MethodRequired));
    }

    #[test]
    fn bank_transfer_requires_bank() {
        let mut gate = Gate::new(Money::ZERO, rp(50_000));
        gate.select(Method::BankTransfer);
        assert_eq!(gate.validate(), Err(GateError::BankRequired));
        assert_eq!(GateError::BankRequired.to_string(), "Select a bank");

        gate.choose_bank(Bank::Mandiri);
        assert_eq!(
            gate.validate(),
            Ok((Method::BankTransfer, Some(Bank::Mandiri))),
        );

        gate.select(Method::BankTransfer);
        assert_eq!(gate.validate(), Err(GateError::BankRequired));
    }

    #[test]
    fn bank_ignored_for_cash() {
        let mut gate = Gate::new(Money::ZERO, rp(50_000));
        gate.select(Method::Cash);
        gate.choose_bank(Bank::Bca);

        assert_eq!(gate.validate(), Ok((Method::Cash, None)));
    }

    #[test]
    fn applies_selection() {
        let gate = Gate::new(rp(10_000), rp(50_000))
            .with(Selection::BankTransfer(Some(Bank::Bri)));
        assert_eq!(gate.validate(), Ok((Method::BankTransfer, Some(Bank::Bri))));

        let gate = Gate::new(rp(10_000), rp(50_000)).with(Selection::UseSaldo);
        assert_eq!(gate.validate(), Err(GateError::MethodRequired));
    }
}
