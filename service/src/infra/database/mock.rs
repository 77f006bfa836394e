//! In-memory [`Database`] for tests.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Update},
    DateTime, Money,
};
use tracerr::Traced;

use crate::{
    domain::{
        booking, ledger, pricing, user, Booking, Discount, Payment,
        PriceTable, User,
    },
    infra::{database, Database},
    read, Config, Service,
};

/// Password of the [`User`]s created by [`agent()`] and [`operator()`].
pub const PASSWORD: &str = "rahasia123";

/// Operation of a [`Mock`] that can be made to fail.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Op {
    /// [`Transact`].
    Transact,

    /// [`Commit`].
    Commit,

    /// Selecting [`PriceTable`].
    SelectPriceTable,

    /// Inserting a [`Booking`].
    InsertBooking,

    /// Inserting a [`Payment`].
    InsertPayment,

    /// Inserting a [`ledger::Entry`].
    InsertLedgerEntry,

    /// Updating a [`User`].
    UpdateUser,
}

/// Everything stored in a [`Mock`].
#[derive(Clone, Debug, Default)]
struct State {
    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,

    /// Stored [`user::Document`]s.
    documents: Vec<user::Document>,

    /// Stored [`PriceTable`].
    prices: PriceTable,

    /// Stored [`Discount`]s.
    discounts: HashMap<user::Id, Discount>,

    /// Stored [`Booking`]s.
    bookings: BTreeMap<booking::Id, Booking>,

    /// Stored [`Payment`]s.
    payments: Vec<Payment>,

    /// Stored [`ledger::Entry`]s.
    ledger: Vec<ledger::Entry>,
}

/// In-memory [`Database`].
///
/// [`Transact`] works on a copy of the stored [`State`], which replaces it on
/// [`Commit`]. Dropping an uncommitted copy rolls it back.
#[derive(Clone, Debug, Default)]
pub struct Mock {
    /// Committed [`State`].
    committed: Arc<Mutex<State>>,

    /// [`State`] of the ongoing transaction, if any.
    tx: Option<Arc<Mutex<State>>>,

    /// [`Op`]s to fail.
    failing: Arc<Mutex<HashSet<Op>>>,
}

impl Mock {
    /// Makes every further execution of the provided [`Op`] fail.
    pub fn fail_on(&self, op: Op) {
        let _ = self.failing.lock().unwrap().insert(op);
    }

    /// Returns all the committed [`Booking`]s.
    pub fn bookings(&self) -> Vec<Booking> {
        self.committed.lock().unwrap().bookings.values().cloned().collect()
    }

    /// Returns the committed [`Payment`]s of the provided [`Booking`].
    pub fn payments(&self, booking_id: booking::Id) -> Vec<Payment> {
        self.committed
            .lock()
            .unwrap()
            .payments
            .iter()
            .filter(|p| p.booking_id == booking_id)
            .cloned()
            .collect()
    }

    /// Returns the committed [`ledger::Entry`]s of the provided [`User`].
    pub fn ledger(&self, user_id: user::Id) -> Vec<ledger::Entry> {
        self.committed
            .lock()
            .unwrap()
            .ledger
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Returns the [`State`] operations are applied to.
    fn state(&self) -> MutexGuard<'_, State> {
        self.tx.as_ref().unwrap_or(&self.committed).lock().unwrap()
    }

    /// Fails if the provided [`Op`] should fail.
    fn check(&self, op: Op) -> Result<(), Traced<database::Error>> {
        if self.failing.lock().unwrap().contains(&op) {
            return Err(tracerr::new!(database::Error::Mock(op)));
        }
        Ok(())
    }
}

/// Creates a new agent [`User`] with the [`PASSWORD`].
pub fn agent() -> User {
    new_user(user::Role::Agent, "agent@travel.id")
}

/// Creates a new operator [`User`] with the [`PASSWORD`].
pub fn operator() -> User {
    new_user(user::Role::Operator, "operator@handling.id")
}

/// Creates a new [`User`] of the provided [`user::Role`].
fn new_user(role: user::Role, email: &str) -> User {
    let password = user::Password::new(PASSWORD).unwrap();
    User {
        id: user::Id::new(),
        name: user::Name::new("Dewi Lestari").unwrap(),
        email: user::Email::new(email).unwrap(),
        password_hash: user::PasswordHash::new(&password).unwrap(),
        phone: user::Phone::new("081298765432").unwrap(),
        company: None,
        role,
        balance: Money::ZERO,
        discount: None,
        created_at: DateTime::now().coerce(),
        deleted_at: None,
    }
}

/// Creates a new [`Service`] on top of the provided [`Mock`].
pub fn service(db: Mock) -> Service<Mock> {
    let secret = b"handling-secret";
    Service::new(
        Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            session_ttl: Duration::from_secs(30 * 60),
        },
        db,
    )
}

impl Database<Transact> for Mock {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        self.check(Op::Transact)?;
        if self.tx.is_some() {
            return Ok(self.clone());
        }
        let staged = self.committed.lock().unwrap().clone();
        Ok(Self {
            tx: Some(Arc::new(Mutex::new(staged))),
            ..self.clone()
        })
    }
}

impl Database<Commit> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.check(Op::Commit)?;
        if let Some(tx) = &self.tx {
            *self.committed.lock().unwrap() = tx.lock().unwrap().clone();
        }
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Mock {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().users.get(&by.into_inner()).cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for Mock {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .state()
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }
}

impl Database<Insert<User>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().users.insert(user.id, user));
        Ok(())
    }
}

impl Database<Update<User>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Op::UpdateUser)?;
        drop(self.state().users.insert(user.id, user));
        Ok(())
    }
}

impl Database<Lock<By<User, user::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Insert<user::Document>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(doc): Insert<user::Document>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state().documents.push(doc);
        Ok(())
    }
}

impl Database<Select<By<Vec<user::Document>, user::Id>>> for Mock {
    type Ok = Vec<user::Document>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<user::Document>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        Ok(self
            .state()
            .documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }
}

impl Database<Insert<PriceTable>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(table): Insert<PriceTable>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state().prices = table;
        Ok(())
    }
}

impl Database<Select<By<PriceTable, pricing::Category>>> for Mock {
    type Ok = PriceTable;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<PriceTable, pricing::Category>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Op::SelectPriceTable)?;
        Ok(self.state().prices.clone())
    }
}

impl Database<Insert<Discount>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(discount): Insert<Discount>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(discount)).await
    }
}

impl Database<Update<Discount>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(discount): Update<Discount>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().discounts.insert(discount.user_id, discount));
        Ok(())
    }
}

impl Database<Select<By<Option<Discount>, user::Id>>> for Mock {
    type Ok = Option<Discount>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Discount>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().discounts.get(&by.into_inner()).cloned())
    }
}

impl Database<Insert<Booking>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Op::InsertBooking)?;
        drop(self.state().bookings.insert(booking.id, booking));
        Ok(())
    }
}

impl Database<Update<Booking>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().bookings.insert(booking.id, booking));
        Ok(())
    }
}

impl Database<Lock<By<Booking, booking::Id>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<Booking>, booking::Id>>> for Mock {
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().bookings.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Vec<Booking>, read::booking::list::Filter>>>
    for Mock
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, read::booking::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        Ok(self
            .state()
            .bookings
            .values()
            .rev()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }
}

impl Database<Insert<Payment>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Op::InsertPayment)?;
        self.state().payments.push(payment);
        Ok(())
    }
}

impl Database<Insert<ledger::Entry>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<ledger::Entry>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Op::InsertLedgerEntry)?;
        self.state().ledger.push(entry);
        Ok(())
    }
}
