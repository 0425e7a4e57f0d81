use crate::domain::car::{Car, NewCar};
use crate::domain::payment::{NewPayment, Payment};
use crate::domain::rental::{NewRental, Rental, RentalFilter};
use crate::domain::user::{NewUser, User};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserReader: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait UserRepository: UserReader {
    async fn insert_user(&mut self, user: NewUser) -> Result<User>;
    async fn update_user(&mut self, user: User) -> Result<()>;
}

#[async_trait]
pub trait CarReader: Send + Sync {
    async fn find_car_by_id(&self, id: i64) -> Result<Option<Car>>;
    async fn find_cars(&self) -> Result<Vec<Car>>;
}

#[async_trait]
pub trait CarRepository: CarReader {
    async fn insert_car(&mut self, car: NewCar) -> Result<Car>;
    async fn update_car(&mut self, car: Car) -> Result<()>;
}

#[async_trait]
pub trait RentalReader: Send + Sync {
    async fn find_rental_by_id(&self, id: i64) -> Result<Option<Rental>>;
    async fn find_rentals(&self, filter: &RentalFilter) -> Result<Vec<Rental>>;
}

#[async_trait]
pub trait RentalRepository: RentalReader {
    async fn insert_rental(&mut self, rental: NewRental) -> Result<Rental>;
    async fn update_rental(&mut self, rental: Rental) -> Result<()>;
}

/// Payment reads only ever see rows passing [`Payment::is_visible`].
#[async_trait]
pub trait PaymentReader: Send + Sync {
    async fn find_payment_by_id(&self, id: i64) -> Result<Option<Payment>>;
    async fn find_payment_by_session_id(&self, session_id: &str) -> Result<Option<Payment>>;
    async fn find_payments(&self, rental_ids: Option<&[i64]>) -> Result<Vec<Payment>>;
}

#[async_trait]
pub trait PaymentRepository: PaymentReader {
    async fn insert_payment(&mut self, payment: NewPayment) -> Result<Payment>;
    async fn update_payment(&mut self, payment: Payment) -> Result<()>;
}

/// Read-only view of committed state. Any number of snapshots may be open at
/// once; a writer waits until they are dropped.
pub trait Snapshot: UserReader + CarReader + RentalReader + PaymentReader {}

impl<T> Snapshot for T where T: UserReader + CarReader + RentalReader + PaymentReader {}

/// A unit of work over every repository. Writes become visible to other
/// transactions only after [`Transaction::commit`]; dropping an uncommitted
/// transaction rolls it back.
#[async_trait]
pub trait Transaction: UserRepository + CarRepository + RentalRepository + PaymentRepository {
    async fn commit(&mut self) -> Result<()>;
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Exclusive read-write transaction.
    async fn begin(&self) -> Result<Box<dyn Transaction>>;

    /// Shared read-only access for lookups and listings.
    async fn read(&self) -> Result<Box<dyn Snapshot>>;
}
