use crate::domain::car::{Car, NewCar};
use crate::domain::error::DomainError;
use crate::domain::payment::{NewPayment, Payment};
use crate::domain::rental::{NewRental, Rental, RentalFilter};
use crate::domain::repository::{
    CarReader, CarRepository, PaymentReader, PaymentRepository, RentalReader, RentalRepository,
    Snapshot, Store, Transaction, UserReader, UserRepository,
};
use crate::domain::user::{NewUser, User};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::{debug, instrument, trace};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    cars: BTreeMap<i64, Car>,
    rentals: BTreeMap<i64, Rental>,
    payments: BTreeMap<i64, Payment>,
}

/// Rows written by an open transaction, shadowing the committed table.
#[derive(Debug)]
struct Staged<T> {
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Staged<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Staged<T> {
    fn get<'a>(&'a self, committed: &'a BTreeMap<i64, T>, id: i64) -> Option<&'a T> {
        self.rows.get(&id).or_else(|| committed.get(&id))
    }

    /// Every row in id order, staged versions winning over committed ones.
    fn values<'a>(&'a self, committed: &'a BTreeMap<i64, T>) -> Vec<&'a T> {
        if self.rows.is_empty() {
            return committed.values().collect();
        }
        let mut merged: BTreeMap<i64, &'a T> =
            committed.iter().map(|(id, row)| (*id, row)).collect();
        merged.extend(self.rows.iter().map(|(id, row)| (*id, row)));
        merged.into_values().collect()
    }

    fn next_id(&self, committed: &BTreeMap<i64, T>) -> i64 {
        let last_committed = committed.last_key_value().map(|(id, _)| *id);
        let last_staged = self.rows.last_key_value().map(|(id, _)| *id);
        last_committed.max(last_staged).map_or(1, |id| id + 1)
    }

    fn put(&mut self, id: i64, row: T) {
        self.rows.insert(id, row);
    }

    fn flush_into(&mut self, committed: &mut BTreeMap<i64, T>) {
        committed.extend(std::mem::take(&mut self.rows));
    }
}

fn not_found(entity: &str, id: i64) -> anyhow::Error {
    DomainError::NotFound(format!("{} with id {} not found", entity, id)).into()
}

/// In-memory store.
///
/// Snapshots share a read lock. A transaction holds the write lock for its
/// whole lifetime and stages only the rows it writes, so writers are
/// serialized and a dropped transaction leaves no trace.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        trace!("Acquiring write lock for transaction");
        let guard = self.tables.clone().write_owned().await;
        Ok(Box::new(MemoryTransaction::new(guard)))
    }

    async fn read(&self) -> Result<Box<dyn Snapshot>> {
        trace!("Acquiring read lock for snapshot");
        let guard = self.tables.clone().read_owned().await;
        Ok(Box::new(MemorySnapshot::new(guard)))
    }
}

/// Committed tables seen through a lock guard, with staged rows on top.
struct MemoryView<G> {
    guard: G,
    users: Staged<User>,
    cars: Staged<Car>,
    rentals: Staged<Rental>,
    payments: Staged<Payment>,
}

impl<G> MemoryView<G> {
    fn new(guard: G) -> Self {
        Self {
            guard,
            users: Staged::default(),
            cars: Staged::default(),
            rentals: Staged::default(),
            payments: Staged::default(),
        }
    }
}

type MemorySnapshot = MemoryView<OwnedRwLockReadGuard<Tables>>;
type MemoryTransaction = MemoryView<OwnedRwLockWriteGuard<Tables>>;

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(&mut self) -> Result<()> {
        let tables = &mut *self.guard;
        self.users.flush_into(&mut tables.users);
        self.cars.flush_into(&mut tables.cars);
        self.rentals.flush_into(&mut tables.rentals);
        self.payments.flush_into(&mut tables.payments);
        debug!("Transaction committed");
        Ok(())
    }
}

#[async_trait]
impl<G> UserReader for MemoryView<G>
where
    G: Deref<Target = Tables> + Send + Sync,
{
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.get(&self.guard.users, id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .values(&self.guard.users)
            .into_iter()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl UserRepository for MemoryTransaction {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn insert_user(&mut self, user: NewUser) -> Result<User> {
        let id = self.users.next_id(&self.guard.users);
        let user = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
        };
        self.users.put(id, user.clone());
        debug!(user_id = id, "User staged for insert");
        Ok(user)
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    async fn update_user(&mut self, user: User) -> Result<()> {
        if self.users.get(&self.guard.users, user.id).is_none() {
            return Err(not_found("User", user.id));
        }
        self.users.put(user.id, user);
        Ok(())
    }
}

#[async_trait]
impl<G> CarReader for MemoryView<G>
where
    G: Deref<Target = Tables> + Send + Sync,
{
    async fn find_car_by_id(&self, id: i64) -> Result<Option<Car>> {
        Ok(self.cars.get(&self.guard.cars, id).cloned())
    }

    async fn find_cars(&self) -> Result<Vec<Car>> {
        Ok(self
            .cars
            .values(&self.guard.cars)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CarRepository for MemoryTransaction {
    #[instrument(skip(self, car), fields(model = %car.model))]
    async fn insert_car(&mut self, car: NewCar) -> Result<Car> {
        let id = self.cars.next_id(&self.guard.cars);
        let car = Car {
            id,
            model: car.model,
            brand: car.brand,
            car_type: car.car_type,
            inventory: car.inventory,
            daily_fee: car.daily_fee,
        };
        self.cars.put(id, car.clone());
        debug!(car_id = id, "Car staged for insert");
        Ok(car)
    }

    #[instrument(skip(self, car), fields(car_id = car.id, inventory = car.inventory))]
    async fn update_car(&mut self, car: Car) -> Result<()> {
        if self.cars.get(&self.guard.cars, car.id).is_none() {
            return Err(not_found("Car", car.id));
        }
        self.cars.put(car.id, car);
        Ok(())
    }
}

#[async_trait]
impl<G> RentalReader for MemoryView<G>
where
    G: Deref<Target = Tables> + Send + Sync,
{
    async fn find_rental_by_id(&self, id: i64) -> Result<Option<Rental>> {
        Ok(self.rentals.get(&self.guard.rentals, id).cloned())
    }

    async fn find_rentals(&self, filter: &RentalFilter) -> Result<Vec<Rental>> {
        Ok(self
            .rentals
            .values(&self.guard.rentals)
            .into_iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RentalRepository for MemoryTransaction {
    #[instrument(skip(self, rental), fields(car_id = rental.car_id, user_id = rental.user_id))]
    async fn insert_rental(&mut self, rental: NewRental) -> Result<Rental> {
        let id = self.rentals.next_id(&self.guard.rentals);
        let rental = Rental {
            id,
            car_id: rental.car_id,
            user_id: rental.user_id,
            rental_date: rental.rental_date,
            return_date: rental.return_date,
            actual_return_date: None,
        };
        self.rentals.put(id, rental.clone());
        debug!(rental_id = id, "Rental staged for insert");
        Ok(rental)
    }

    #[instrument(skip(self, rental), fields(rental_id = rental.id))]
    async fn update_rental(&mut self, rental: Rental) -> Result<()> {
        if self.rentals.get(&self.guard.rentals, rental.id).is_none() {
            return Err(not_found("Rental", rental.id));
        }
        self.rentals.put(rental.id, rental);
        Ok(())
    }
}

#[async_trait]
impl<G> PaymentReader for MemoryView<G>
where
    G: Deref<Target = Tables> + Send + Sync,
{
    async fn find_payment_by_id(&self, id: i64) -> Result<Option<Payment>> {
        Ok(self
            .payments
            .get(&self.guard.payments, id)
            .filter(|p| p.is_visible())
            .cloned())
    }

    async fn find_payment_by_session_id(&self, session_id: &str) -> Result<Option<Payment>> {
        Ok(self
            .payments
            .values(&self.guard.payments)
            .into_iter()
            .filter(|p| p.is_visible())
            .find(|p| p.session_id == session_id)
            .cloned())
    }

    async fn find_payments(&self, rental_ids: Option<&[i64]>) -> Result<Vec<Payment>> {
        Ok(self
            .payments
            .values(&self.guard.payments)
            .into_iter()
            .filter(|p| p.is_visible())
            .filter(|p| rental_ids.is_none_or(|ids| ids.contains(&p.rental_id)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PaymentRepository for MemoryTransaction {
    #[instrument(skip(self, payment), fields(rental_id = payment.rental_id))]
    async fn insert_payment(&mut self, payment: NewPayment) -> Result<Payment> {
        let id = self.payments.next_id(&self.guard.payments);
        let payment = Payment {
            id,
            status: payment.status,
            payment_type: payment.payment_type,
            rental_id: payment.rental_id,
            session_url: payment.session_url,
            session_id: payment.session_id,
            amount_to_pay: payment.amount_to_pay,
            deleted: false,
        };
        self.payments.put(id, payment.clone());
        debug!(payment_id = id, "Payment staged for insert");
        Ok(payment)
    }

    #[instrument(skip(self, payment), fields(payment_id = payment.id))]
    async fn update_payment(&mut self, payment: Payment) -> Result<()> {
        let visible = self
            .payments
            .get(&self.guard.payments, payment.id)
            .is_some_and(Payment::is_visible);
        if !visible {
            return Err(not_found("Payment", payment.id));
        }
        self.payments.put(payment.id, payment);
        Ok(())
    }
}
