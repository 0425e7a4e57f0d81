#![allow(dead_code)]

use async_trait::async_trait;
use car_sharing_api::application::notification_service::NotificationService;
use car_sharing_api::data::memory::InMemoryStore;
use car_sharing_api::domain::car::{Car, CarType, NewCar};
use car_sharing_api::domain::error::DomainError;
use car_sharing_api::domain::notification::NotificationSender;
use car_sharing_api::domain::rental::{NewRental, Rental, RentalFilter};
use car_sharing_api::domain::repository::{
    CarReader, CarRepository, RentalReader, RentalRepository, Store, UserReader, UserRepository,
};
use car_sharing_api::domain::user::{NewUser, Role, User};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

pub const ADMIN_CHAT_ID: &str = "-1001234";
pub const CHECKOUT_BASE_URL: &str = "https://checkout.test/session";

/// Captures every notification instead of delivering it.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSender {
    pub fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn chat_ids(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(chat, _)| chat.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, chat_id: &str, text: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
    }
}

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub sender: Arc<RecordingSender>,
    pub notifications: Arc<NotificationService>,
}

pub fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let sender = Arc::new(RecordingSender::default());
    let notifications = Arc::new(NotificationService::new(
        sender.clone(),
        ADMIN_CHAT_ID.to_string(),
    ));
    Fixture {
        store,
        sender,
        notifications,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn insert_user(store: &InMemoryStore, email: &str, role: Role) -> User {
    let mut tx = store.begin().await.unwrap();
    let user = tx
        .insert_user(NewUser {
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role,
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    user
}

/// Inserts `count` customers; ids run from 1 to `count`.
pub async fn insert_customers(store: &InMemoryStore, count: usize) -> Vec<User> {
    let mut users = Vec::with_capacity(count);
    for i in 1..=count {
        users.push(insert_user(store, &format!("customer{}@example.com", i), Role::Customer).await);
    }
    users
}

pub async fn insert_car(store: &InMemoryStore, inventory: u32, daily_fee: Decimal) -> Car {
    let mut tx = store.begin().await.unwrap();
    let car = tx
        .insert_car(NewCar {
            model: "Corolla".to_string(),
            brand: "Toyota".to_string(),
            car_type: CarType::Sedan,
            inventory,
            daily_fee,
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    car
}

pub async fn insert_rental(
    store: &InMemoryStore,
    car_id: i64,
    user_id: i64,
    rental_date: NaiveDate,
    return_date: NaiveDate,
    actual_return_date: Option<NaiveDate>,
) -> Rental {
    let mut tx = store.begin().await.unwrap();
    let mut rental = tx
        .insert_rental(NewRental {
            car_id,
            user_id,
            rental_date,
            return_date,
        })
        .await
        .unwrap();
    rental.actual_return_date = actual_return_date;
    tx.update_rental(rental.clone()).await.unwrap();
    tx.commit().await.unwrap();
    rental
}

pub async fn car_inventory(store: &InMemoryStore, car_id: i64) -> u32 {
    let snapshot = store.read().await.unwrap();
    snapshot.find_car_by_id(car_id).await.unwrap().unwrap().inventory
}

pub async fn stored_rental(store: &InMemoryStore, id: i64) -> Option<Rental> {
    let snapshot = store.read().await.unwrap();
    snapshot.find_rental_by_id(id).await.unwrap()
}

pub async fn rental_count(store: &InMemoryStore) -> usize {
    let snapshot = store.read().await.unwrap();
    snapshot.find_rentals(&RentalFilter::default()).await.unwrap().len()
}

pub async fn stored_user(store: &InMemoryStore, email: &str) -> Option<User> {
    let snapshot = store.read().await.unwrap();
    snapshot.find_user_by_email(email).await.unwrap()
}

pub fn domain_error(err: &anyhow::Error) -> DomainError {
    err.downcast_ref::<DomainError>()
        .cloned()
        .unwrap_or_else(|| panic!("expected a domain error, got {err}"))
}
