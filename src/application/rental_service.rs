use crate::application::notification_service::NotificationService;
use crate::domain::error::DomainError;
use crate::domain::rental::{CreateRentalRequest, NewRental, RentalDto, RentalFilter};
use crate::domain::repository::{
    CarReader, CarRepository, RentalReader, RentalRepository, Store,
};
use crate::domain::user::User;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct RentalService<S: Store> {
    store: Arc<S>,
    notifications: Arc<NotificationService>,
}

impl<S: Store> RentalService<S> {
    pub fn new(store: Arc<S>, notifications: Arc<NotificationService>) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Takes one unit of the car out of stock and records the rental for
    /// `user`. Both writes commit together or not at all.
    #[instrument(skip(self, user, req), fields(user_id = user.id, car_id = req.car_id))]
    pub async fn create_rental(&self, user: &User, req: CreateRentalRequest) -> Result<RentalDto> {
        req.validate()?;

        let mut tx = self.store.begin().await?;
        let mut car = tx.find_car_by_id(req.car_id).await?.ok_or_else(|| {
            DomainError::NotFound(format!("Car with id {} not found", req.car_id))
        })?;
        car.take_one()?;
        tx.update_car(car).await?;

        let rental = tx
            .insert_rental(NewRental {
                car_id: req.car_id,
                user_id: user.id,
                rental_date: req.rental_date,
                return_date: req.return_date,
            })
            .await?;
        tx.commit().await?;
        drop(tx);
        info!(rental_id = rental.id, "Rental created");

        self.notifications
            .notify_new_rentals_created(&format!(
                "User with id {} rent a car with id {} from {} to {}",
                user.id, req.car_id, req.rental_date, req.return_date
            ))
            .await;

        Ok(RentalDto::from(rental))
    }

    pub async fn list_rentals(&self, filter: &RentalFilter) -> Result<Vec<RentalDto>> {
        let snapshot = self.store.read().await?;
        let rentals = snapshot.find_rentals(filter).await?;
        Ok(rentals.into_iter().map(RentalDto::from).collect())
    }

    pub async fn get_rental(&self, id: i64) -> Result<RentalDto> {
        let snapshot = self.store.read().await?;
        let rental = snapshot
            .find_rental_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Rental with id {} not found", id)))?;
        Ok(RentalDto::from(rental))
    }

    /// Closes an open rental of `user` today and puts the car back in stock.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn return_rental(&self, user: &User, id: i64) -> Result<RentalDto> {
        let today = Utc::now().date_naive();

        let mut tx = self.store.begin().await?;
        let mut rental = tx
            .find_rental_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Rental with id {} not found", id)))?;

        if !rental.is_owned_by(user.id) {
            warn!(rental_id = id, owner_id = rental.user_id, "Return attempted by non-owner");
            return Err(DomainError::Forbidden(format!(
                "User with id {} does not belong to this Rental",
                user.id
            ))
            .into());
        }
        if rental.is_returned() {
            return Err(
                DomainError::Conflict(format!("Rental with id {} is already returned", id)).into(),
            );
        }

        rental.actual_return_date = Some(today);
        let mut car = tx.find_car_by_id(rental.car_id).await?.ok_or_else(|| {
            DomainError::NotFound(format!("Car with id {} not found", rental.car_id))
        })?;
        car.put_back_one()?;
        tx.update_car(car).await?;
        tx.update_rental(rental.clone()).await?;
        tx.commit().await?;
        drop(tx);
        info!(rental_id = id, car_id = rental.car_id, "Rental returned");

        if rental.triggers_overdue_notice(today) {
            self.notifications
                .notify_overdue_rentals(&format!(
                    "user with id {} returns the car with a delay, car id {}",
                    rental.user_id, rental.car_id
                ))
                .await;
        }

        Ok(RentalDto::from(rental))
    }
}
