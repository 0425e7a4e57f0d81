use crate::domain::car::{Car, CreateCarRequest, NewCar};
use crate::domain::error::DomainError;
use crate::domain::repository::{CarReader, CarRepository, Store};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct CarService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> CarService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, req), fields(model = %req.model, brand = %req.brand))]
    pub async fn add_car(&self, req: CreateCarRequest) -> Result<Car> {
        req.validate()?;
        let mut tx = self.store.begin().await?;
        let car = tx.insert_car(NewCar::from(req)).await?;
        tx.commit().await?;
        info!(car_id = car.id, inventory = car.inventory, "Car added");
        Ok(car)
    }

    pub async fn list_cars(&self) -> Result<Vec<Car>> {
        let snapshot = self.store.read().await?;
        snapshot.find_cars().await
    }

    pub async fn get_car(&self, id: i64) -> Result<Car> {
        let snapshot = self.store.read().await?;
        snapshot
            .find_car_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Car with id {} not found", id)).into())
    }

    #[instrument(skip(self))]
    pub async fn update_inventory(&self, id: i64, inventory: u32) -> Result<Car> {
        let mut tx = self.store.begin().await?;
        let mut car = tx
            .find_car_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Car with id {} not found", id)))?;
        car.inventory = inventory;
        tx.update_car(car.clone()).await?;
        tx.commit().await?;
        info!(car_id = id, inventory = inventory, "Inventory updated");
        Ok(car)
    }
}
