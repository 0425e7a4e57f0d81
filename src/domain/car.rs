use crate::domain::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarType {
    Sedan,
    Suv,
    Hatchback,
    Universal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: i64,
    pub model: String,
    pub brand: String,
    #[serde(rename = "type")]
    pub car_type: CarType,
    pub inventory: u32,
    pub daily_fee: Decimal,
}

impl Car {
    /// Takes one unit out of stock. Refuses at zero so inventory never goes
    /// negative.
    pub fn take_one(&mut self) -> Result<(), DomainError> {
        self.inventory = self.inventory.checked_sub(1).ok_or_else(|| {
            DomainError::Conflict(format!("Car with id {} is out of stock", self.id))
        })?;
        Ok(())
    }

    pub fn put_back_one(&mut self) -> Result<(), DomainError> {
        self.inventory = self.inventory.checked_add(1).ok_or_else(|| {
            DomainError::Internal(format!("Inventory overflow for car with id {}", self.id))
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewCar {
    pub model: String,
    pub brand: String,
    pub car_type: CarType,
    pub inventory: u32,
    pub daily_fee: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCarRequest {
    pub model: String,
    pub brand: String,
    #[serde(rename = "type")]
    pub car_type: CarType,
    pub inventory: u32,
    pub daily_fee: Decimal,
}

impl CreateCarRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.model.trim().is_empty() || self.brand.trim().is_empty() {
            return Err(DomainError::Validation(
                "Model and brand must not be empty".to_string(),
            ));
        }
        if self.daily_fee <= Decimal::ZERO {
            return Err(DomainError::Validation(
                "Daily fee must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<CreateCarRequest> for NewCar {
    fn from(req: CreateCarRequest) -> Self {
        Self {
            model: req.model,
            brand: req.brand,
            car_type: req.car_type,
            inventory: req.inventory,
            daily_fee: req.daily_fee,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateInventoryRequest {
    pub inventory: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(inventory: u32) -> Car {
        Car {
            id: 3,
            model: "Model 3".to_string(),
            brand: "Tesla".to_string(),
            car_type: CarType::Sedan,
            inventory,
            daily_fee: Decimal::new(4999, 2),
        }
    }

    #[test]
    fn test_take_one_decrements_inventory() {
        let mut car = car(5);
        car.take_one().unwrap();
        assert_eq!(car.inventory, 4);
    }

    #[test]
    fn test_take_one_at_zero_is_conflict() {
        let mut car = car(0);
        let err = car.take_one().unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(car.inventory, 0);
    }

    #[test]
    fn test_put_back_one_increments_inventory() {
        let mut car = car(0);
        car.put_back_one().unwrap();
        assert_eq!(car.inventory, 1);
    }

    #[test]
    fn test_create_car_request_rejects_non_positive_fee() {
        let req = CreateCarRequest {
            model: "Golf".to_string(),
            brand: "VW".to_string(),
            car_type: CarType::Hatchback,
            inventory: 1,
            daily_fee: Decimal::ZERO,
        };
        assert!(matches!(req.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_car_type_uses_type_key_on_the_wire() {
        let json = serde_json::to_value(car(1)).unwrap();
        assert_eq!(json["type"], "SEDAN");
        assert_eq!(json["dailyFee"], "49.99");
    }
}
