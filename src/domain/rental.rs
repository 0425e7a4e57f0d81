use crate::domain::error::DomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rental {
    pub id: i64,
    pub car_id: i64,
    pub user_id: i64,
    pub rental_date: NaiveDate,
    pub return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
}

impl Rental {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    pub fn is_returned(&self) -> bool {
        self.actual_return_date.is_some()
    }

    /// Whether returning on `today` sends the overdue notice.
    ///
    /// This fires while the expected return date is still ahead of `today`.
    /// The comparison is kept as is; DESIGN.md records the open question.
    pub fn triggers_overdue_notice(&self, today: NaiveDate) -> bool {
        self.return_date > today
    }

    /// Days the car came back after the expected return date. Zero while the
    /// rental is open or was returned on time.
    pub fn overdue_days(&self) -> i64 {
        self.actual_return_date
            .map(|actual| (actual - self.return_date).num_days().max(0))
            .unwrap_or(0)
    }

    /// Billable days of the booked window, never less than one.
    pub fn booked_days(&self) -> i64 {
        (self.return_date - self.rental_date).num_days().max(1)
    }
}

#[derive(Debug, Clone)]
pub struct NewRental {
    pub car_id: i64,
    pub user_id: i64,
    pub rental_date: NaiveDate,
    pub return_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRentalRequest {
    pub car_id: i64,
    pub rental_date: NaiveDate,
    pub return_date: NaiveDate,
}

impl CreateRentalRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.return_date < self.rental_date {
            return Err(DomainError::Validation(format!(
                "Return date {} is before rental date {}",
                self.return_date, self.rental_date
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalDto {
    pub id: i64,
    pub car_id: i64,
    pub user_id: i64,
    pub rental_date: NaiveDate,
    pub return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
}

impl From<Rental> for RentalDto {
    fn from(rental: Rental) -> Self {
        Self {
            id: rental.id,
            car_id: rental.car_id,
            user_id: rental.user_id,
            rental_date: rental.rental_date,
            return_date: rental.return_date,
            actual_return_date: rental.actual_return_date,
        }
    }
}

/// Search parameters for rentals. Every supplied field narrows the result;
/// absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalFilter {
    pub user_id: Option<i64>,
    pub is_active: Option<bool>,
}

impl RentalFilter {
    pub fn matches(&self, rental: &Rental) -> bool {
        let user_matches = self.user_id.is_none_or(|id| rental.user_id == id);
        let activity_matches = self
            .is_active
            .is_none_or(|active| rental.is_returned() != active);
        user_matches && activity_matches
    }

    /// Pins the filter to a single user, overriding any requested user id.
    pub fn scoped_to(self, user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..self
        }
    }
}
