use crate::domain::car::Car;
use crate::domain::error::DomainError;
use crate::domain::rental::Rental;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fines are charged at one and a half times the daily fee.
pub const FINE_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    Payment,
    Fine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: i64,
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
    pub rental_id: i64,
    pub session_url: String,
    pub session_id: String,
    pub amount_to_pay: Decimal,
    pub deleted: bool,
}

impl Payment {
    /// Visibility predicate for every read path: soft-deleted rows are never
    /// returned.
    pub fn is_visible(&self) -> bool {
        !self.deleted
    }

    /// Pending and paid payments block creating another one of the same type.
    pub fn is_outstanding_or_settled(&self) -> bool {
        matches!(self.status, PaymentStatus::Pending | PaymentStatus::Paid)
    }
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
    pub rental_id: i64,
    pub session_url: String,
    pub session_id: String,
    pub amount_to_pay: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub rental_id: i64,
    pub payment_type: PaymentType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentListQuery {
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    pub id: i64,
    pub status: PaymentStatus,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub rental_id: i64,
    pub session_url: String,
    pub session_id: String,
    pub amount_to_pay: Decimal,
}

impl From<Payment> for PaymentDto {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            status: payment.status,
            payment_type: payment.payment_type,
            rental_id: payment.rental_id,
            session_url: payment.session_url,
            session_id: payment.session_id,
            amount_to_pay: payment.amount_to_pay,
        }
    }
}

/// Amount owed for `rental` of `car`, rounded to cents.
pub fn amount_to_pay(
    payment_type: PaymentType,
    rental: &Rental,
    car: &Car,
) -> Result<Decimal, DomainError> {
    let amount = match payment_type {
        PaymentType::Payment => Decimal::from(rental.booked_days()) * car.daily_fee,
        PaymentType::Fine => {
            let overdue = rental.overdue_days();
            if overdue == 0 {
                return Err(DomainError::Validation(format!(
                    "Rental with id {} was not returned late",
                    rental.id
                )));
            }
            Decimal::from(overdue) * car.daily_fee * FINE_MULTIPLIER
        }
    };
    Ok(amount.round_dp(2))
}
