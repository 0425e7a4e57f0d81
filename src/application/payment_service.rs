use crate::application::notification_service::NotificationService;
use crate::domain::error::DomainError;
use crate::domain::payment::{
    CreatePaymentRequest, NewPayment, Payment, PaymentDto, PaymentStatus, amount_to_pay,
};
use crate::domain::rental::RentalFilter;
use crate::domain::repository::{
    CarReader, PaymentReader, PaymentRepository, RentalReader, Store,
};
use crate::domain::user::User;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub struct PaymentService<S: Store> {
    store: Arc<S>,
    notifications: Arc<NotificationService>,
    checkout_base_url: String,
}

impl<S: Store> PaymentService<S> {
    pub fn new(
        store: Arc<S>,
        notifications: Arc<NotificationService>,
        checkout_base_url: String,
    ) -> Self {
        Self {
            store,
            notifications,
            checkout_base_url: checkout_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Opens a pending checkout session for one of `user`'s rentals.
    #[instrument(skip(self, user, req), fields(user_id = user.id, rental_id = req.rental_id))]
    pub async fn create_payment(&self, user: &User, req: CreatePaymentRequest) -> Result<PaymentDto> {
        let mut tx = self.store.begin().await?;
        let rental = tx.find_rental_by_id(req.rental_id).await?.ok_or_else(|| {
            DomainError::NotFound(format!("Rental with id {} not found", req.rental_id))
        })?;
        if !rental.is_owned_by(user.id) {
            return Err(DomainError::Forbidden(format!(
                "User with id {} does not belong to this Rental",
                user.id
            ))
            .into());
        }

        let clash = tx
            .find_payments(Some(&[rental.id][..]))
            .await?
            .into_iter()
            .any(|p| p.payment_type == req.payment_type && p.is_outstanding_or_settled());
        if clash {
            return Err(DomainError::Conflict(format!(
                "Rental with id {} already has a {:?} payment",
                rental.id, req.payment_type
            ))
            .into());
        }

        let car = tx.find_car_by_id(rental.car_id).await?.ok_or_else(|| {
            DomainError::NotFound(format!("Car with id {} not found", rental.car_id))
        })?;
        let amount = amount_to_pay(req.payment_type, &rental, &car)?;

        let session_id = Uuid::new_v4().to_string();
        let payment = tx
            .insert_payment(NewPayment {
                status: PaymentStatus::Pending,
                payment_type: req.payment_type,
                rental_id: rental.id,
                session_url: format!("{}/{}", self.checkout_base_url, session_id),
                session_id,
                amount_to_pay: amount,
            })
            .await?;
        tx.commit().await?;

        info!(payment_id = payment.id, amount = %payment.amount_to_pay, "Payment created");
        Ok(PaymentDto::from(payment))
    }

    /// Payments of `user_id`'s rentals, or every payment when no user is given.
    pub async fn list_payments(&self, user_id: Option<i64>) -> Result<Vec<PaymentDto>> {
        let snapshot = self.store.read().await?;
        let payments = match user_id {
            Some(user_id) => {
                let filter = RentalFilter::default().scoped_to(user_id);
                let rental_ids: Vec<i64> = snapshot
                    .find_rentals(&filter)
                    .await?
                    .into_iter()
                    .map(|r| r.id)
                    .collect();
                snapshot.find_payments(Some(rental_ids.as_slice())).await?
            }
            None => snapshot.find_payments(None).await?,
        };
        Ok(payments.into_iter().map(PaymentDto::from).collect())
    }

    /// Marks the pending payment behind `session_id` as paid.
    ///
    /// The session id is also handed to the customer inside `sessionUrl`, so
    /// this must only be reachable from a callback the checkout provider has
    /// verified. The public `/api/payments/success` route stands in for that
    /// redirect.
    #[instrument(skip(self))]
    pub async fn complete_payment(&self, session_id: &str) -> Result<PaymentDto> {
        let payment = self
            .transition(session_id, PaymentStatus::Paid)
            .await?;

        self.notifications
            .notify_successful_payments(&format!(
                "payment with id {} for rental with id {} paid, amount {}",
                payment.id, payment.rental_id, payment.amount_to_pay
            ))
            .await;

        Ok(PaymentDto::from(payment))
    }

    #[instrument(skip(self))]
    pub async fn cancel_payment(&self, session_id: &str) -> Result<PaymentDto> {
        let payment = self
            .transition(session_id, PaymentStatus::Canceled)
            .await?;
        Ok(PaymentDto::from(payment))
    }

    async fn transition(&self, session_id: &str, status: PaymentStatus) -> Result<Payment> {
        let mut tx = self.store.begin().await?;
        let mut payment = tx
            .find_payment_by_session_id(session_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!("Payment with session {} not found", session_id))
            })?;

        if payment.status != PaymentStatus::Pending {
            warn!(payment_id = payment.id, status = ?payment.status, "Payment is not pending");
            return Err(DomainError::Conflict(format!(
                "Payment with id {} is {:?}",
                payment.id, payment.status
            ))
            .into());
        }

        payment.status = status;
        tx.update_payment(payment.clone()).await?;
        tx.commit().await?;
        info!(payment_id = payment.id, status = ?status, "Payment status changed");
        Ok(payment)
    }

    /// Soft delete: the row stays but no read returns it afterwards.
    #[instrument(skip(self))]
    pub async fn delete_payment(&self, id: i64) -> Result<()> {
        let mut tx = self.store.begin().await?;
        let mut payment = tx
            .find_payment_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Payment with id {} not found", id)))?;
        payment.deleted = true;
        tx.update_payment(payment).await?;
        tx.commit().await?;
        info!(payment_id = id, "Payment deleted");
        Ok(())
    }
}
