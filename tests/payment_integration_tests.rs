mod common;

use car_sharing_api::application::payment_service::PaymentService;
use car_sharing_api::domain::error::DomainError;
use car_sharing_api::domain::payment::{CreatePaymentRequest, PaymentStatus, PaymentType};
use car_sharing_api::domain::user::{Role, User};
use common::*;
use rust_decimal_macros::dec;

fn service(fx: &Fixture) -> PaymentService<car_sharing_api::data::memory::InMemoryStore> {
    PaymentService::new(
        fx.store.clone(),
        fx.notifications.clone(),
        format!("{}/", CHECKOUT_BASE_URL),
    )
}

fn request(rental_id: i64, payment_type: PaymentType) -> CreatePaymentRequest {
    CreatePaymentRequest {
        rental_id,
        payment_type,
    }
}

/// A customer holding one rental of a 20.50/day car from Jan 1 to Jan 10,
/// returned on `actual`.
async fn renter(fx: &Fixture, actual: Option<chrono::NaiveDate>) -> (User, i64) {
    let user = insert_user(&fx.store, "renter@example.com", Role::Customer).await;
    let car = insert_car(&fx.store, 3, dec!(20.50)).await;
    let rental = insert_rental(
        &fx.store,
        car.id,
        user.id,
        date(2024, 1, 1),
        date(2024, 1, 10),
        actual,
    )
    .await;
    (user, rental.id)
}

#[tokio::test]
async fn test_create_payment_opens_pending_session() {
    let fx = fixture();
    let (user, rental_id) = renter(&fx, None).await;

    let payment = service(&fx)
        .create_payment(&user, request(rental_id, PaymentType::Payment))
        .await
        .unwrap();

    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.payment_type, PaymentType::Payment);
    assert_eq!(payment.rental_id, rental_id);
    assert_eq!(payment.amount_to_pay, dec!(184.50));
    assert!(!payment.session_id.is_empty());
    assert_eq!(
        payment.session_url,
        format!("{}/{}", CHECKOUT_BASE_URL, payment.session_id)
    );
}

#[tokio::test]
async fn test_fine_is_charged_for_late_return() {
    let fx = fixture();
    let (user, rental_id) = renter(&fx, Some(date(2024, 1, 12))).await;

    let fine = service(&fx)
        .create_payment(&user, request(rental_id, PaymentType::Fine))
        .await
        .unwrap();

    assert_eq!(fine.payment_type, PaymentType::Fine);
    assert_eq!(fine.amount_to_pay, dec!(61.50));
}

#[tokio::test]
async fn test_fine_for_on_time_rental_is_rejected() {
    let fx = fixture();
    let (user, rental_id) = renter(&fx, Some(date(2024, 1, 9))).await;

    let err = service(&fx)
        .create_payment(&user, request(rental_id, PaymentType::Fine))
        .await
        .unwrap_err();

    assert!(matches!(domain_error(&err), DomainError::Validation(_)));
    assert!(service(&fx).list_payments(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_for_someone_elses_rental_is_forbidden() {
    let fx = fixture();
    let (_, rental_id) = renter(&fx, None).await;
    let stranger = insert_user(&fx.store, "stranger@example.com", Role::Customer).await;

    let err = service(&fx)
        .create_payment(&stranger, request(rental_id, PaymentType::Payment))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::Forbidden(_)));

    let err = service(&fx)
        .create_payment(&stranger, request(999, PaymentType::Payment))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_second_open_payment_of_same_type_conflicts() {
    let fx = fixture();
    let (user, rental_id) = renter(&fx, Some(date(2024, 1, 11))).await;
    let service = service(&fx);

    service
        .create_payment(&user, request(rental_id, PaymentType::Payment))
        .await
        .unwrap();
    let err = service
        .create_payment(&user, request(rental_id, PaymentType::Payment))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::Conflict(_)));

    // a fine is a different obligation
    service
        .create_payment(&user, request(rental_id, PaymentType::Fine))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_canceled_payment_can_be_reopened() {
    let fx = fixture();
    let (user, rental_id) = renter(&fx, None).await;
    let service = service(&fx);

    let first = service
        .create_payment(&user, request(rental_id, PaymentType::Payment))
        .await
        .unwrap();
    let canceled = service.cancel_payment(&first.session_id).await.unwrap();
    assert_eq!(canceled.status, PaymentStatus::Canceled);

    let second = service
        .create_payment(&user, request(rental_id, PaymentType::Payment))
        .await
        .unwrap();
    assert_ne!(second.session_id, first.session_id);
    assert!(fx.sender.messages().is_empty());
}

#[tokio::test]
async fn test_complete_payment_marks_paid_and_notifies_once() {
    let fx = fixture();
    let (user, rental_id) = renter(&fx, None).await;
    let service = service(&fx);

    let payment = service
        .create_payment(&user, request(rental_id, PaymentType::Payment))
        .await
        .unwrap();
    let paid = service.complete_payment(&payment.session_id).await.unwrap();
    assert_eq!(paid.status, PaymentStatus::Paid);

    let err = service.complete_payment(&payment.session_id).await.unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::Conflict(_)));
    let err = service.cancel_payment(&payment.session_id).await.unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::Conflict(_)));

    assert_eq!(
        fx.sender.messages(),
        vec![format!(
            "successful payments:\npayment with id {} for rental with id {} paid, amount 184.50",
            payment.id, rental_id
        )]
    );
}

#[tokio::test]
async fn test_success_callback_cannot_settle_a_canceled_session() {
    let fx = fixture();
    let (user, rental_id) = renter(&fx, None).await;
    let service = service(&fx);

    let payment = service
        .create_payment(&user, request(rental_id, PaymentType::Payment))
        .await
        .unwrap();
    service.cancel_payment(&payment.session_id).await.unwrap();

    let err = service.complete_payment(&payment.session_id).await.unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::Conflict(_)));
    let listed = service.list_payments(Some(user.id)).await.unwrap();
    assert_eq!(listed[0].status, PaymentStatus::Canceled);
    assert!(fx.sender.messages().is_empty());
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let fx = fixture();

    let err = service(&fx).complete_payment("no-such-session").await.unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_deleted_payment_disappears_from_every_read() {
    let fx = fixture();
    let (user, rental_id) = renter(&fx, None).await;
    let service = service(&fx);

    let payment = service
        .create_payment(&user, request(rental_id, PaymentType::Payment))
        .await
        .unwrap();
    service.delete_payment(payment.id).await.unwrap();

    assert!(service.list_payments(None).await.unwrap().is_empty());
    assert!(service.list_payments(Some(user.id)).await.unwrap().is_empty());
    let err = service.complete_payment(&payment.session_id).await.unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::NotFound(_)));
    let err = service.delete_payment(payment.id).await.unwrap_err();
    assert!(matches!(domain_error(&err), DomainError::NotFound(_)));

    // no longer blocks a fresh checkout
    service
        .create_payment(&user, request(rental_id, PaymentType::Payment))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_payments_scoped_to_user() {
    let fx = fixture();
    let (alice, alice_rental) = renter(&fx, None).await;
    let bob = insert_user(&fx.store, "bob@example.com", Role::Customer).await;
    let bob_rental = insert_rental(
        &fx.store,
        1,
        bob.id,
        date(2024, 2, 1),
        date(2024, 2, 2),
        None,
    )
    .await;
    let service = service(&fx);

    service
        .create_payment(&alice, request(alice_rental, PaymentType::Payment))
        .await
        .unwrap();
    let bobs = service
        .create_payment(&bob, request(bob_rental.id, PaymentType::Payment))
        .await
        .unwrap();
    assert_eq!(bobs.amount_to_pay, dec!(20.50));

    assert_eq!(service.list_payments(None).await.unwrap().len(), 2);
    assert_eq!(service.list_payments(Some(bob.id)).await.unwrap(), vec![bobs]);
    assert!(service.list_payments(Some(404)).await.unwrap().is_empty());
}
