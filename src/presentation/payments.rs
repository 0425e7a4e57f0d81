use crate::domain::payment::{CreatePaymentRequest, PaymentListQuery, SessionQuery};
use crate::presentation::handlers::{ApiError, AppState, require_manager};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{HttpResponse, web};
use tracing::{info, instrument};

#[instrument(skip(state, req), fields(rental_id = req.rental_id))]
pub async fn create_payment(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    req: web::Json<CreatePaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = state.acting_user(&auth).await?;
    let payment = state
        .payment_service
        .create_payment(&user, req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(payment))
}

#[instrument(skip(state))]
pub async fn list_payments(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<PaymentListQuery>,
) -> Result<HttpResponse, ApiError> {
    let user = state.acting_user(&auth).await?;
    let user_id = if user.is_manager() {
        query.user_id
    } else {
        Some(user.id)
    };

    let payments = state.payment_service.list_payments(user_id).await?;
    Ok(HttpResponse::Ok().json(payments))
}

#[instrument(skip(state))]
pub async fn payment_success(
    state: web::Data<AppState>,
    query: web::Query<SessionQuery>,
) -> Result<HttpResponse, ApiError> {
    let payment = state
        .payment_service
        .complete_payment(&query.session_id)
        .await?;
    info!(payment_id = payment.id, "Checkout completed");
    Ok(HttpResponse::Ok().json(payment))
}

#[instrument(skip(state))]
pub async fn payment_cancel(
    state: web::Data<AppState>,
    query: web::Query<SessionQuery>,
) -> Result<HttpResponse, ApiError> {
    let payment = state
        .payment_service
        .cancel_payment(&query.session_id)
        .await?;
    info!(payment_id = payment.id, "Checkout canceled");
    Ok(HttpResponse::Ok().json(payment))
}

#[instrument(skip(state), fields(payment_id = %*path))]
pub async fn delete_payment(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user = state.acting_user(&auth).await?;
    require_manager(&user)?;

    state.payment_service.delete_payment(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
