use crate::domain::rental::{CreateRentalRequest, RentalFilter};
use crate::presentation::handlers::{ApiError, AppState};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{HttpResponse, web};
use tracing::{error, info, instrument};

#[instrument(skip(state, req), fields(car_id = req.car_id))]
pub async fn create_rental(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    req: web::Json<CreateRentalRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = state.acting_user(&auth).await?;
    let rental = state
        .rental_service
        .create_rental(&user, req.into_inner())
        .await
        .map_err(|e| {
            error!(user_id = user.id, error = %e, "Failed to create rental");
            ApiError::from(e)
        })?;
    info!(rental_id = rental.id, "Rental created");
    Ok(HttpResponse::Created().json(rental))
}

/// Customers only ever see their own rentals; managers may filter by any
/// user.
#[instrument(skip(state))]
pub async fn list_rentals(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<RentalFilter>,
) -> Result<HttpResponse, ApiError> {
    let user = state.acting_user(&auth).await?;
    let filter = if user.is_manager() {
        query.into_inner()
    } else {
        query.into_inner().scoped_to(user.id)
    };

    let rentals = state.rental_service.list_rentals(&filter).await?;
    Ok(HttpResponse::Ok().json(rentals))
}

#[instrument(skip(state, _auth), fields(rental_id = %*path))]
pub async fn get_rental(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let rental = state.rental_service.get_rental(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rental))
}

#[instrument(skip(state), fields(rental_id = %*path))]
pub async fn return_rental(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let rental_id = path.into_inner();
    let user = state.acting_user(&auth).await?;
    let rental = state
        .rental_service
        .return_rental(&user, rental_id)
        .await
        .map_err(|e| {
            error!(rental_id = rental_id, error = %e, "Failed to return rental");
            ApiError::from(e)
        })?;
    Ok(HttpResponse::Ok().json(rental))
}
