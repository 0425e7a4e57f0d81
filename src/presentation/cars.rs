use crate::domain::car::{CreateCarRequest, UpdateInventoryRequest};
use crate::presentation::handlers::{ApiError, AppState, require_manager};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{HttpResponse, web};
use tracing::instrument;

#[instrument(skip(state, req))]
pub async fn add_car(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    req: web::Json<CreateCarRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = state.acting_user(&auth).await?;
    require_manager(&user)?;

    let car = state.car_service.add_car(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(car))
}

pub async fn list_cars(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let cars = state.car_service.list_cars().await?;
    Ok(HttpResponse::Ok().json(cars))
}

pub async fn get_car(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let car = state.car_service.get_car(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(car))
}

#[instrument(skip(state, req), fields(car_id = %*path))]
pub async fn update_inventory(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<UpdateInventoryRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = state.acting_user(&auth).await?;
    require_manager(&user)?;

    let car = state
        .car_service
        .update_inventory(path.into_inner(), req.inventory)
        .await?;
    Ok(HttpResponse::Ok().json(car))
}
