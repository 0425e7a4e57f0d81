use crate::domain::user::UpdateProfileRequest;
use crate::presentation::handlers::{ApiError, AppState, require_manager};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{HttpResponse, web};
use tracing::{info, instrument};

#[instrument(skip(state))]
pub async fn get_profile(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let user = state.acting_user(&auth).await?;
    Ok(HttpResponse::Ok().json(state.user_service.get_profile(&user)))
}

#[instrument(skip(state, req))]
pub async fn update_profile(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = state.acting_user(&auth).await?;
    let updated = state
        .user_service
        .update_profile(&user, req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[instrument(skip(state), fields(target_user_id = %*path))]
pub async fn toggle_role(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let manager = state.acting_user(&auth).await?;
    require_manager(&manager)?;

    let user = state.user_service.toggle_role(path.into_inner()).await?;
    info!(user_id = user.id, role = ?user.role, "Role updated by manager");
    Ok(HttpResponse::Ok().json(user))
}
