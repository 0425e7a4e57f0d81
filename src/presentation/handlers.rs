use crate::application::auth_service::AuthService;
use crate::application::car_service::CarService;
use crate::application::notification_service::NotificationService;
use crate::application::payment_service::PaymentService;
use crate::application::rental_service::RentalService;
use crate::application::user_service::UserService;
use crate::data::memory::InMemoryStore;
use crate::domain::error::DomainError;
use crate::domain::user::User;
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpMessage, HttpResponse, ResponseError};
use chrono::Utc;
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub struct AppState {
    pub user_service: UserService<InMemoryStore>,
    pub auth_service: AuthService<InMemoryStore>,
    pub car_service: CarService<InMemoryStore>,
    pub rental_service: RentalService<InMemoryStore>,
    pub payment_service: PaymentService<InMemoryStore>,
}

impl AppState {
    pub fn new(
        store: Arc<InMemoryStore>,
        notifications: Arc<NotificationService>,
        jwt_secret: String,
        checkout_base_url: String,
    ) -> Self {
        Self {
            user_service: UserService::new(store.clone()),
            auth_service: AuthService::new(store.clone(), jwt_secret),
            car_service: CarService::new(store.clone()),
            rental_service: RentalService::new(store.clone(), notifications.clone()),
            payment_service: PaymentService::new(store, notifications, checkout_base_url),
        }
    }

    /// Resolves the bearer identity to a stored user. A token whose user is
    /// gone is treated as unauthenticated.
    pub async fn acting_user(&self, auth: &AuthenticatedUser) -> Result<User, ApiError> {
        self.user_service
            .find_user(auth.user_id)
            .await
            .map_err(|e| match ApiError::from(e) {
                ApiError::NotFound(_) => {
                    ApiError::Unauthorized("User not authenticated".to_string())
                }
                other => other,
            })
    }
}

pub fn require_manager(user: &User) -> Result<(), ApiError> {
    if user.is_manager() {
        Ok(())
    } else {
        warn!(user_id = user.id, "Manager role required");
        Err(ApiError::Forbidden("Manager role required".to_string()))
    }
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Registration error: {0}")]
    Registration(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::Registration(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Conflict(msg)
            | ApiError::Database(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Registration(_) | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        if status.is_server_error() {
            error!(error = %error_msg, status = %status, "Request failed");
        } else {
            warn!(error = %error_msg, status = %status, "Request rejected");
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: error_msg,
            details: serde_json::json!({ "message": self.message() }),
        })
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Registration(msg) => ApiError::Registration(msg),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            DomainError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(domain) => ApiError::from(domain),
            Err(other) => ApiError::Database(other.to_string()),
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move {
            user.ok_or_else(|| ApiError::Unauthorized("User not authenticated".to_string()))
        })
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
