use crate::domain::error::DomainError;
use crate::domain::repository::{Store, UserReader};
use crate::domain::user::LoginRequest;
use crate::infrastructure::security::{generate_token, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, instrument, trace, warn};

pub struct AuthService<S: Store> {
    store: Arc<S>,
    jwt_secret: String,
}

impl<S: Store> AuthService<S> {
    pub fn new(store: Arc<S>, jwt_secret: String) -> Self {
        Self { store, jwt_secret }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<String> {
        trace!("Starting login");

        let user = {
            let snapshot = self.store.read().await?;
            snapshot.find_user_by_email(&req.email).await?
        }
        .ok_or_else(|| {
            warn!(email = %req.email, "User not found during login");
            DomainError::Unauthorized("Invalid email or password".to_string())
        })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;

        if !is_valid {
            warn!(user_id = user.id, "Invalid password during login");
            return Err(DomainError::Unauthorized("Invalid email or password".to_string()).into());
        }

        let token = generate_token(user.id, &self.jwt_secret).map_err(|e| {
            error!(error = %e, "Failed to generate token");
            DomainError::Internal(format!("Failed to generate token: {}", e))
        })?;

        info!(user_id = user.id, "Login successful");
        Ok(token)
    }
}
