use crate::domain::error::DomainError;
use crate::domain::repository::{Store, UserReader, UserRepository};
use crate::domain::user::{NewUser, RegisterRequest, Role, UpdateProfileRequest, User, UserDto};
use crate::infrastructure::security::hash_password;
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

pub struct UserService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> UserService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> Result<UserDto> {
        req.validate()?;
        let user = self.create_user(req, Role::DEFAULT).await?;
        info!(user_id = user.id, "User registered successfully");
        Ok(UserDto::from(&user))
    }

    /// Creates a manager account unless the email is already taken.
    #[instrument(skip(self, password))]
    pub async fn seed_manager(&self, email: &str, password: &str) -> Result<()> {
        let exists = {
            let snapshot = self.store.read().await?;
            snapshot.find_user_by_email(email).await?.is_some()
        };
        if exists {
            info!("Manager account already present");
            return Ok(());
        }

        let req = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: String::new(),
            last_name: String::new(),
        };
        req.validate()?;
        let user = self.create_user(req, Role::Manager).await?;
        info!(user_id = user.id, "Manager account seeded");
        Ok(())
    }

    async fn create_user(&self, req: RegisterRequest, role: Role) -> Result<User> {
        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        let mut tx = self.store.begin().await?;
        if tx.find_user_by_email(&req.email).await?.is_some() {
            warn!(email = %req.email, "User already exists");
            return Err(DomainError::Registration(format!(
                "User with this email: {} already exist",
                req.email
            ))
            .into());
        }

        let user = tx
            .insert_user(NewUser {
                email: req.email,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
                role,
            })
            .await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Loads the acting user behind an authenticated request.
    pub async fn find_user(&self, id: i64) -> Result<User> {
        let snapshot = self.store.read().await?;
        snapshot
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User with id {} not found", id)).into())
    }

    #[instrument(skip(self))]
    pub async fn toggle_role(&self, id: i64) -> Result<UserDto> {
        let mut tx = self.store.begin().await?;
        let mut user = tx.find_user_by_id(id).await?.ok_or_else(|| {
            DomainError::NotFound("user with this id does not exist".to_string())
        })?;

        let previous = user.role;
        user.role = previous.toggled();
        tx.update_user(user.clone()).await?;
        tx.commit().await?;

        info!(user_id = id, from = ?previous, to = ?user.role, "Role toggled");
        Ok(UserDto::from(&user))
    }

    pub fn get_profile(&self, user: &User) -> UserDto {
        UserDto::from(user)
    }

    /// Changes only the name fields; the rest is taken from the stored row,
    /// not from `user`, which may be stale.
    #[instrument(skip(self, user, req), fields(user_id = user.id))]
    pub async fn update_profile(&self, user: &User, req: UpdateProfileRequest) -> Result<UserDto> {
        let mut tx = self.store.begin().await?;
        let mut current = tx.find_user_by_id(user.id).await?.ok_or_else(|| {
            DomainError::NotFound(format!("User with id {} not found", user.id))
        })?;
        current.first_name = req.first_name;
        current.last_name = req.last_name;
        tx.update_user(current.clone()).await?;
        tx.commit().await?;

        info!("Profile updated");
        Ok(UserDto::from(&current))
    }
}
