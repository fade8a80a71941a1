//! User business logic service.
//!
//! Handles user creation, profile updates and credential checks. Passwords
//! are hashed with bcrypt on the blocking thread pool.

use crate::api::common::{Page, Pagination};
use crate::database::models::{
    CreateUserRequest, NewUser, RegisterUser, Role, UpdateUserRequest, User, UserChanges,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::utils::jwt::Claims;
use crate::utils::normalize_email;
use bcrypt::{hash, verify};
use sqlx::SqlitePool;
use validator::Validate;

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
    /// bcrypt work factor for new password hashes
    bcrypt_cost: u32,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    /// * `bcrypt_cost` - Work factor used when hashing passwords
    pub fn new(pool: &'a SqlitePool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    /// Self-service sign up. The account always gets the `user` role.
    pub async fn register(&self, input: RegisterUser) -> ServiceResult<User> {
        input.validate()?;

        self.insert_user(
            input.first_name,
            input.last_name,
            &input.email,
            &input.password,
            Role::User,
        )
        .await
    }

    /// Creates a user on behalf of an administrator.
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - Validation failures
    /// - An email already in use (compared case-insensitively)
    pub async fn create_user(&self, input: CreateUserRequest) -> ServiceResult<User> {
        input.validate()?;

        self.insert_user(
            input.first_name,
            input.last_name,
            &input.email,
            &input.password,
            input.role.unwrap_or(Role::User),
        )
        .await
    }

    async fn insert_user(
        &self,
        first_name: String,
        last_name: String,
        email: &str,
        password: &str,
        role: Role,
    ) -> ServiceResult<User> {
        let email = normalize_email(email);
        let password_hash = self.hash_password(password).await?;

        let repo = UserRepository::new(self.pool);
        let user = repo
            .create_user(NewUser {
                first_name: first_name.trim().to_string(),
                last_name: last_name.trim().to_string(),
                email: email.clone(),
                password_hash,
                role,
            })
            .await
            .map_err(|e| ServiceError::from_write(e, "User", &email))?;

        tracing::info!("Created user {} ({})", user.id, user.role);
        Ok(user)
    }

    /// Checks an email/password pair and returns the matching user.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let email = normalize_email(email);

        let Some(user) = repo.get_user_by_email(&email).await? else {
            return Err(ServiceError::unauthorized(format!(
                "Login attempt for unknown email {}",
                email
            )));
        };

        if !Self::verify_password(password, &user.password_hash).await? {
            return Err(ServiceError::unauthorized(format!(
                "Wrong password for user {}",
                user.id
            )));
        }

        Ok(user)
    }

    pub async fn list_users(&self, pagination: Pagination) -> ServiceResult<Page<User>> {
        let repo = UserRepository::new(self.pool);
        let users = repo
            .list_users(pagination.limit(), pagination.offset())
            .await?;
        let total = repo.count_users().await?;

        Ok(Page::new(users, total as u64, pagination))
    }

    /// Retrieves a user by ID with existence verification.
    ///
    /// # Errors
    /// Returns `ServiceError::NotFound` if user doesn't exist
    pub async fn get_user_required(&self, id: i64) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        Ok(user)
    }

    /// Reads a user profile as `actor`: self or admin only.
    pub async fn get_user_as(&self, actor: &Claims, id: i64) -> ServiceResult<User> {
        if !actor.can_access_user(id) {
            return Err(ServiceError::permission_denied(
                "You may only access your own profile",
            ));
        }
        self.get_user_required(id).await
    }

    /// Updates a user profile as `actor`.
    ///
    /// Users may edit themselves; admins may edit anyone. Only admins may
    /// change a role.
    pub async fn update_user_as(
        &self,
        actor: &Claims,
        id: i64,
        input: UpdateUserRequest,
    ) -> ServiceResult<User> {
        if !actor.can_access_user(id) {
            return Err(ServiceError::permission_denied(
                "You may only update your own profile",
            ));
        }
        if input.role.is_some() && !actor.is_admin() {
            return Err(ServiceError::permission_denied(
                "Only administrators may change roles",
            ));
        }
        input.validate()?;

        let password_hash = match input.password.as_deref() {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };
        let email = input.email.as_deref().map(normalize_email);

        let changes = UserChanges {
            first_name: input.first_name.map(|s| s.trim().to_string()),
            last_name: input.last_name.map(|s| s.trim().to_string()),
            email: email.clone(),
            password_hash,
            role: input.role,
        };

        let repo = UserRepository::new(self.pool);
        if changes.is_empty() {
            return self.get_user_required(id).await;
        }

        let user = repo
            .update_user(id, changes)
            .await
            .map_err(|e| ServiceError::from_write(e, "User", email.unwrap_or_default()))?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        tracing::info!("Updated user {}", user.id);
        Ok(user)
    }

    pub async fn delete_user(&self, id: i64) -> ServiceResult<()> {
        let repo = UserRepository::new(self.pool);
        if !repo.delete_user(id).await? {
            return Err(ServiceError::not_found("User", id));
        }

        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    /// Function to hash a password before storing in database
    ///
    /// # Errors
    /// Returns `ServiceError` if hashing fails
    async fn hash_password(&self, password: &str) -> ServiceResult<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;

        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| ServiceError::internal_error(format!("Hashing task failed: {}", e)))?
            .map_err(|e| ServiceError::internal_error(format!("Password hashing failed: {}", e)))
    }

    /// Function to verify a password against the stored hash
    ///
    /// # Returns
    /// `true` if password matches hash, `false` otherwise
    async fn verify_password(password: &str, password_hash: &str) -> ServiceResult<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();

        tokio::task::spawn_blocking(move || verify(password, &password_hash))
            .await
            .map_err(|e| ServiceError::internal_error(format!("Verification task failed: {}", e)))?
            .map_err(|e| {
                ServiceError::internal_error(format!("Password verification failed: {}", e))
            })
    }
}
