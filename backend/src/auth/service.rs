//! Core business logic for the authentication system.

use crate::auth::models::{LoginRequest, LoginResponse};
use crate::database::models::{RegisterUser, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::services::user_service::UserService;
use crate::utils::jwt::{Claims, JwtUtils};
use sqlx::SqlitePool;
use validator::Validate;

/// Authentication service for sign up, login and identity lookup
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    jwt_utils: &'a JwtUtils,
    user_service: UserService<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, jwt_utils: &'a JwtUtils, bcrypt_cost: u32) -> Self {
        AuthService {
            pool,
            jwt_utils,
            user_service: UserService::new(pool, bcrypt_cost),
        }
    }

    /// Creates an account with the `user` role.
    pub async fn register(&self, input: RegisterUser) -> ServiceResult<User> {
        self.user_service.register(input).await
    }

    /// Authenticate user and issue a bearer token
    pub async fn login(&self, login_request: LoginRequest) -> ServiceResult<LoginResponse> {
        login_request.validate()?;

        let user = self
            .user_service
            .authenticate(&login_request.email, &login_request.password)
            .await?;

        let token = self.jwt_utils.generate_token(&user)?;
        tracing::info!("User {} logged in", user.id);

        Ok(LoginResponse {
            token,
            expires_in: self.jwt_utils.expires_in(),
            user,
        })
    }

    /// Resolves the token's subject to a current user record.
    ///
    /// A valid token whose user has since been deleted is treated as
    /// unauthenticated.
    pub async fn me(&self, claims: &Claims) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        repo.get_user_by_id(claims.user_id())
            .await?
            .ok_or_else(|| {
                ServiceError::unauthorized(format!(
                    "Token subject {} no longer exists",
                    claims.user_id()
                ))
            })
    }
}
