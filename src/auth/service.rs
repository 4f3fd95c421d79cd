use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::dto::{AuthResponse, LoginRequest, ProfileUser, RegisterRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{NewUser, StoreError, UserStore};
use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn store_err(e: StoreError) -> ApiError {
    match e {
        StoreError::Duplicate => ApiError::DuplicateUser,
        StoreError::Unavailable(_) => ApiError::TransientStore,
        StoreError::Other(e) => ApiError::Internal(e),
    }
}

/// Orchestrates registration, login and profile lookup over an injected
/// credential store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Creates a user and a first session token. The email is stored exactly
    /// as given; uniqueness is case-sensitive.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, ApiError> {
        let email = req.email.unwrap_or_default();
        let password = req.password.unwrap_or_default();

        if email.is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Email and password are required".into(),
            ));
        }
        if !is_valid_email(&email) {
            warn!(email = %email, "register with malformed email");
            return Err(ApiError::Validation("Invalid email".into()));
        }

        // Pre-check keeps the common case friendly; a racing second insert is
        // settled by the store's unique constraint below.
        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(store_err)?
            .is_some()
        {
            warn!(email = %email, "email already registered");
            return Err(ApiError::DuplicateUser);
        }

        let password_hash = hash_password(&password).map_err(ApiError::Internal)?;
        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                full_name: req.full_name,
            })
            .await
            .map_err(store_err)?;

        let token = self.keys.sign(user.id).map_err(ApiError::Internal)?;
        info!(user_id = %user.id, "user registered");
        Ok(AuthResponse {
            success: true,
            token,
            user: user.into(),
        })
    }

    /// Issues a fresh token on success. Unknown email and wrong password are
    /// deliberately indistinguishable to the caller.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, ApiError> {
        let email = req.email.unwrap_or_default();
        let password = req.password.unwrap_or_default();

        let user = match self.users.find_by_email(&email).await.map_err(store_err)? {
            Some(u) => u,
            None => {
                warn!("login with unknown email");
                return Err(ApiError::InvalidCredentials);
            }
        };

        let ok = verify_password(&password, &user.password_hash).map_err(ApiError::Internal)?;
        if !ok {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.keys.sign(user.id).map_err(ApiError::Internal)?;
        info!(user_id = %user.id, "user logged in");
        Ok(AuthResponse {
            success: true,
            token,
            user: user.into(),
        })
    }

    /// Read-only lookup for an already-authenticated user id.
    pub async fn profile(&self, user_id: Uuid) -> Result<ProfileUser, ApiError> {
        match self.users.find_by_id(user_id).await.map_err(store_err)? {
            Some(u) => Ok(u.into()),
            None => Err(ApiError::NotFound),
        }
    }
}
