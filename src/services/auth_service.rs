use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use crate::dto::auth_dto::{LoginPayload, RegisterPayload};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::{NewUser, User, UserRole};
use crate::store::EntityStore;
use crate::utils::crypto::{hash_password, verify_password};

const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn EntityStore>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(store: Arc<dyn EntityStore>, jwt_secret: String) -> Self {
        Self { store, jwt_secret }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<(User, String)> {
        let password_hash = hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;

        let user = self
            .store
            .insert_user(NewUser {
                email: payload.email,
                password_hash,
                display_name: payload.name,
                role: payload.role.unwrap_or(UserRole::Recruiter),
                company: payload.company,
                position: payload.position,
            })
            .await?;

        let token = self.issue_token(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok((user, token))
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<(User, String)> {
        let user = self
            .store
            .user_by_email(&payload.email)
            .await?
            .ok_or_else(|| Error::Unauthorized("Invalid email or password".to_string()))?;

        let valid = verify_password(&payload.password, &user.password_hash)
            .map_err(|e| Error::Internal(format!("Failed to verify password: {}", e)))?;
        if !valid {
            return Err(Error::Unauthorized("Invalid email or password".to_string()));
        }
        if !user.is_active {
            return Err(Error::Unauthorized("Account is deactivated".to_string()));
        }

        self.store.record_login(user.id, Utc::now()).await?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Resolve the authenticated user behind a set of verified claims.
    pub async fn current_user(&self, claims: &Claims) -> Result<User> {
        let id: Uuid = claims
            .sub
            .parse()
            .map_err(|_| Error::Unauthorized("Invalid token subject".to_string()))?;
        let user = self
            .store
            .user_by_id(id)
            .await?
            .ok_or_else(|| Error::Unauthorized("Account no longer exists".to_string()))?;
        if !user.is_active {
            return Err(Error::Unauthorized("Account is deactivated".to_string()));
        }
        Ok(user)
    }

    fn issue_token(&self, user: &User) -> Result<String> {
        let exp = (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize;
        let claims = Claims {
            sub: user.id.to_string(),
            exp,
            role: Some(user.role.as_str().to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| Error::Internal(format!("Failed to issue token: {}", e)))
    }
}
