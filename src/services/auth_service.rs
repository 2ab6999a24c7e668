use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::db::entities::user;
use crate::db::services;
use crate::web::error::AppError;
use crate::web::models::{Claims, RegisterRequest, TokenRequest, TokenResponse, UserResponse};

const MIN_PASSWORD_LEN: usize = 5;

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

pub async fn register_user(
    pool: &DatabaseConnection,
    req: RegisterRequest,
) -> Result<UserResponse, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidInput("email: enter a valid email address.".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "password: ensure this field has at least {MIN_PASSWORD_LEN} characters."
        )));
    }

    if services::get_user_by_email(pool, &email).await?.is_some() {
        return Err(AppError::Conflict("A user with this email already exists.".to_string()));
    }

    let password_hash = hash(&req.password, DEFAULT_COST)
        .map_err(|e| AppError::PasswordHashingError(e.to_string()))?;

    let user = services::create_user(pool, &email, req.name.trim(), &password_hash).await?;
    info!(user_id = user.id, "Registered new user.");
    Ok(user.into())
}

pub async fn issue_token(
    pool: &DatabaseConnection,
    req: TokenRequest,
    jwt_secret: &str,
    ttl_hours: i64,
) -> Result<TokenResponse, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput("email and password are required.".to_string()));
    }

    let user = services::get_user_by_email(pool, &email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid_password = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;
    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    create_jwt_for_user(&user, jwt_secret, ttl_hours)
}

pub fn create_jwt_for_user(
    user: &user::Model,
    jwt_secret: &str,
    ttl_hours: i64,
) -> Result<TokenResponse, AppError> {
    let expiration = (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize;

    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id,
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::TokenCreationError(e.to_string()))?;

    Ok(TokenResponse { token })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    fn sample_user() -> user::Model {
        user::Model {
            id: 7,
            email: "cook@example.com".to_string(),
            name: "Cook".to_string(),
            password_hash: "unused".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_jwt_round_trips_identity() {
        let token = create_jwt_for_user(&sample_user(), "secret", 1).unwrap().token;

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.user_id, 7);
        assert_eq!(data.claims.sub, "cook@example.com");
    }

    #[test]
    fn test_jwt_rejected_with_other_secret() {
        let token = create_jwt_for_user(&sample_user(), "secret", 1).unwrap().token;

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"another"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_jwt_rejected() {
        let token = create_jwt_for_user(&sample_user(), "secret", -2).unwrap().token;

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }
}
