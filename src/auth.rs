//! HS256 bearer tokens. The `sub` claim is the user id records are scoped by.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<String, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                ErrorKind::InvalidSignature => "Invalid signature",
                ErrorKind::InvalidAudience => "Invalid audience",
                _ => "Invalid token",
            };
            tracing::debug!("token rejected: {}", e);
            AppError::Unauthorized(reason.to_string())
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized("Token has no subject".to_string()));
        }
        Ok(data.claims.sub)
    }
}

/// Authenticated user id, taken from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;
        let header = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Malformed Authorization header".to_string()))?;
        let token = bearer_token(header)
            .ok_or_else(|| AppError::Unauthorized("Expected a Bearer token".to_string()))?;

        state.verifier.verify(token).map(AuthUser)
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret";

    fn token(sub: &str, exp_offset: i64, aud: Option<&str>, secret: &str) -> String {
        let exp = (chrono::Utc::now().timestamp() + exp_offset) as u64;
        let claims = Claims {
            sub: sub.to_string(),
            exp,
            aud: aud.map(str::to_string),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn verifier(audience: Option<&str>) -> TokenVerifier {
        TokenVerifier::new(&AuthConfig {
            jwt_secret: SECRET.to_string(),
            audience: audience.map(str::to_string),
        })
    }

    #[test]
    fn valid_token_yields_subject() {
        let user = verifier(None).verify(&token("user-1", 600, None, SECRET)).unwrap();
        assert_eq!(user, "user-1");
    }

    #[test]
    fn wrong_signature_is_rejected() {
        let result = verifier(None).verify(&token("user-1", 600, None, "other-secret"));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let result = verifier(None).verify(&token("user-1", -3600, None, SECRET));
        assert!(matches!(result, Err(AppError::Unauthorized(msg)) if msg == "Token expired"));
    }

    #[test]
    fn audience_is_checked_when_configured() {
        let verifier = verifier(Some("authenticated"));
        assert!(verifier.verify(&token("u", 600, Some("authenticated"), SECRET)).is_ok());
        assert!(verifier.verify(&token("u", 600, Some("anon"), SECRET)).is_err());
    }

    #[test]
    fn bearer_scheme_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
