use crate::error::{AppError, AppResult};
use crate::models::AuthUser;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub username: String,
    pub is_superuser: bool,
    pub groups: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access" or "refresh"
}

impl Claims {
    pub fn to_auth_user(&self) -> AppResult<AuthUser> {
        let id = self
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;
        Ok(AuthUser {
            id,
            username: self.username.clone(),
            is_superuser: self.is_superuser,
            groups: self.groups.clone(),
        })
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    refresh_token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_expires_in: i64, refresh_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
            refresh_token_expires_in: refresh_expires_in,
        }
    }

    fn generate_token(&self, user: &AuthUser, token_type: &str, expires_in: i64) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            is_superuser: user.is_superuser,
            groups: user.groups.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn generate_access_token(&self, user: &AuthUser) -> AppResult<String> {
        self.generate_token(user, "access", self.access_token_expires_in)
    }

    pub fn generate_refresh_token(&self, user: &AuthUser) -> AppResult<String> {
        self.generate_token(user, "refresh", self.refresh_token_expires_in)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;
        if claims.token_type != "access" {
            return Err(AppError::AuthError("Invalid access token type".to_string()));
        }
        Ok(claims)
    }

    pub fn verify_refresh_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;
        if claims.token_type != "refresh" {
            return Err(AppError::AuthError(
                "Invalid refresh token type".to_string(),
            ));
        }
        Ok(claims)
    }

    pub fn get_access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn sample_user() -> AuthUser {
        AuthUser {
            id: 42,
            username: "alice".to_string(),
            is_superuser: false,
            groups: vec!["Manager".to_string()],
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let svc = JwtService::new("test-secret", 3600, 86400);
        let token = svc.generate_access_token(&sample_user()).unwrap();
        let claims = svc.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.groups, vec!["Manager".to_string()]);

        let user = claims.to_auth_user().unwrap();
        assert_eq!(user.id, 42);
        assert!(user.has_role(Role::Staff));
        assert!(!user.has_role(Role::Admin));
    }

    #[test]
    fn test_malformed_subject_rejected() {
        let claims = Claims {
            sub: "not-a-number".to_string(),
            username: "alice".to_string(),
            is_superuser: false,
            groups: vec![],
            exp: 0,
            iat: 0,
            token_type: "access".to_string(),
        };
        assert!(matches!(
            claims.to_auth_user(),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let svc = JwtService::new("test-secret", 3600, 86400);
        let refresh = svc.generate_refresh_token(&sample_user()).unwrap();
        assert!(svc.verify_access_token(&refresh).is_err());
        assert!(svc.verify_refresh_token(&refresh).is_ok());
    }
}
