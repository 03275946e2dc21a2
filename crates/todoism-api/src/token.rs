//! Stateless bearer tokens.
//!
//! A token is an HS256 JWT over `{id, iat, exp}`. Checking one needs only the
//! secret and a clock, so no token is ever stored server side.

use anyhow::Context;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use todoism_db::UserRepository;
use todoism_db::models::UserRow;
use todoism_types::api::Claims;

use crate::config::Config;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed or its signature does not match")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token refers to a user that no longer exists")]
    UnknownUser,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.secret_key, config.token_ttl)
    }

    pub fn ttl(&self) -> i64 {
        self.ttl
    }

    pub fn issue(&self, user_id: i64) -> anyhow::Result<IssuedToken> {
        self.issue_at(user_id, chrono::Utc::now().timestamp())
    }

    /// Issues a token as if the current unix time were `now`.
    pub fn issue_at(&self, user_id: i64, now: i64) -> anyhow::Result<IssuedToken> {
        let claims = Claims {
            id: user_id,
            iat: now,
            exp: now + self.ttl,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("Failed to sign token")?;

        Ok(IssuedToken {
            token,
            expires_in: self.ttl,
        })
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, chrono::Utc::now().timestamp())
    }

    /// Checks signature and expiry against the unix time `now`.
    /// A token is dead from `exp` onwards; there is no leeway.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Malformed)?;

        if now >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }

    /// Validates `token` and loads the user it names.
    pub fn resolve<R>(&self, token: &str, repo: &R) -> Result<UserRow, ApiError>
    where
        R: UserRepository + ?Sized,
    {
        let claims = self.validate(token)?;
        repo.find_user_by_id(claims.id)?
            .ok_or_else(|| TokenError::UnknownUser.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    struct OneUser(i64);

    impl UserRepository for OneUser {
        fn find_user_by_id(&self, id: i64) -> anyhow::Result<Option<UserRow>> {
            Ok((id == self.0).then(|| UserRow {
                id,
                username: "grey".into(),
                locale: None,
                password_hash: String::new(),
            }))
        }
    }

    fn service() -> TokenService {
        TokenService::new("test-secret", 3600)
    }

    #[test]
    fn issued_token_validates_to_same_user() {
        let tokens = service();
        let issued = tokens.issue_at(42, NOW).unwrap();
        assert_eq!(issued.expires_in, 3600);

        let claims = tokens.validate_at(&issued.token, NOW).unwrap();
        assert_eq!(claims, Claims { id: 42, iat: NOW, exp: NOW + 3600 });
    }

    #[test]
    fn token_expires_after_ttl() {
        let tokens = service();
        let issued = tokens.issue_at(42, NOW).unwrap();

        assert!(tokens.validate_at(&issued.token, NOW + 3599).is_ok());
        assert_eq!(tokens.validate_at(&issued.token, NOW + 3600), Err(TokenError::Expired));
        assert_eq!(tokens.validate_at(&issued.token, NOW + 3601), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let tokens = service();
        let issued = tokens.issue_at(42, NOW).unwrap();
        let sig_start = issued.token.rfind('.').unwrap() + 1;

        for pos in sig_start..issued.token.len() {
            let mut bytes = issued.token.clone().into_bytes();
            bytes[pos] = if bytes[pos] == b'A' { b'B' } else { b'A' };
            let forged = String::from_utf8(bytes).unwrap();

            assert_eq!(
                tokens.validate_at(&forged, NOW),
                Err(TokenError::Malformed),
                "byte {} flipped",
                pos
            );
        }
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issued = TokenService::new("other-secret", 3600).issue_at(42, NOW).unwrap();
        assert_eq!(service().validate_at(&issued.token, NOW), Err(TokenError::Malformed));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(service().validate_at("not.a.token", NOW), Err(TokenError::Malformed));
        assert_eq!(service().validate_at("", NOW), Err(TokenError::Malformed));
    }

    #[test]
    fn resolve_needs_an_existing_user() {
        let tokens = service();

        let known = tokens.issue(7).unwrap();
        assert_eq!(tokens.resolve(&known.token, &OneUser(7)).unwrap().id, 7);

        let orphan = tokens.issue(8).unwrap();
        assert!(matches!(
            tokens.resolve(&orphan.token, &OneUser(7)),
            Err(ApiError::InvalidToken)
        ));
    }
}
