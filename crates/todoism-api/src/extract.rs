//! Typed request parsing. Each body type deserializes and then validates
//! itself, and both failure kinds come back as `ApiError::Validation`.

use axum::{
    Form, Json,
    extract::{FromRequest, Request},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use todoism_types::api::{ItemBodyRequest, RegisterRequest, TokenRequest};

use crate::error::ApiError;

pub const MAX_USERNAME_CHARS: usize = 20;
pub const MIN_PASSWORD_CHARS: usize = 8;

pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// JSON body that passed `Validate`.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        value.validate().map_err(ApiError::Validation)?;
        Ok(Self(value))
    }
}

/// Url-encoded form body that passed `Validate`.
pub struct ValidatedForm<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        value.validate().map_err(ApiError::Validation)?;
        Ok(Self(value))
    }
}

impl Validate for TokenRequest {
    fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Name cannot be blank!".into());
        }
        if self.password.is_empty() {
            return Err("Password cannot be blank!".into());
        }
        Ok(())
    }
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        let chars = self.username.chars().count();
        if chars == 0 || chars > MAX_USERNAME_CHARS || self.username.trim() != self.username {
            return Err(format!(
                "Username must be 1 to {} characters without surrounding spaces.",
                MAX_USERNAME_CHARS
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_CHARS
            ));
        }
        Ok(())
    }
}

impl Validate for ItemBodyRequest {
    fn validate(&self) -> Result<(), String> {
        if self.body.trim().is_empty() {
            return Err("Item body cannot be blank!".into());
        }
        Ok(())
    }
}

/// `?page=` of collection endpoints. Kept as text so that a value that is
/// not a number falls back to page 1 instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(query(None).page(), 1);
        assert_eq!(query(Some("abc")).page(), 1);
        assert_eq!(query(Some("")).page(), 1);
    }

    #[test]
    fn explicit_page_is_kept_even_when_out_of_range() {
        assert_eq!(query(Some("3")).page(), 3);
        assert_eq!(query(Some("0")).page(), 0);
        assert_eq!(query(Some("-2")).page(), -2);
    }

    #[test]
    fn register_rules() {
        let req = |username: &str, password: &str| RegisterRequest {
            username: username.into(),
            password: password.into(),
            locale: None,
        };

        assert!(req("grey", "password1").validate().is_ok());
        assert!(req("", "password1").validate().is_err());
        assert!(req(" grey", "password1").validate().is_err());
        assert!(req(&"x".repeat(21), "password1").validate().is_err());
        assert!(req("grey", "short").validate().is_err());
    }

    #[test]
    fn blank_item_body_is_rejected() {
        let body = ItemBodyRequest { body: "  ".into() };
        assert!(body.validate().is_err());
    }
}
