use crate::modules::error::ApiError;
use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use chrono::{Datelike, Local};
use http::request::Parts;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const MIN_YEAR: i32 = 2000;

static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

pub fn current_year() -> i32 {
    Local::now().year()
}

fn validate_year(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }

    match value.parse::<i32>() {
        Ok(year) if (MIN_YEAR..=current_year()).contains(&year) => Ok(()),
        _ => Err(ValidationError::new("invalid year")),
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, PartialEq, Eq, Clone)]
pub struct UsernameParameter {
    #[validate(length(min = 1, max = 64), regex = "USERNAME_PATTERN")]
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, PartialEq, Eq, Clone, Default)]
pub struct YearParameter {
    #[validate(custom = "validate_year")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl YearParameter {
    /// The requested year, or the current one when none was given.
    pub fn resolve(&self) -> i32 {
        self.year
            .as_deref()
            .and_then(|year| year.trim().parse::<i32>().ok())
            .unwrap_or_else(current_year)
    }
}

pub struct ValidatedUsername(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ValidatedUsername
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<UsernameParameter>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::error!("Parsing error: {}", rejection);
                ApiError::Validation {
                    error: "Invalid username format",
                    message: rejection.to_string(),
                }
            })?;

        value.validate().map_err(|rejection| {
            tracing::error!("Validation error: {}", rejection);
            ApiError::Validation {
                error: "Invalid username format",
                message: format!("Validation error: [{}]", rejection).replace('\n', ", "),
            }
        })?;

        Ok(ValidatedUsername(value.username))
    }
}

pub struct ValidatedYear(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for ValidatedYear
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let value: YearParameter = serde_urlencoded::from_str(query).map_err(|rejection| {
            tracing::error!("Parsing error: {}", rejection);
            ApiError::Validation {
                error: "Invalid year format",
                message: format!("invalid format query string: [{}]", rejection),
            }
        })?;

        value.validate().map_err(|rejection| {
            tracing::error!("Validation error: {}", rejection);
            ApiError::Validation {
                error: "Invalid year format",
                message: format!(
                    "year must be an integer between {} and {}",
                    MIN_YEAR,
                    current_year()
                ),
            }
        })?;

        Ok(ValidatedYear(value.resolve()))
    }
}
