//! Request extractors that reject with `AppError`
//!
//! `ValidatedJson` and `ValidatedQuery` deserialize like axum's `Json` and
//! `Query`, then run the payload's `Validate` rules. A payload that does not
//! deserialize becomes a `Validation` error instead of axum's plain-text
//! rejection.

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::utils::errors::{field_validation_error, AppError};

/// JSON body, deserialized and validated
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string, deserialized and validated
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        rejection_error("body", "invalid_body", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        rejection_error("query", "invalid_query", rejection.body_text())
    }
}

/// The offending field, when the rejection names one, lands in `params.field`
fn rejection_error(part: &'static str, code: &'static str, text: String) -> AppError {
    let mut error = ValidationError::new(code);
    if let Some(field) = rejected_field(&text) {
        error.add_param("field".into(), &field);
    }
    error.message = Some(text.into());

    field_validation_error(part, error)
}

/// Field name from a serde message such as ``missing field `from` `` or
/// `email: invalid type: integer, expected a string`.
fn rejected_field(text: &str) -> Option<String> {
    if let Some((_, rest)) = text.split_once("missing field `") {
        return rest.split('`').next().map(str::to_string);
    }

    // strip axum's "Failed to deserialize ...: " prefix
    let (_, detail) = text.split_once(": ")?;
    let (path, _) = detail.split_once(": ")?;
    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));

    is_path.then(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_field_from_missing_field() {
        let text = "Failed to deserialize the JSON body into the target type: \
                    missing field `password` at line 1 column 19";
        assert_eq!(rejected_field(text).as_deref(), Some("password"));

        let text = "Failed to deserialize query string: missing field `from`";
        assert_eq!(rejected_field(text).as_deref(), Some("from"));
    }

    #[test]
    fn test_rejected_field_from_path_prefix() {
        let text = "Failed to deserialize the JSON body into the target type: \
                    email: invalid type: integer `5`, expected a string at line 1 column 10";
        assert_eq!(rejected_field(text).as_deref(), Some("email"));
    }

    #[test]
    fn test_rejected_field_unknown() {
        assert_eq!(
            rejected_field("Failed to deserialize query string: invalid digit found in string"),
            None
        );
        assert_eq!(rejected_field("Expected request with `Content-Type: application/json`"), None);
    }

    #[test]
    fn test_rejection_is_a_validation_error() {
        let err = rejection_error(
            "query",
            "invalid_query",
            "Failed to deserialize query string: missing field `to`".to_string(),
        );

        match err {
            AppError::Validation(errors) => {
                let field_errors = errors.field_errors();
                let query = &field_errors["query"][0];
                assert_eq!(query.code, "invalid_query");
                assert_eq!(query.params["field"], "to");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
