//! JSON body and query string extractors that reject malformed input with
//! the API's error body instead of axum's plain-text rejections.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use rental_core::error::AppError;

use crate::error::ApiError;

/// `Json<T>` whose rejections become `VALIDATION_ERROR` responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(json_rejection_error(rejection))),
        }
    }
}

/// `Query<T>` whose rejections become `VALIDATION_ERROR` responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(query_rejection_error(rejection))),
        }
    }
}

fn json_rejection_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(err) => deserialize_error(&err.body_text()),
        JsonRejection::JsonSyntaxError(_) => AppError::validation("Request body is not valid JSON."),
        JsonRejection::MissingJsonContentType(_) => {
            AppError::validation("Expected a request body with content type application/json.")
        }
        other => AppError::validation(other.body_text()),
    }
}

fn query_rejection_error(rejection: QueryRejection) -> AppError {
    match rejection {
        QueryRejection::FailedToDeserializeQueryString(err) => deserialize_error(&err.body_text()),
        other => AppError::validation(other.body_text()),
    }
}

/// Builds an error from a deserializer rejection text of the form
/// `<context>: [<path>: ]<reason>`, naming the field when the path is known.
fn deserialize_error(text: &str) -> AppError {
    let detail = text.split_once(": ").map_or(text, |(_, rest)| rest);
    let detail = strip_position(detail);

    if let Some((path, reason)) = detail.split_once(": ").filter(|(path, _)| is_field_path(path)) {
        return AppError::invalid_field(path, format!("Invalid value for {path}: {reason}."));
    }

    for marker in ["missing field `", "unknown field `"] {
        if let Some(field) = detail
            .split_once(marker)
            .and_then(|(_, rest)| rest.split_once('`'))
            .map(|(field, _)| field)
        {
            return AppError::invalid_field(field, format!("{}.", capitalize(detail)));
        }
    }

    AppError::validation(format!("{}.", capitalize(detail)))
}

/// Drops serde_json's trailing ` at line N column M`.
fn strip_position(detail: &str) -> &str {
    match detail.rfind(" at line ") {
        Some(idx) if detail[idx + 9..].starts_with(|c: char| c.is_ascii_digit()) => &detail[..idx],
        _ => detail,
    }
}

fn is_field_path(path: &str) -> bool {
    !path.is_empty()
        && path != "."
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
