use std::str::FromStr;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use consultdesk_core::{DomainError, DomainResult};

use crate::app::errors;

/// Render a directory result: `status` + JSON body, or the mapped error.
pub fn respond<T: Serialize>(status: StatusCode, result: DomainResult<T>) -> axum::response::Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Parse a path or body identifier, answering 400 on failure.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(errors::domain_error_to_response)
}
