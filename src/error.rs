//! HTTP-facing error type.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::layout::PlaceError;
use crate::store::StoreError;
use crate::suggestion::ScoringError;

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidJson(#[from] JsonRejection),
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("no ingredient with id '{0}'")]
    ItemNotFound(String),
    #[error("an ingredient with id '{0}' already exists")]
    DuplicateItem(String),
    #[error("no placement with id '{0}'")]
    PlacementNotFound(String),
    #[error(transparent)]
    Place(#[from] PlaceError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // 400 for bad syntax, 415 for a missing content type, 422 for bad data
            ApiError::InvalidJson(rejection) => rejection.status(),
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Scoring(_) => StatusCode::BAD_REQUEST,
            ApiError::ItemNotFound(_) | ApiError::PlacementNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Place(PlaceError::PartitionNotFound) => StatusCode::NOT_FOUND,
            ApiError::Place(PlaceError::NoPartitionAtPoint) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Place(PlaceError::Rejected(_)) | ApiError::DuplicateItem(_) => {
                StatusCode::CONFLICT
            }
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, stable summary used as the `error` field.
    pub fn title(&self) -> &'static str {
        match self {
            ApiError::InvalidJson(_) => "Invalid JSON data",
            ApiError::Validation(_) => "Invalid input data",
            ApiError::ItemNotFound(_) => "Ingredient not found",
            ApiError::DuplicateItem(_) => "Duplicate ingredient",
            ApiError::PlacementNotFound(_) => "Placement not found",
            ApiError::Place(PlaceError::PartitionNotFound) => "Partition not found",
            ApiError::Place(PlaceError::NoPartitionAtPoint) => "No partition at drop point",
            ApiError::Place(PlaceError::Rejected(_)) => "Placement rejected",
            ApiError::Scoring(_) => "Unsupported criterion",
            ApiError::Store(_) => "Storage failure",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse::new(self.title(), self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::PlacementRejection;

    #[test]
    fn placement_errors_map_to_distinct_statuses() {
        let cases = [
            (PlaceError::PartitionNotFound, StatusCode::NOT_FOUND),
            (PlaceError::NoPartitionAtPoint, StatusCode::UNPROCESSABLE_ENTITY),
            (
                PlaceError::Rejected(PlacementRejection::Overlap),
                StatusCode::CONFLICT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn details_carry_the_underlying_message() {
        let err = ApiError::from(PlaceError::Rejected(PlacementRejection::OutOfBounds));
        assert_eq!(err.title(), "Placement rejected");
        assert_eq!(err.to_string(), "extends beyond partition bounds");

        let err = ApiError::Validation(vec!["name is required".into(), "cost must be a non-negative number".into()]);
        assert_eq!(
            err.to_string(),
            "name is required; cost must be a non-negative number"
        );

        let err = ApiError::from(ScoringError::UnsupportedCriterion("taste".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
