use std::collections::HashMap;

use axum::Json;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::WithRejection;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::SharedDispatcher;
use crate::dispatch::DispatchError;

/// The single webhook endpoint. Ko-fi posts a form-encoded body whose `data`
/// field carries the JSON payload; everything past extraction is the
/// dispatcher's pipeline.
pub async fn handler(
    State(dispatcher): State<SharedDispatcher>,
    WithRejection(Form(form), _): WithRejection<Form<HashMap<String, String>>, ApiError>,
) -> Result<StatusCode, ApiError> {
    dispatcher.dispatch(&form).await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Error)]
pub enum ApiError {
    // The `#[from]` attribute generates `From<FormRejection> for ApiError`
    // implementation. See `thiserror` docs for more information
    #[error(transparent)]
    FormExtractorRejection(#[from] FormRejection),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl IntoResponse for ApiError {
    /// Handler failures become a 500; every other failure collapses into
    /// one generic 400 so callers cannot probe which check rejected them.
    /// The real cause goes to the log only.
    fn into_response(self) -> Response {
        match self {
            ApiError::Dispatch(DispatchError::Handler(report)) => {
                error!(error = ?report, "webhook handler failed");
                let payload = json!({ "detail": "Internal server error" });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
            }
            other => {
                warn!(error = %other, "invalid webhook request");
                let payload = json!({ "detail": "Invalid request" });
                (StatusCode::BAD_REQUEST, Json(payload)).into_response()
            }
        }
    }
}
