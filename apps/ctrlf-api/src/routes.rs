use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use ctrlf_router::{Error, FinalAnswer};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
	pub message: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
	pub response: FinalAnswer,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let (status, code) = match &err {
			Error::Routing { .. } => (StatusCode::BAD_GATEWAY, "routing_error"),
			Error::EngineQuery { .. } => (StatusCode::BAD_GATEWAY, "engine_query_error"),
			Error::Synthesis { .. } => (StatusCode::BAD_GATEWAY, "synthesis_error"),
			Error::WorkflowTimeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "workflow_timeout"),
			Error::InvalidConfig { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "invalid_config"),
		};

		json_error(status, code, err.to_string())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/query", post(query))
		.layer(cors())
		.with_state(state)
}

/// Browser clients on any origin may call the API.
fn cors() -> CorsLayer {
	CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn query(
	State(state): State<AppState>,
	Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
	if payload.message.trim().is_empty() {
		return Err(json_error(StatusCode::BAD_REQUEST, "invalid_request", "message is required."));
	}

	let response = state.session.query(&payload.message).await?;

	Ok(Json(QueryResponse { response }))
}
