use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use curio_service::{
	Error, InterestSearchRequest, InterestSearchResponse, ResourceSummary, TagListResponse,
	TopicListQuery, TopicListResponse, TopicResolution,
};

#[derive(Debug, Deserialize)]
pub struct TopicDetailsQuery {
	pub explain: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message, field } => json_error(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				message,
				field.map(|field| vec![field]),
			),
			Error::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "not_found", message, None),
			err => {
				tracing::error!(error = %err, "Request failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"internal",
					"Internal server error.",
					None,
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/v1/tags", get(list_tags))
		.route("/api/v1/topics", get(list_topics))
		.route("/api/v1/topics/interest-search", post(interest_search))
		.route("/api/v1/topics/{topic_id}", get(topic_details))
		.route("/api/v1/resources/{resource_id}", get(resource_details))
		.with_state(state)
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_tags(State(state): State<AppState>) -> Json<TagListResponse> {
	Json(state.service.list_tags())
}

async fn list_topics(
	State(state): State<AppState>,
	Query(query): Query<TopicListQuery>,
) -> Result<Json<TopicListResponse>, ApiError> {
	let response = state.service.list_topics(&query)?;
	Ok(Json(response))
}

async fn topic_details(
	State(state): State<AppState>,
	Path(topic_id): Path<String>,
	Query(query): Query<TopicDetailsQuery>,
) -> Result<Json<TopicResolution>, ApiError> {
	let response = state.service.topic_details(&topic_id, query.explain)?;
	Ok(Json(response))
}

async fn resource_details(
	State(state): State<AppState>,
	Path(resource_id): Path<u32>,
) -> Result<Json<ResourceSummary>, ApiError> {
	let response = state.service.resource_details(resource_id)?;
	Ok(Json(response))
}

async fn interest_search(
	State(state): State<AppState>,
	Json(payload): Json<InterestSearchRequest>,
) -> Result<Json<InterestSearchResponse>, ApiError> {
	let response = state.service.interest_search(payload).await?;
	Ok(Json(response))
}
