use std::{borrow::Cow, fmt};

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::rejection,
	http::{header, HeaderValue, Response, StatusCode},
	response::IntoResponse,
	Json,
};
use axum_jsonschema::JsonSchemaRejection;
use schemars::JsonSchema;
use serde::Serialize;

use crate::credential;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error presented to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A description of what went wrong.
	pub content: Cow<'a, str>,
	/// The request field the error refers to, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Additional machine-readable context.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorBody<'a> {
	pub errors: Vec<Message<'a>>,
}

/// How an error is presented to the client.
pub trait ErrorShape {
	fn status(&self) -> StatusCode;

	fn into_errors(self) -> Vec<Message<'static>>;
}

/// Errors shared by every route.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0:?}")]
	Json(JsonSchemaRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("too many requests, retry in {wait_time}s")]
	TooManyRequests { wait_time: u64 },
	#[error("rate limiter error: {0}")]
	RateLimiter(String),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("credential error: {0}")]
	Credential(#[from] credential::Error),
}

impl From<JsonSchemaRejection> for AppError {
	fn from(rejection: JsonSchemaRejection) -> Self {
		Self::Json(rejection)
	}
}

impl AppError {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) | Self::Path(..) | Self::Query(..) => {
				StatusCode::BAD_REQUEST
			}
			Self::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
			Self::RateLimiter(..) | Self::Database(..) | Self::Credential(..) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}

	pub fn into_errors(self) -> Vec<Message<'static>> {
		match self {
			Self::Validation(errors) => {
				let mut messages = errors
					.field_errors()
					.into_iter()
					.flat_map(|(field, errors)| {
						let field = field.to_string();

						errors
							.iter()
							.map(move |error| Message::new(error.to_string()).field(field.clone()))
					})
					.collect::<Vec<_>>();

				messages.sort_by(|a, b| a.field.cmp(&b.field));
				messages
			}
			Self::Json(JsonSchemaRejection::Json(rejection)) => {
				Message::new(rejection.body_text()).into_vec()
			}
			Self::Json(JsonSchemaRejection::Serde(error)) => Message::new(error.inner().to_string())
				.field(error.path().to_string())
				.into_vec(),
			Self::Json(..) => Message::new("request body does not match its schema").into_vec(),
			Self::Path(rejection) => Message::new(rejection.body_text()).into_vec(),
			Self::Query(rejection) => Message::new(rejection.body_text()).into_vec(),
			Self::TooManyRequests { wait_time } => Message::new("too many requests")
				.detail("retry_after", wait_time)
				.into_vec(),
			Self::RateLimiter(..) | Self::Database(..) | Self::Credential(..) => {
				Message::new("internal server error").into_vec()
			}
		}
	}
}

/// The error type returned by route handlers: either a route-specific
/// error `E` or one shared by all routes.
#[derive(Debug)]
pub enum RouteError<E> {
	App(AppError),
	Route(E),
}

impl<E> From<AppError> for RouteError<E> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<E> From<sqlx::Error> for RouteError<E> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<E> From<credential::Error> for RouteError<E> {
	fn from(error: credential::Error) -> Self {
		Self::App(AppError::Credential(error))
	}
}

impl<E: ErrorShape> From<E> for RouteError<E> {
	fn from(error: E) -> Self {
		Self::Route(error)
	}
}

impl<E: fmt::Display> fmt::Display for RouteError<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::App(error) => error.fmt(f),
			Self::Route(error) => error.fmt(f),
		}
	}
}

fn respond(
	status: StatusCode,
	errors: Vec<Message<'static>>,
	retry_after: Option<u64>,
) -> Response<Body> {
	let mut response = (status, Json(ErrorBody { errors })).into_response();

	if let Some(wait_time) = retry_after {
		response
			.headers_mut()
			.insert(header::RETRY_AFTER, HeaderValue::from(wait_time));
	}

	response
}

impl<E: ErrorShape + fmt::Display> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => {
				let status = error.status();

				tracing::debug!(%error, %status, "request rejected");
				respond(status, error.into_errors(), None)
			}
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		} else {
			tracing::debug!(error = %self, %status, "request rejected");
		}

		let retry_after = match &self {
			Self::TooManyRequests { wait_time } => Some(*wait_time),
			_ => None,
		};

		respond(status, self.into_errors(), retry_after)
	}
}

impl<E> OperationOutput for RouteError<E> {
	type Inner = ErrorBody<'static>;
}

#[cfg(test)]
mod test {
	use axum::{http::StatusCode, response::IntoResponse};
	use validator::Validate;

	use super::{AppError, ErrorShape, Message, RouteError};

	#[derive(Debug, thiserror::Error)]
	#[error("teapot")]
	struct Teapot;

	impl ErrorShape for Teapot {
		fn status(&self) -> StatusCode {
			StatusCode::IM_A_TEAPOT
		}

		fn into_errors(self) -> Vec<Message<'static>> {
			Message::new("short and stout").into_vec()
		}
	}

	#[derive(Validate)]
	struct Input {
		#[validate(length(min = 3))]
		name: String,
	}

	async fn body(error: RouteError<Teapot>) -> (StatusCode, serde_json::Value) {
		let response = error.into_response();
		let status = response.status();
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();

		(status, serde_json::from_slice(&bytes).unwrap())
	}

	#[tokio::test]
	async fn test_route_error_shape() {
		let (status, body) = body(Teapot.into()).await;

		assert_eq!(status, StatusCode::IM_A_TEAPOT);
		assert_eq!(body["errors"][0]["content"], "short and stout");
	}

	#[tokio::test]
	async fn test_database_error_is_hidden() {
		let (status, body) = body(sqlx::Error::RowNotFound.into()).await;

		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(body["errors"][0]["content"], "internal server error");
		assert!(body["errors"][0].get("details").is_none());
	}

	#[tokio::test]
	async fn test_validation_error_names_field() {
		let errors = Input { name: "ab".into() }.validate().unwrap_err();
		let (status, body) = body(AppError::from(errors).into()).await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["errors"][0]["field"], "name");
	}

	#[test]
	fn test_too_many_requests_sets_retry_after() {
		let response =
			RouteError::<Teapot>::from(AppError::TooManyRequests { wait_time: 3 }).into_response();

		assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
		assert_eq!(response.headers()["retry-after"], "3");
	}
}
