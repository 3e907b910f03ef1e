use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};
use uuid::Uuid;

use crate::{
	credential::Credentials, error::RouteError, openapi::SECURITY_SCHEME_BEARER, route::auth,
};

pub const AUTHORIZATION_SCHEME: &str = "Bearer";

/// The authenticated caller, identified by a bearer token.
///
/// If the `Authorization` header is absent, a [`auth::Error::MissingToken`] is returned.
/// If the token is malformed, forged or expired, a [`auth::Error::InvalidToken`] is returned.
///
/// Only the token is checked, the user row is not loaded.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{}", session.user_id);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub user_id: Uuid,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Credentials: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let header = parts
			.headers
			.get(header::AUTHORIZATION)
			.ok_or(auth::Error::MissingToken)?;

		let token = header
			.to_str()
			.ok()
			.and_then(|value| value.trim().split_once(' '))
			.filter(|(scheme, _)| scheme.eq_ignore_ascii_case(AUTHORIZATION_SCHEME))
			.map(|(_, token)| token.trim())
			.filter(|token| !token.is_empty())
			.ok_or(auth::Error::InvalidToken)?;

		let credentials = Credentials::from_ref(state);
		let user_id = credentials.authenticate(token).map_err(|error| {
			tracing::debug!(%error, "rejected bearer token");
			auth::Error::InvalidToken
		})?;

		Ok(Self { user_id })
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a bearer token requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}
