use aide::axum::IntoApiResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use macros::route;

use crate::{credential, extract::Json, openapi::tag, store, AppState};

use super::{model, Error, RouteError};

/// Sign up
/// Creates a new account, returning it along with a bearer token.
#[route(tag = tag::AUTH, response(status = 201, description = "Signed up successfully.", shape = "Json<model::AuthResponse>"))]
pub async fn signup(
	State(state): State<AppState>,
	Json(input): Json<model::SignupInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let taken = {
		let mut conn = state.database.acquire().await?;

		store::user::find_by_username(&mut conn, &input.username)
			.await?
			.is_some()
	};

	if taken {
		return Err(Error::UsernameTaken.into());
	}

	// No connection is held while hashing; a concurrent signup for the same
	// name is caught by the unique constraint below.
	let password_hash = credential::hash_blocking(&state.credentials, input.password).await?;

	let mut tx = state.database.begin().await?;
	let user = store::user::insert(&mut tx, &input.username, &password_hash)
		.await
		.map_err(|e| {
			if store::violates(&e, store::user::USERNAME_KEY) {
				Error::UsernameTaken.into()
			} else {
				RouteError::from(e)
			}
		})?;

	tx.commit().await?;

	let token = state.credentials.issue_token(user.id)?;

	tracing::info!(user = %user.id, "signed up");

	Ok((StatusCode::CREATED, Json(model::AuthResponse { user, token })).into_response())
}

/// Log in
/// Logs in to an account, returning it along with a bearer token.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged in successfully.", shape = "Json<model::AuthResponse>"))]
pub async fn login(
	State(state): State<AppState>,
	Json(input): Json<model::LoginInput>,
) -> Result<Json<model::AuthResponse>, RouteError> {
	let user = {
		let mut conn = state.database.acquire().await?;

		store::user::find_by_username(&mut conn, &input.username).await?
	};

	let Some(user) = user else {
		return Err(Error::InvalidUsernameOrPassword.into());
	};

	let verified = credential::verify_blocking(
		&state.credentials,
		input.password,
		user.password_hash.clone(),
	)
	.await?;

	if !verified {
		return Err(Error::InvalidUsernameOrPassword.into());
	}

	let token = state.credentials.issue_token(user.id)?;

	Ok(Json(model::AuthResponse { user, token }))
}
