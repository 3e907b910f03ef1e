use aide::axum::{routing::post_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid username or password")]
	InvalidUsernameOrPassword,
	#[error("missing bearer token")]
	MissingToken,
	#[error("invalid or expired token")]
	InvalidToken,
	#[error("username already exists")]
	UsernameTaken,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/signup", post_with(signup, signup_docs))
		.api_route("/login", post_with(login, login_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidUsernameOrPassword | Self::MissingToken | Self::InvalidToken => {
				StatusCode::UNAUTHORIZED
			}
			Self::UsernameTaken => StatusCode::BAD_REQUEST,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		let message = error::Message::new(self.to_string());

		match self {
			Self::UsernameTaken => message.field("username").into_vec(),
			_ => message.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::{store, test::*};

	#[tokio::test]
	async fn test_signup_rejects_short_username() {
		let app = app(lazy_database());

		let response = app
			.post("/auth/signup")
			.json(&json!({
				"username": "al",
				"password": "secret1",
			}))
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[tokio::test]
	async fn test_signup_rejects_missing_password() {
		let app = app(lazy_database());

		let response = app
			.post("/auth/signup")
			.json(&json!({ "username": "alice" }))
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[sqlx::test(migrations = "./migrations")]
	#[ignore = "requires a PostgreSQL DATABASE_URL"]
	async fn test_signup_flow(pool: Database) {
		let app = app(pool.clone());

		let response = app
			.post("/auth/signup")
			.json(&json!({
				"username": "alice",
				"password": "secret1",
			}))
			.await;

		assert_eq!(response.status_code(), 201);

		let signup = response.json::<Value>();
		let first = signup["token"].as_str().unwrap().to_owned();

		assert_eq!(signup["username"], "alice");
		assert!(signup.get("password_hash").is_none());

		let response = app
			.post("/auth/login")
			.json(&json!({
				"username": "alice",
				"password": "secret1",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let login = response.json::<Value>();
		let second = login["token"].as_str().unwrap().to_owned();

		assert_eq!(login["id"], signup["id"]);

		let credentials = credentials();
		let user_id = credentials.authenticate(&first).unwrap();

		assert_eq!(credentials.authenticate(&second).unwrap(), user_id);
		assert_eq!(signup["id"], json!(user_id));
	}

	#[sqlx::test(migrations = "./migrations")]
	#[ignore = "requires a PostgreSQL DATABASE_URL"]
	async fn test_signup_duplicate_username(pool: Database) {
		let app = app(pool.clone());
		let body = json!({
			"username": "alice",
			"password": "secret1",
		});

		assert_eq!(app.post("/auth/signup").json(&body).await.status_code(), 201);

		let response = app.post("/auth/signup").json(&body).await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"username already exists"
		);

		let count = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "user""#)
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(count, 1);
	}

	#[sqlx::test(migrations = "./migrations")]
	#[ignore = "requires a PostgreSQL DATABASE_URL"]
	async fn test_duplicate_insert_violates_username_key(pool: Database) {
		let mut conn = pool.acquire().await.unwrap();

		store::user::insert(&mut conn, "alice", "hash").await.unwrap();

		let error = store::user::insert(&mut conn, "alice", "hash")
			.await
			.unwrap_err();

		assert!(store::violates(&error, store::user::USERNAME_KEY));
	}

	#[sqlx::test(migrations = "./migrations")]
	#[ignore = "requires a PostgreSQL DATABASE_URL"]
	async fn test_login_failures_are_identical(pool: Database) {
		let app = app(pool);

		signup(&app, "alice", "secret1").await;

		let wrong_password = app
			.post("/auth/login")
			.json(&json!({
				"username": "alice",
				"password": "secret2",
			}))
			.await;

		let unknown_user = app
			.post("/auth/login")
			.json(&json!({
				"username": "bob",
				"password": "secret1",
			}))
			.await;

		assert_eq!(wrong_password.status_code(), 401);
		assert_eq!(unknown_user.status_code(), 401);
		assert_eq!(wrong_password.text(), unknown_user.text());
	}
}
