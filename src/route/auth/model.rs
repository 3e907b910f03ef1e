use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A single user.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The username that is displayed to the public.
	pub username: String,
	/// The Argon2 hash of the password, in PHC string format.
	#[serde(skip)]
	pub password_hash: String,
	/// The creation time of the user.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A user along with a freshly issued bearer token.
#[derive(Debug, Serialize, JsonSchema)]
pub struct AuthResponse {
	#[serde(flatten)]
	pub user: User,
	/// The bearer token to send in the `Authorization` header.
	pub token: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SignupInput {
	/// The username that is displayed to the public.
	#[validate(length(min = 3, max = 50))]
	pub username: String,
	#[validate(length(min = 6, max = 128))]
	pub password: String,
}

/// Credentials are only compared, never validated, so that every failed
/// login is reported the same way.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	pub username: String,
	pub password: String,
}
