pub use crate::route::model::{Detail, IdInput, Paginate};

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A single post, created by a user.
#[model]
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The title of the post.
	#[validate(length(max = 255))]
	pub title: String,
	/// The body of the post.
	pub content: String,
	/// The user that created the post.
	#[serde(skip_deserializing)]
	pub author_id: Uuid,
	/// The creation time of the post.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
	/// The last time the title or content changed.
	#[serde(skip_deserializing)]
	pub updated_at: chrono::DateTime<chrono::Utc>,
	/// The number of likes on the post.
	#[serde(skip_deserializing)]
	pub likes_count: i64,
	/// The number of comments on the post.
	#[serde(skip_deserializing)]
	pub comments_count: i64,
}

/// A comment left on a post.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Comment {
	pub id: Uuid,
	pub post_id: Uuid,
	/// The user that wrote the comment.
	pub user_id: Uuid,
	pub content: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct CommentInput {
	#[validate(length(min = 1))]
	pub content: String,
}

/// A like on a post. A user can like a post at most once.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Like {
	pub id: Uuid,
	pub post_id: Uuid,
	pub user_id: Uuid,
	pub created_at: chrono::DateTime<chrono::Utc>,
}
