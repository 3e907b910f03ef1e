use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(Uuid),
	#[error("no data provided for update")]
	EmptyUpdate,
	#[error("post {0} already liked")]
	AlreadyLiked(Uuid),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(get_posts, get_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/:id",
			get_with(get_post, get_post_docs)
				.put_with(update_post, update_post_docs)
				.delete_with(delete_post, delete_post_docs),
		)
		.api_route("/:id/comment", post_with(add_comment, add_comment_docs))
		.api_route("/:id/comments", get_with(get_comments, get_comments_docs))
		.api_route("/:id/like", post_with(like_post, like_post_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::EmptyUpdate | Self::AlreadyLiked(..) => StatusCode::BAD_REQUEST,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("post not found")
				.detail("post", post.to_string())
				.into_vec(),
			Self::EmptyUpdate => error::Message::new(self.to_string()).into_vec(),
			Self::AlreadyLiked(post) => error::Message::new("you have already liked this post")
				.detail("post", post.to_string())
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use uuid::Uuid;

	use crate::test::*;

	#[tokio::test]
	async fn test_create_requires_token() {
		let app = app(lazy_database());

		let response = app
			.post("/posts")
			.json(&json!({ "title": "Hello", "content": "World" }))
			.await;

		assert_eq!(response.status_code(), 401);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"missing bearer token"
		);
	}

	#[tokio::test]
	async fn test_create_rejects_forged_token() {
		let app = app(lazy_database());
		let forged = other_credentials().issue_token(Uuid::new_v4()).unwrap();

		let response = app
			.post("/posts")
			.add_header(AUTHORIZATION, bearer(&forged))
			.json(&json!({ "title": "Hello", "content": "World" }))
			.await;

		assert_eq!(response.status_code(), 401);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"invalid or expired token"
		);
	}

	#[tokio::test]
	async fn test_create_rejects_non_bearer_scheme() {
		let app = app(lazy_database());
		let token = credentials().issue_token(Uuid::new_v4()).unwrap();

		let response = app
			.post("/posts")
			.add_header(AUTHORIZATION, HeaderValue::from_str(&format!("Basic {token}")).unwrap())
			.json(&json!({ "title": "Hello", "content": "World" }))
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[tokio::test]
	async fn test_create_rejects_long_title() {
		let app = app(lazy_database());
		let token = credentials().issue_token(Uuid::new_v4()).unwrap();

		let response = app
			.post("/posts")
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({ "title": "a".repeat(256), "content": "World" }))
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[tokio::test]
	async fn test_update_requires_a_field() {
		let app = app(lazy_database());
		let token = credentials().issue_token(Uuid::new_v4()).unwrap();

		let response = app
			.put(&format!("/posts/{}", Uuid::new_v4()))
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({}))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"no data provided for update"
		);
	}

	#[tokio::test]
	async fn test_bearer_scheme_is_case_insensitive() {
		let app = app(lazy_database());
		let token = credentials().issue_token(Uuid::new_v4()).unwrap();

		for scheme in ["bearer", "BEARER"] {
			let response = app
				.put(&format!("/posts/{}", Uuid::new_v4()))
				.add_header(
					AUTHORIZATION,
					HeaderValue::from_str(&format!("{scheme} {token}")).unwrap(),
				)
				.json(&json!({}))
				.await;

			assert_eq!(response.status_code(), 400);
		}
	}

	#[tokio::test]
	async fn test_bearer_without_token() {
		let app = app(lazy_database());

		let response = app
			.post("/posts")
			.add_header(AUTHORIZATION, HeaderValue::from_static("Bearer "))
			.json(&json!({ "title": "Hello", "content": "World" }))
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[tokio::test]
	async fn test_get_rejects_malformed_id() {
		let app = app(lazy_database());

		let response = app.get("/posts/not-a-uuid").await;

		assert_eq!(response.status_code(), 400);
	}

	#[tokio::test]
	async fn test_like_and_comment_require_token() {
		let app = app(lazy_database());
		let post = Uuid::new_v4();

		let like = app.post(&format!("/posts/{post}/like")).await;
		let comment = app
			.post(&format!("/posts/{post}/comment"))
			.json(&json!({ "content": "Nice" }))
			.await;

		assert_eq!(like.status_code(), 401);
		assert_eq!(comment.status_code(), 401);
	}

	#[tokio::test]
	async fn test_comment_rejects_empty_content() {
		let app = app(lazy_database());
		let token = credentials().issue_token(Uuid::new_v4()).unwrap();

		let response = app
			.post(&format!("/posts/{}/comment", Uuid::new_v4()))
			.add_header(AUTHORIZATION, bearer(&token))
			.json(&json!({ "content": "" }))
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[sqlx::test(migrations = "./migrations")]
	#[ignore = "requires a PostgreSQL DATABASE_URL"]
	async fn test_post_lifecycle(pool: Database) {
		let app = app(pool.clone());
		let alice = signup(&app, "alice", "secret1").await;
		let bob = signup(&app, "bob", "secret2").await;

		let response = app
			.post("/posts")
			.add_header(AUTHORIZATION, bearer(&alice))
			.json(&json!({ "title": "Hello", "content": "World" }))
			.await;

		assert_eq!(response.status_code(), 201);

		let created = response.json::<Value>();
		let id = created["id"].as_str().unwrap().to_owned();

		assert_eq!(created["likes_count"], 0);
		assert_eq!(created["comments_count"], 0);
		assert_eq!(created["created_at"], created["updated_at"]);

		for token in [&alice, &bob] {
			let response = app
				.post(&format!("/posts/{id}/comment"))
				.add_header(AUTHORIZATION, bearer(token))
				.json(&json!({ "content": "Nice post" }))
				.await;

			assert_eq!(response.status_code(), 200);
		}

		let response = app
			.post(&format!("/posts/{id}/like"))
			.add_header(AUTHORIZATION, bearer(&bob))
			.await;

		assert_eq!(response.status_code(), 200);

		let post = app.get(&format!("/posts/{id}")).await.json::<Value>();

		assert_eq!(post["likes_count"], 1);
		assert_eq!(post["comments_count"], 2);

		let comments = app.get(&format!("/posts/{id}/comments")).await;

		assert_eq!(comments.status_code(), 200);
		assert_eq!(comments.json::<Vec<Value>>().len(), 2);

		let posts = app.get("/posts").await.json::<Vec<Value>>();

		assert_eq!(posts.len(), 1);
		assert_eq!(posts[0]["comments_count"], 2);

		let response = app
			.put(&format!("/posts/{id}"))
			.add_header(AUTHORIZATION, bearer(&alice))
			.json(&json!({ "title": "Hello again" }))
			.await;

		assert_eq!(response.status_code(), 200);

		let updated = response.json::<Value>();

		assert_eq!(updated["title"], "Hello again");
		assert_eq!(updated["content"], "World");
		assert_eq!(updated["likes_count"], 1);
		assert_eq!(updated["created_at"], created["created_at"]);
		assert_ne!(updated["updated_at"], created["updated_at"]);

		let updated_at = updated["updated_at"]
			.as_str()
			.unwrap()
			.parse::<chrono::DateTime<chrono::Utc>>()
			.unwrap();
		let created_at = created["created_at"]
			.as_str()
			.unwrap()
			.parse::<chrono::DateTime<chrono::Utc>>()
			.unwrap();

		assert!(updated_at > created_at);
	}

	#[sqlx::test(migrations = "./migrations")]
	#[ignore = "requires a PostgreSQL DATABASE_URL"]
	async fn test_non_author_cannot_mutate(pool: Database) {
		let app = app(pool.clone());
		let alice = signup(&app, "alice", "secret1").await;
		let bob = signup(&app, "bob", "secret2").await;
		let id = create_post(&app, &alice, "Hello", "World").await;

		let update = app
			.put(&format!("/posts/{id}"))
			.add_header(AUTHORIZATION, bearer(&bob))
			.json(&json!({ "title": "Mine now" }))
			.await;

		let delete = app
			.delete(&format!("/posts/{id}"))
			.add_header(AUTHORIZATION, bearer(&bob))
			.await;

		let missing = app
			.delete(&format!("/posts/{}", Uuid::new_v4()))
			.add_header(AUTHORIZATION, bearer(&bob))
			.await;

		assert_eq!(update.status_code(), 404);
		assert_eq!(delete.status_code(), 404);
		assert_eq!(missing.status_code(), 404);

		let post = app.get(&format!("/posts/{id}")).await.json::<Value>();

		assert_eq!(post["title"], "Hello");
	}

	#[sqlx::test(migrations = "./migrations")]
	#[ignore = "requires a PostgreSQL DATABASE_URL"]
	async fn test_like_twice(pool: Database) {
		let app = app(pool.clone());
		let alice = signup(&app, "alice", "secret1").await;
		let id = create_post(&app, &alice, "Hello", "World").await;

		let first = app
			.post(&format!("/posts/{id}/like"))
			.add_header(AUTHORIZATION, bearer(&alice))
			.await;

		let second = app
			.post(&format!("/posts/{id}/like"))
			.add_header(AUTHORIZATION, bearer(&alice))
			.await;

		assert_eq!(first.status_code(), 200);
		assert_eq!(second.status_code(), 400);

		let likes = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post_like")
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(likes, 1);
	}

	#[sqlx::test(migrations = "./migrations")]
	#[ignore = "requires a PostgreSQL DATABASE_URL"]
	async fn test_delete_removes_engagement(pool: Database) {
		let app = app(pool.clone());
		let alice = signup(&app, "alice", "secret1").await;
		let id = create_post(&app, &alice, "Hello", "World").await;

		app.post(&format!("/posts/{id}/like"))
			.add_header(AUTHORIZATION, bearer(&alice))
			.await;

		app.post(&format!("/posts/{id}/comment"))
			.add_header(AUTHORIZATION, bearer(&alice))
			.json(&json!({ "content": "First" }))
			.await;

		let response = app
			.delete(&format!("/posts/{id}"))
			.add_header(AUTHORIZATION, bearer(&alice))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(app.get(&format!("/posts/{id}")).await.status_code(), 404);
		assert_eq!(
			app.get(&format!("/posts/{id}/comments")).await.status_code(),
			404
		);

		let orphans = sqlx::query_scalar::<_, i64>(
			"SELECT (SELECT COUNT(*) FROM comment) + (SELECT COUNT(*) FROM post_like)",
		)
		.fetch_one(&pool)
		.await
		.unwrap();

		assert_eq!(orphans, 0);
	}

	#[sqlx::test(migrations = "./migrations")]
	#[ignore = "requires a PostgreSQL DATABASE_URL"]
	async fn test_engagement_on_unknown_post(pool: Database) {
		let app = app(pool);
		let alice = signup(&app, "alice", "secret1").await;
		let id = Uuid::new_v4();

		let like = app
			.post(&format!("/posts/{id}/like"))
			.add_header(AUTHORIZATION, bearer(&alice))
			.await;

		let comment = app
			.post(&format!("/posts/{id}/comment"))
			.add_header(AUTHORIZATION, bearer(&alice))
			.json(&json!({ "content": "Hello?" }))
			.await;

		assert_eq!(like.status_code(), 404);
		assert_eq!(comment.status_code(), 404);
		assert_eq!(app.get(&format!("/posts/{id}/comments")).await.status_code(), 404);
	}
}
