use aide::axum::IntoApiResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use macros::route;

use crate::{
	extract::{Json, Path, Query, Session},
	openapi::tag,
	store::{self, engagement::LikeOutcome},
	Database,
};

use super::{model, Error, RouteError};

/// Get all posts
/// Returns all posts, newest first, along with their like and comment counts.
/// Pass `size` (and optionally `page`) to paginate.
#[route(tag = tag::POST)]
pub async fn get_posts(
	State(database): State<Database>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::Post>>, RouteError> {
	let mut conn = database.acquire().await?;
	let posts = store::post::list(&mut conn, &paginate).await?;

	Ok(Json(posts))
}

/// Get single post
/// Returns a single post by its unique id.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Post>, RouteError> {
	let mut conn = database.acquire().await?;
	let post = store::post::get(&mut conn, path.id).await?;

	Ok(Json(post.ok_or(Error::UnknownPost(path.id))?))
}

/// Create post
/// Creates a new post authored by the authenticated user.
#[route(tag = tag::POST, response(status = 201, description = "Post created.", shape = "Json<model::Post>"))]
pub async fn create_post(
	State(database): State<Database>,
	session: Session,
	Json(input): Json<model::CreatePostInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let mut tx = database.begin().await?;
	let post = store::post::create(&mut tx, session.user_id, &input).await?;

	tx.commit().await?;

	Ok((StatusCode::CREATED, Json(post)).into_response())
}

/// Update post
/// Updates the title and/or content of one of your posts.
/// Posts owned by other users are reported as unknown.
#[route(tag = tag::POST)]
pub async fn update_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::UpdatePostInput>,
) -> Result<Json<model::Post>, RouteError> {
	if input.is_empty() {
		return Err(Error::EmptyUpdate.into());
	}

	let mut tx = database.begin().await?;
	let post = store::post::update(&mut tx, path.id, session.user_id, &input).await?;
	let post = post.ok_or(Error::UnknownPost(path.id))?;

	tx.commit().await?;

	Ok(Json(post))
}

/// Delete post
/// Deletes one of your posts along with its comments and likes.
/// Posts owned by other users are reported as unknown.
#[route(tag = tag::POST)]
pub async fn delete_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Detail>, RouteError> {
	let mut tx = database.begin().await?;

	if !store::post::delete(&mut tx, path.id, session.user_id).await? {
		return Err(Error::UnknownPost(path.id).into());
	}

	tx.commit().await?;

	tracing::info!(post = %path.id, "deleted post");

	Ok(Json(model::Detail::new("post deleted successfully")))
}

/// Comment on post
/// Adds a comment to a post as the authenticated user.
#[route(tag = tag::ENGAGEMENT)]
pub async fn add_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::CommentInput>,
) -> Result<Json<model::Detail>, RouteError> {
	let mut tx = database.begin().await?;
	let comment =
		store::engagement::add_comment(&mut tx, path.id, session.user_id, &input.content)
			.await?
			.ok_or(Error::UnknownPost(path.id))?;

	tx.commit().await?;

	tracing::debug!(comment = %comment.id, post = %path.id, "added comment");

	Ok(Json(model::Detail::new("comment added successfully")))
}

/// Get comments
/// Returns the comments on a post, oldest first.
#[route(tag = tag::ENGAGEMENT)]
pub async fn get_comments(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<Vec<model::Comment>>, RouteError> {
	let mut conn = database.acquire().await?;
	let comments = store::engagement::list_comments(&mut conn, path.id)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	Ok(Json(comments))
}

/// Like post
/// Likes a post as the authenticated user. A post can only be liked once per user.
#[route(tag = tag::ENGAGEMENT)]
pub async fn like_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Detail>, RouteError> {
	let mut tx = database.begin().await?;

	let like = match store::engagement::like(&mut tx, path.id, session.user_id).await? {
		LikeOutcome::Liked(like) => like,
		LikeOutcome::UnknownPost => return Err(Error::UnknownPost(path.id).into()),
		LikeOutcome::AlreadyLiked => return Err(Error::AlreadyLiked(path.id).into()),
	};

	tx.commit().await?;

	tracing::debug!(like = %like.id, post = %path.id, "liked post");

	Ok(Json(model::Detail::new("post liked successfully")))
}
