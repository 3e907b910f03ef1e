use sqlx::PgConnection;
use uuid::Uuid;

use super::post;
use crate::route::post::model::{Comment, Like};

/// The result of liking a post.
#[derive(Debug)]
pub enum LikeOutcome {
	Liked(Like),
	UnknownPost,
	AlreadyLiked,
}

/// Adds a comment to a post. Returns `None` if the post does not exist.
#[tracing::instrument(skip(conn, content))]
pub async fn add_comment(
	conn: &mut PgConnection,
	post_id: Uuid,
	user_id: Uuid,
	content: &str,
) -> sqlx::Result<Option<Comment>> {
	if !post::lock_shared(&mut *conn, post_id).await? {
		return Ok(None);
	}

	sqlx::query_as::<_, Comment>(
		r"
			INSERT INTO comment (id, post_id, user_id, content)
			VALUES (DEFAULT, $1, $2, $3)
			RETURNING *
		",
	)
	.bind(post_id)
	.bind(user_id)
	.bind(content)
	.fetch_one(conn)
	.await
	.map(Some)
}

/// Lists the comments on a post, oldest first. Returns `None` if the post
/// does not exist.
#[tracing::instrument(skip(conn))]
pub async fn list_comments(
	conn: &mut PgConnection,
	post_id: Uuid,
) -> sqlx::Result<Option<Vec<Comment>>> {
	let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM post WHERE id = $1)")
		.bind(post_id)
		.fetch_one(&mut *conn)
		.await?;

	if !exists {
		return Ok(None);
	}

	sqlx::query_as::<_, Comment>(
		"SELECT * FROM comment WHERE post_id = $1 ORDER BY created_at, id",
	)
	.bind(post_id)
	.fetch_all(conn)
	.await
	.map(Some)
}

/// Likes a post on behalf of a user, at most once per user.
#[tracing::instrument(skip(conn))]
pub async fn like(
	conn: &mut PgConnection,
	post_id: Uuid,
	user_id: Uuid,
) -> sqlx::Result<LikeOutcome> {
	if !post::lock_shared(&mut *conn, post_id).await? {
		return Ok(LikeOutcome::UnknownPost);
	}

	let like = sqlx::query_as::<_, Like>(
		r"
			INSERT INTO post_like (id, post_id, user_id)
			VALUES (DEFAULT, $1, $2)
			ON CONFLICT (post_id, user_id) DO NOTHING
			RETURNING *
		",
	)
	.bind(post_id)
	.bind(user_id)
	.fetch_optional(conn)
	.await?;

	Ok(like.map_or(LikeOutcome::AlreadyLiked, LikeOutcome::Liked))
}
