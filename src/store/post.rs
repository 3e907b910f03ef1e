use sqlx::PgConnection;
use uuid::Uuid;

use crate::route::post::model::{CreatePostInput, Paginate, Post, UpdatePostInput};

/// Selects posts along with their like and comment counts, which are
/// counted at read time rather than stored.
macro_rules! select_post {
	($tail:literal) => {
		concat!(
			r#"
			SELECT
				p.id, p.title, p.content, p.author_id, p.created_at, p.updated_at,
				(SELECT COUNT(*) FROM post_like l WHERE l.post_id = p.id) AS likes_count,
				(SELECT COUNT(*) FROM comment c WHERE c.post_id = p.id) AS comments_count
			FROM post p
			"#,
			$tail
		)
	};
}

#[tracing::instrument(skip(conn, input))]
pub async fn create(
	conn: &mut PgConnection,
	author_id: Uuid,
	input: &CreatePostInput,
) -> sqlx::Result<Post> {
	sqlx::query_as::<_, Post>(
		r"
			INSERT INTO post (id, title, content, author_id)
			VALUES (DEFAULT, $1, $2, $3)
			RETURNING *, 0::BIGINT AS likes_count, 0::BIGINT AS comments_count
		",
	)
	.bind(&input.title)
	.bind(&input.content)
	.bind(author_id)
	.fetch_one(conn)
	.await
}

/// Lists posts, newest first.
#[tracing::instrument(skip_all)]
pub async fn list(conn: &mut PgConnection, paginate: &Paginate) -> sqlx::Result<Vec<Post>> {
	sqlx::query_as::<_, Post>(select_post!(
		"ORDER BY p.created_at DESC, p.id LIMIT $1 OFFSET $2"
	))
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(conn)
	.await
}

#[tracing::instrument(skip(conn))]
pub async fn get(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<Option<Post>> {
	sqlx::query_as::<_, Post>(select_post!("WHERE p.id = $1"))
		.bind(id)
		.fetch_optional(conn)
		.await
}

/// Returns `true` if the post exists, locking it against deletion until
/// the surrounding transaction ends.
#[tracing::instrument(skip(conn))]
pub async fn lock_shared(conn: &mut PgConnection, id: Uuid) -> sqlx::Result<bool> {
	let post = sqlx::query_scalar::<_, Uuid>("SELECT id FROM post WHERE id = $1 FOR SHARE")
		.bind(id)
		.fetch_optional(conn)
		.await?;

	Ok(post.is_some())
}

/// Applies the supplied fields to a post owned by `author_id`.
///
/// Returns `None` if the post does not exist or belongs to someone else.
#[tracing::instrument(skip(conn, input))]
pub async fn update(
	conn: &mut PgConnection,
	id: Uuid,
	author_id: Uuid,
	input: &UpdatePostInput,
) -> sqlx::Result<Option<Post>> {
	let updated = sqlx::query_scalar::<_, Uuid>(
		r"
			UPDATE post
			SET title = COALESCE($1, title), content = COALESCE($2, content), updated_at = now()
			WHERE id = $3 AND author_id = $4
			RETURNING id
		",
	)
	.bind(input.title.as_deref())
	.bind(input.content.as_deref())
	.bind(id)
	.bind(author_id)
	.fetch_optional(&mut *conn)
	.await?;

	if updated.is_none() {
		return Ok(None);
	}

	get(conn, id).await
}

/// Deletes a post owned by `author_id` together with its comments and likes.
///
/// Returns `false` if the post does not exist or belongs to someone else.
#[tracing::instrument(skip(conn))]
pub async fn delete(conn: &mut PgConnection, id: Uuid, author_id: Uuid) -> sqlx::Result<bool> {
	let owned = sqlx::query_scalar::<_, Uuid>(
		"SELECT id FROM post WHERE id = $1 AND author_id = $2 FOR UPDATE",
	)
	.bind(id)
	.bind(author_id)
	.fetch_optional(&mut *conn)
	.await?;

	if owned.is_none() {
		return Ok(false);
	}

	let comments = sqlx::query("DELETE FROM comment WHERE post_id = $1")
		.bind(id)
		.execute(&mut *conn)
		.await?;

	let likes = sqlx::query("DELETE FROM post_like WHERE post_id = $1")
		.bind(id)
		.execute(&mut *conn)
		.await?;

	sqlx::query("DELETE FROM post WHERE id = $1")
		.bind(id)
		.execute(&mut *conn)
		.await?;

	tracing::debug!(
		comments = comments.rows_affected(),
		likes = likes.rows_affected(),
		"removed post engagement"
	);

	Ok(true)
}
