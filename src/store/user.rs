use sqlx::PgConnection;

use crate::route::auth::model::User;

pub const USERNAME_KEY: &str = "user_username_key";

#[tracing::instrument(skip(conn))]
pub async fn find_by_username(
	conn: &mut PgConnection,
	username: &str,
) -> sqlx::Result<Option<User>> {
	sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE username = $1"#)
		.bind(username)
		.fetch_optional(conn)
		.await
}

/// Inserts a new user. A taken username fails with a violation of [`USERNAME_KEY`].
#[tracing::instrument(skip(conn, password_hash))]
pub async fn insert(
	conn: &mut PgConnection,
	username: &str,
	password_hash: &str,
) -> sqlx::Result<User> {
	sqlx::query_as::<_, User>(
		r#"
			INSERT INTO "user" (id, username, password_hash)
			VALUES (DEFAULT, $1, $2)
			RETURNING *
		"#,
	)
	.bind(username)
	.bind(password_hash)
	.fetch_one(conn)
	.await
}
