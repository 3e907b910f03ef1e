//! Data access for users, posts and their engagement.
//!
//! Every operation takes the connection it runs on, which is either a
//! pooled connection for reads or an open transaction for writes. A
//! transaction that is dropped without being committed is rolled back.

pub mod engagement;
pub mod post;
pub mod user;

/// Returns `true` if the error is a violation of the named constraint.
pub fn violates(error: &sqlx::Error, constraint: &str) -> bool {
	matches!(error, sqlx::Error::Database(error) if error.constraint() == Some(constraint))
}
