use aide::axum::ApiRouter;
use tower_governor::GovernorLayer;

use crate::{ratelimit::Limits, AppState};

pub mod auth;
pub mod docs;
pub mod model;
pub mod post;

/// Mounts every API route. When `limits` is given, signup and login
/// are also subject to the stricter per-IP limit.
pub fn routes(limits: Option<&Limits>) -> ApiRouter<AppState> {
	let auth = match limits {
		Some(limits) => auth::routes().layer(GovernorLayer {
			config: limits.secure.clone(),
		}),
		None => auth::routes(),
	};

	ApiRouter::new()
		.nest("/auth", auth)
		.nest("/posts", post::routes())
}
