use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	response::{IntoResponse, Response},
};
use governor::{
	clock::QuantaInstant,
	middleware::{RateLimitingMiddleware, StateInformationMiddleware},
};
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::{KeyExtractor, PeerIpKeyExtractor},
	GovernorError,
};

use crate::{config::Config, error::AppError};

pub type LimitConfig = Arc<GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>>;

/// Per-IP rate limits.
///
/// `default` applies to every route, `secure` additionally to signup and login.
#[derive(Clone)]
pub struct Limits {
	pub default: LimitConfig,
	pub secure: LimitConfig,
}

impl Limits {
	/// Returns `None` when rate limiting is disabled or misconfigured
	/// (e.g. a rate of zero).
	pub fn new(config: &Config) -> Option<Self> {
		if !config.rate_limit {
			return None;
		}

		let default = GovernorConfigBuilder::default()
			.per_second(config.rate_limit_per_second)
			.burst_size(config.rate_limit_burst)
			.use_headers()
			.error_handler(error_handler)
			.finish();

		let secure = GovernorConfigBuilder::default()
			.per_second(config.auth_rate_limit_per_second)
			.use_headers()
			.error_handler(error_handler)
			.finish();

		let (Some(default), Some(secure)) = (default, secure) else {
			tracing::warn!("invalid rate limit configuration, rate limiting disabled");

			return None;
		};

		Some(Self {
			default: Arc::new(default),
			secure: Arc::new(secure),
		})
	}
}

fn error_handler(error: GovernorError) -> Response<Body> {
	AppError::from(error).into_response()
}

impl From<GovernorError> for AppError {
	fn from(error: GovernorError) -> Self {
		match error {
			GovernorError::TooManyRequests { wait_time, .. } => Self::TooManyRequests { wait_time },
			other => Self::RateLimiter(other.to_string()),
		}
	}
}

/// Periodically drops limiter state for peers that have not been seen recently.
pub fn cleanup_old_limits<T, M>(configs: &[&Arc<GovernorConfig<T, M>>])
where
	T: KeyExtractor,
	<T as KeyExtractor>::Key: Send + Sync + 'static,
	M: RateLimitingMiddleware<QuantaInstant> + Send + Sync + 'static,
{
	let limiters = configs
		.iter()
		.map(|config| config.limiter().clone())
		.collect::<Vec<_>>();
	let interval = Duration::from_secs(60);

	std::thread::spawn(move || loop {
		std::thread::sleep(interval);

		for limiter in &limiters {
			tracing::debug!("rate limiting storage size: {}", limiter.len());

			limiter.retain_recent();
		}
	});
}
