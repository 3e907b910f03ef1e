#![warn(clippy::pedantic)]

mod config;
mod credential;
mod error;
mod extract;
mod openapi;
mod ratelimit;
mod route;
mod store;
mod trace;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use aide::openapi::OpenApi;
use axum::{
	body::Body,
	extract::{FromRef, Request},
	http::Response,
	Extension, Router, ServiceExt,
};
use sqlx::postgres::PgPoolOptions;
use tower::Layer;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	normalize_path::NormalizePathLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Span;

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// Handlers pull out the parts they need with [`axum::extract::State`],
/// e.g. `State<Database>` or `State<Credentials>`.
#[derive(Clone, FromRef)]
pub struct State {
	pub database: Database,
	pub credentials: credential::Credentials,
}

/// Builds the application router, including the API documentation.
///
/// Rate limiting needs the peer address, so `limits` should only be
/// given when serving with connect info.
pub fn app(state: State, limits: Option<&ratelimit::Limits>) -> Router {
	let mut api = OpenApi::default();

	let router = route::routes(limits)
		.nest_api_service("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.with_state(state);

	let router = match limits {
		Some(limits) => router.layer(GovernorLayer {
			config: limits.default.clone(),
		}),
		None => router,
	};

	router
		.layer(
			TraceLayer::new_for_http().on_response(
				|response: &Response<Body>, latency: Duration, _span: &Span| {
					tracing::info!(
						histogram.latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
						status = response.status().as_u16(),
						"finished processing request"
					);
				},
			),
		)
		.layer(CorsLayer::permissive())
		.layer(CompressionLayer::new())
		.layer(PropagateRequestIdLayer::x_request_id())
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = config::Config::from_env().expect("failed to read configuration");
	let _guard = trace::init_tracing_subscriber(&config).expect("failed to initialize tracing");

	aide::gen::on_error(|error| tracing::error!(%error, "failed to generate api docs"));
	aide::gen::extract_schemas(true);

	let credentials =
		credential::Argon2Jwt::from_config(&config).expect("invalid token configuration");

	let database = PgPoolOptions::new()
		.max_connections(config.database_max_connections)
		.connect(&config.database_url)
		.await
		.expect("failed to connect to database");

	if config.run_migrations {
		sqlx::migrate!()
			.run(&database)
			.await
			.expect("failed to run migrations");
	}

	let state = State {
		database,
		credentials: Arc::new(credentials),
	};

	let limits = ratelimit::Limits::new(&config);

	if let Some(limits) = &limits {
		ratelimit::cleanup_old_limits(&[&limits.default, &limits.secure]);
	}

	let app = NormalizePathLayer::trim_trailing_slash().layer(app(state, limits.as_ref()));

	let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
		.await
		.expect("failed to bind to address");

	tracing::info!(
		"listening on {}",
		listener.local_addr().expect("failed to read local address")
	);

	axum::serve(
		listener,
		ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
	)
	.await
	.expect("server error");
}
