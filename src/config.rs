use serde::Deserialize;

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
fn default_algorithm() -> String {
	"HS256".into()
}

fn default_token_minutes() -> i64 {
	60
}

fn default_host() -> String {
	"127.0.0.1".into()
}

fn default_port() -> u16 {
	8000
}

fn default_max_connections() -> u32 {
	10
}

fn default_log_level() -> String {
	"info".into()
}

fn default_rate_limit_per_second() -> u64 {
	10
}

fn default_rate_limit_burst() -> u32 {
	50
}

fn default_auth_rate_limit_per_second() -> u64 {
	1
}

fn yes() -> bool {
	true
}

/// Service configuration, read from environment variables of the same
/// name in upper case (e.g. `database_url` from `DATABASE_URL`).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// Connection string of the PostgreSQL database.
	pub database_url: String,
	#[serde(default = "default_max_connections")]
	pub database_max_connections: u32,
	/// Applies the bundled migrations on startup.
	#[serde(default = "yes")]
	pub run_migrations: bool,

	/// Shared secret used to sign bearer tokens.
	pub secret_key: String,
	/// JWT signing algorithm, one of `HS256`, `HS384` or `HS512`.
	#[serde(default = "default_algorithm")]
	pub algorithm: String,
	#[serde(default = "default_token_minutes")]
	pub access_token_expire_minutes: i64,

	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,

	#[serde(default = "default_log_level")]
	pub log_level: String,
	/// OTLP collector; spans and metrics are only exported when set.
	pub otlp_endpoint: Option<String>,

	#[serde(default = "yes")]
	pub rate_limit: bool,
	#[serde(default = "default_rate_limit_per_second")]
	pub rate_limit_per_second: u64,
	#[serde(default = "default_rate_limit_burst")]
	pub rate_limit_burst: u32,
	/// Stricter limit applied to signup and login.
	#[serde(default = "default_auth_rate_limit_per_second")]
	pub auth_rate_limit_per_second: u64,
}

impl Config {
	pub fn from_env() -> Result<Self, envy::Error> {
		envy::from_env()
	}
}

#[cfg(test)]
mod test {
	use super::Config;

	fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
		pairs
			.iter()
			.map(|(key, value)| ((*key).to_string(), (*value).to_string()))
			.collect()
	}

	#[test]
	fn test_defaults() {
		let config = envy::from_iter::<_, Config>(vars(&[
			("DATABASE_URL", "postgres://localhost/postboard"),
			("SECRET_KEY", "hunter2"),
		]))
		.unwrap();

		assert_eq!(config.algorithm, "HS256");
		assert_eq!(config.access_token_expire_minutes, 60);
		assert_eq!(config.port, 8000);
		assert_eq!(config.host, "127.0.0.1");
		assert!(config.run_migrations);
		assert!(config.rate_limit);
		assert!(config.otlp_endpoint.is_none());
	}

	#[test]
	fn test_overrides() {
		let config = envy::from_iter::<_, Config>(vars(&[
			("DATABASE_URL", "postgres://localhost/postboard"),
			("SECRET_KEY", "hunter2"),
			("ALGORITHM", "HS512"),
			("ACCESS_TOKEN_EXPIRE_MINUTES", "5"),
			("PORT", "3000"),
			("RUN_MIGRATIONS", "false"),
			("OTLP_ENDPOINT", "http://localhost:4317"),
		]))
		.unwrap();

		assert_eq!(config.algorithm, "HS512");
		assert_eq!(config.access_token_expire_minutes, 5);
		assert_eq!(config.port, 3000);
		assert!(!config.run_migrations);
		assert_eq!(config.otlp_endpoint.as_deref(), Some("http://localhost:4317"));
	}

	#[test]
	fn test_missing_secret() {
		let config = envy::from_iter::<_, Config>(vars(&[(
			"DATABASE_URL",
			"postgres://localhost/postboard",
		)]));

		assert!(config.is_err());
	}
}
