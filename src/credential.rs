use std::{str::FromStr, sync::Arc};

use argon2::{
	password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

/// An error raised while hashing passwords or handling tokens.
///
/// None of these are shown to the client; token failures are reported
/// as a plain 401 by the session extractor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("password hash error: {0}")]
	Hash(argon2::password_hash::Error),
	#[error("token error: {0}")]
	Token(#[from] jsonwebtoken::errors::Error),
	#[error("token subject is not a user id")]
	MalformedSubject,
	#[error("unsupported signing algorithm {0:?}")]
	UnsupportedAlgorithm(Algorithm),
	#[error("token lifetime must be a positive number of minutes, got {0}")]
	InvalidLifetime(i64),
	#[error("blocking task failed: {0}")]
	Task(#[from] tokio::task::JoinError),
}

/// Hashes passwords and issues/validates bearer tokens.
pub trait CredentialService: Send + Sync {
	/// Hashes a password with a fresh random salt.
	fn hash_password(&self, password: &str) -> Result<String, Error>;

	/// Checks a password against a hash produced by [`Self::hash_password`].
	fn verify_password(&self, password: &str, hash: &str) -> Result<bool, Error>;

	/// Issues a signed token for the user that expires after the configured duration.
	fn issue_token(&self, user_id: Uuid) -> Result<String, Error>;

	/// Returns the user a token was issued for, if its signature and expiry hold.
	fn authenticate(&self, token: &str) -> Result<Uuid, Error>;
}

pub type Credentials = Arc<dyn CredentialService>;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
	sub: String,
	exp: i64,
}

/// Argon2 password hashes with HMAC-signed JWTs.
pub struct Argon2Jwt {
	hasher: Argon2<'static>,
	algorithm: Algorithm,
	encoding: EncodingKey,
	decoding: DecodingKey,
	validation: Validation,
	ttl: Duration,
}

impl Argon2Jwt {
	pub fn new(secret: &[u8], algorithm: Algorithm, ttl: Duration) -> Result<Self, Error> {
		if !matches!(
			algorithm,
			Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
		) {
			return Err(Error::UnsupportedAlgorithm(algorithm));
		}

		let mut validation = Validation::new(algorithm);
		validation.set_required_spec_claims(&["exp", "sub"]);
		validation.leeway = 0;

		Ok(Self {
			hasher: Argon2::default(),
			algorithm,
			encoding: EncodingKey::from_secret(secret),
			decoding: DecodingKey::from_secret(secret),
			validation,
			ttl,
		})
	}

	pub fn from_config(config: &Config) -> Result<Self, Error> {
		let minutes = config.access_token_expire_minutes;
		let ttl = Duration::try_minutes(minutes)
			.filter(|_| minutes > 0)
			.ok_or(Error::InvalidLifetime(minutes))?;

		Self::new(
			config.secret_key.as_bytes(),
			Algorithm::from_str(&config.algorithm)?,
			ttl,
		)
	}
}

impl CredentialService for Argon2Jwt {
	fn hash_password(&self, password: &str) -> Result<String, Error> {
		let salt = SaltString::generate(&mut OsRng);

		self.hasher
			.hash_password(password.as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(Error::Hash)
	}

	fn verify_password(&self, password: &str, hash: &str) -> Result<bool, Error> {
		let hash = PasswordHash::new(hash).map_err(Error::Hash)?;

		match self.hasher.verify_password(password.as_bytes(), &hash) {
			Ok(()) => Ok(true),
			Err(argon2::password_hash::Error::Password) => Ok(false),
			Err(error) => Err(Error::Hash(error)),
		}
	}

	fn issue_token(&self, user_id: Uuid) -> Result<String, Error> {
		let claims = Claims {
			sub: user_id.to_string(),
			exp: (Utc::now() + self.ttl).timestamp(),
		};

		Ok(jsonwebtoken::encode(
			&Header::new(self.algorithm),
			&claims,
			&self.encoding,
		)?)
	}

	fn authenticate(&self, token: &str) -> Result<Uuid, Error> {
		let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;

		Uuid::parse_str(&data.claims.sub).map_err(|_| Error::MalformedSubject)
	}
}

/// Hashes a password on the blocking thread pool.
pub async fn hash_blocking(credentials: &Credentials, password: String) -> Result<String, Error> {
	let credentials = Arc::clone(credentials);

	tokio::task::spawn_blocking(move || credentials.hash_password(&password)).await?
}

/// Verifies a password on the blocking thread pool.
pub async fn verify_blocking(
	credentials: &Credentials,
	password: String,
	hash: String,
) -> Result<bool, Error> {
	let credentials = Arc::clone(credentials);

	tokio::task::spawn_blocking(move || credentials.verify_password(&password, &hash)).await?
}
