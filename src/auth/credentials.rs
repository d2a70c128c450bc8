//! Fixed service identity and provider endpoints, read-only after startup.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
};

/// Path of the password-grant endpoint relative to the provider base URL.
pub const IDENTITY_TOKEN_PATH: &str = "/api/identity/token";
/// Path of the payment-QR creation endpoint relative to the provider base URL.
pub const QR_CREATE_PATH: &str = "/api/v1/qr";

/// Service identity plus the provider endpoints derived from its base URL.
#[derive(Clone)]
pub struct Credentials {
	/// Provider base URL as configured.
	pub base_url: Url,
	/// Service account name used for the password grant.
	pub username: String,
	/// Service account password.
	pub password: TokenSecret,
	/// PEM-encoded public key used to verify inbound signals.
	pub public_key: Option<Vec<u8>>,
	identity_endpoint: Url,
	qr_endpoint: Url,
}
impl Credentials {
	/// Checks the identity and derives the provider endpoints.
	///
	/// Endpoint paths are appended to the base URL, so a base with a path prefix keeps it.
	pub fn new(
		base_url: Url,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let username = username.into();

		if username.trim().is_empty() {
			return Err(ConfigError::EmptyUsername);
		}

		let identity_endpoint = join_endpoint(&base_url, IDENTITY_TOKEN_PATH)?;
		let qr_endpoint = join_endpoint(&base_url, QR_CREATE_PATH)?;

		Ok(Self {
			base_url,
			username,
			password: TokenSecret::new(password),
			public_key: None,
			identity_endpoint,
			qr_endpoint,
		})
	}

	/// Attaches the PEM public key used by the signal verifier.
	pub fn with_public_key(mut self, pem: impl Into<Vec<u8>>) -> Self {
		self.public_key = Some(pem.into());

		self
	}

	/// `{baseURL}/api/identity/token`.
	pub fn identity_endpoint(&self) -> &Url {
		&self.identity_endpoint
	}

	/// `{baseURL}/api/v1/qr`.
	pub fn qr_endpoint(&self) -> &Url {
		&self.qr_endpoint
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("base_url", &self.base_url.as_str())
			.field("username", &self.username)
			.field("password", &self.password)
			.field("public_key_set", &self.public_key.is_some())
			.finish()
	}
}

fn join_endpoint(base: &Url, path: &str) -> Result<Url, ConfigError> {
	if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
		return Err(ConfigError::InvalidBaseUrl { url: base.to_string() });
	}

	let raw = format!("{}{path}", base.as_str().trim_end_matches('/'));

	Url::parse(&raw).map_err(|_| ConfigError::InvalidBaseUrl { url: base.to_string() })
}
