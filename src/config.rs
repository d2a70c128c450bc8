//! Environment-sourced relay configuration.
//!
//! Every flag falls back to an environment variable so the relay can be configured purely
//! through the process environment. A `.env` file in the working directory is loaded first;
//! variables already set in the environment keep their values.

// std
use std::{
	io::ErrorKind,
	net::SocketAddr,
	path::{Path, PathBuf},
	time::Duration as StdDuration,
};
// crates.io
use clap::Parser;
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	error::ConfigError,
	signal::{SignalPolicy, SignalVerifier},
	token::FlightPolicy,
};

/// Provider base URL used when `MIA_API_URL` is unset.
pub const DEFAULT_MIA_API_URL: &str = "https://test-ipspi.victoriabank.md";
/// Env file read at startup, relative to the working directory.
pub const ENV_FILE: &str = ".env";

/// Relay settings.
#[derive(Clone, Parser)]
#[command(name = "mia-relay", version, about = "Merchant relay for the MIA QR payment API")]
pub struct RelayConfig {
	/// Provider base URL.
	#[arg(long, env = "MIA_API_URL", default_value = DEFAULT_MIA_API_URL)]
	pub mia_api_url: String,
	/// Service username for the password grant.
	#[arg(long, env = "MIA_USERNAME")]
	pub mia_username: String,
	/// Service password for the password grant.
	#[arg(long, env = "MIA_PASSWORD", hide_env_values = true)]
	pub mia_password: String,
	/// Port to listen on (all interfaces).
	#[arg(long, env = "PORT", default_value_t = 10000)]
	pub port: u16,
	/// Inline PEM public key for signal verification; literal `\n` sequences are accepted.
	#[arg(long, env = "PUBLIC_KEY", hide_env_values = true, allow_hyphen_values = true)]
	pub public_key: Option<String>,
	/// Path to a PEM public key for signal verification.
	#[arg(long, env = "PUBLIC_KEY_PATH")]
	pub public_key_path: Option<PathBuf>,
	/// Deadline for each outbound provider call, in seconds.
	#[arg(long = "timeout-secs", env = "MIA_TIMEOUT_SECS", default_value_t = 10)]
	pub timeout_secs: u64,
	/// Required `iss` claim on signals.
	#[arg(long, env = "SIGNAL_ISSUER")]
	pub signal_issuer: Option<String>,
	/// Reject signals that carry no `exp` claim.
	#[arg(long, env = "SIGNAL_REQUIRE_EXP", default_value_t = false, action = clap::ArgAction::Set)]
	pub signal_require_exp: bool,
	/// Share one identity exchange between concurrent cache misses.
	#[arg(long, env = "TOKEN_SINGLE_FLIGHT", default_value_t = true, action = clap::ArgAction::Set)]
	pub token_single_flight: bool,
}
impl RelayConfig {
	/// Address the server binds to.
	pub fn listen_addr(&self) -> SocketAddr {
		SocketAddr::from(([0, 0, 0, 0], self.port))
	}

	/// Outbound request deadline.
	pub fn timeout(&self) -> StdDuration {
		StdDuration::from_secs(self.timeout_secs)
	}

	/// Concurrency policy for the token manager.
	pub fn flight_policy(&self) -> FlightPolicy {
		if self.token_single_flight { FlightPolicy::SingleFlight } else { FlightPolicy::Independent }
	}

	/// Claim policy for the signal verifier.
	pub fn signal_policy(&self) -> SignalPolicy {
		SignalPolicy {
			issuer: self.signal_issuer.clone(),
			require_exp: self.signal_require_exp,
			..Default::default()
		}
	}

	/// Loads the public key PEM, preferring inline material over the key path.
	pub fn public_key_pem(&self) -> Result<Vec<u8>, ConfigError> {
		if let Some(inline) = self.public_key.as_deref().filter(|value| !value.trim().is_empty()) {
			return Ok(normalize_pem(inline).into_bytes());
		}

		let path = self.public_key_path.as_ref().ok_or(ConfigError::MissingPublicKey)?;

		std::fs::read(path).map_err(|source| ConfigError::PublicKeyRead {
			path: path.display().to_string(),
			source,
		})
	}

	/// Builds the service identity with its public key attached.
	pub fn credentials(&self) -> Result<Credentials, ConfigError> {
		let base_url = Url::parse(self.mia_api_url.trim())
			.map_err(|_| ConfigError::InvalidBaseUrl { url: self.mia_api_url.clone() })?;

		Ok(Credentials::new(base_url, &self.mia_username, self.mia_password.clone())?
			.with_public_key(self.public_key_pem()?))
	}

	/// Builds the signal verifier from the configured key and claim policy.
	pub fn signal_verifier(&self, credentials: &Credentials) -> Result<SignalVerifier, ConfigError> {
		let pem = credentials.public_key.as_deref().ok_or(ConfigError::MissingPublicKey)?;

		SignalVerifier::from_rsa_pem(pem, &self.signal_policy())
	}
}
impl Debug for RelayConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RelayConfig")
			.field("mia_api_url", &self.mia_api_url)
			.field("mia_username", &self.mia_username)
			.field("port", &self.port)
			.field("public_key_set", &self.public_key.is_some())
			.field("public_key_path", &self.public_key_path)
			.field("timeout_secs", &self.timeout_secs)
			.field("signal_issuer", &self.signal_issuer)
			.field("signal_require_exp", &self.signal_require_exp)
			.field("token_single_flight", &self.token_single_flight)
			.finish()
	}
}

/// Loads the `.env`-formatted file at `path` into the process environment.
///
/// Returns `false` when the file does not exist. Existing variables are never overwritten.
pub fn load_env_file(path: &Path) -> Result<bool, ConfigError> {
	match dotenvy::from_path(path) {
		Ok(()) => Ok(true),
		Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(false),
		Err(source) => Err(ConfigError::EnvFile { path: path.display().to_string(), source }),
	}
}

/// Turns escaped `\n` sequences (common in single-line env values) into real newlines.
pub fn normalize_pem(raw: &str) -> String {
	raw.trim().replace("\\n", "\n")
}
