//! Relay-level error types shared across the token, QR, and signal pipelines.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Identity exchange failed; surfaced as 401.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// QR provider call failed; surfaced with the provider status when one exists.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Inbound signal failed verification; surfaced as 400.
	#[error(transparent)]
	Signature(#[from] SignatureError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Inbound body could not be read as JSON; surfaced with the rejection status.
	#[error(transparent)]
	Request(#[from] axum::extract::rejection::JsonRejection),
}

/// Failures raised while exchanging credentials at the identity endpoint.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Identity endpoint answered with a non-2xx status.
	#[error("Identity endpoint rejected the password grant with status {status}: {body}.")]
	Rejected {
		/// HTTP status code returned by the identity endpoint.
		status: u16,
		/// Provider error body, verbatim.
		body: String,
	},
	/// Identity endpoint could not be reached.
	#[error("Identity endpoint could not be reached.")]
	Transport(#[source] TransportError),
	/// Identity endpoint responded with JSON that could not be parsed.
	#[error("Identity endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Identity endpoint responded with a token payload that cannot be cached.
	#[error("Identity endpoint returned an unusable token: {reason}.")]
	InvalidResponse {
		/// Reason the payload was rejected.
		reason: &'static str,
	},
}

/// Failures raised while forwarding a QR-generation request.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// QR provider answered with a non-2xx status.
	#[error("QR provider responded with status {status}.")]
	Status {
		/// HTTP status code returned by the provider.
		status: u16,
		/// Provider body (JSON when parsable, otherwise the raw text).
		body: serde_json::Value,
	},
	/// QR provider could not be reached.
	#[error("QR provider could not be reached: {0}")]
	Transport(#[source] TransportError),
	/// QR provider responded with JSON that could not be parsed.
	#[error("QR provider returned malformed JSON: {source}")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Failures raised while verifying an inbound signal.
///
/// The variants are logged but never returned to the caller.
#[derive(Debug, ThisError)]
pub enum SignatureError {
	/// The request body carried no token.
	#[error("Signal body is empty.")]
	Empty,
	/// The request body is not UTF-8 text.
	#[error("Signal body is not UTF-8: {0}.")]
	NotUtf8(#[source] std::str::Utf8Error),
	/// Signature, algorithm, claims, or structure did not validate.
	#[error("Signal token failed verification: {0}.")]
	Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Configuration and validation failures raised at startup.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Provider base URL cannot be parsed or cannot carry paths.
	#[error("Provider base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Offending URL text.
		url: String,
	},
	/// Service username is empty.
	#[error("Service username must not be empty.")]
	EmptyUsername,
	/// `.env` file exists but could not be loaded.
	#[error("Env file `{path}` could not be loaded.")]
	EnvFile {
		/// Path that failed to load.
		path: String,
		/// Underlying parse or IO failure.
		#[source]
		source: dotenvy::Error,
	},
	/// Neither inline key material nor a key path was configured.
	#[error("No signal public key is configured; set PUBLIC_KEY or PUBLIC_KEY_PATH.")]
	MissingPublicKey,
	/// Public key file could not be read.
	#[error("Public key file `{path}` could not be read.")]
	PublicKeyRead {
		/// Path that failed to load.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Public key material is not a usable RSA PEM.
	#[error("Public key is not a valid RSA PEM.")]
	InvalidPublicKey {
		/// Underlying key parsing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, deadline).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete before the configured timeout.
	#[error("Provider call exceeded the configured timeout.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout { source: Box::new(e) } } else { Self::network(e) }
	}
}
