//! Inbound payment-status signals.
//!
//! The provider posts each signal as a bare RS256 JWT (the request body is the token).
//! [`SignalVerifier`] checks the signature against the configured public key and the claims
//! selected by [`SignalPolicy`], then hands the decoded [`Signal`] to a [`SignalSink`].
//! Rejection reasons are logged here and never reach the caller.

// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, SignatureError},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Boxed future returned by [`SignalSink::accept`].
pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Payment event carried by a verified signal.
///
/// Every field is optional; acceptance depends only on the signature and the claim policy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
	/// Event code, e.g. `Payment` or `Expiration`.
	#[serde(rename = "signalCode", default, skip_serializing_if = "Option::is_none")]
	pub signal_code: Option<String>,
	/// QR header the event belongs to.
	#[serde(rename = "qrHeaderUUID", default, skip_serializing_if = "Option::is_none")]
	pub qr_header_uuid: Option<String>,
	/// QR extension the event belongs to.
	#[serde(rename = "qrExtensionUUID", default, skip_serializing_if = "Option::is_none")]
	pub qr_extension_uuid: Option<String>,
	/// Provider payment details, passed through untouched.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub payment: Option<Value>,
}

/// Claims enforced on top of the RS256 signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalPolicy {
	/// Required `iss` value; `iss` becomes mandatory when set.
	pub issuer: Option<String>,
	/// Makes `exp` mandatory. `exp` and `nbf` are always checked when present.
	pub require_exp: bool,
	/// Clock skew tolerated for `exp`/`nbf`, in seconds.
	pub leeway_secs: u64,
}
impl Default for SignalPolicy {
	fn default() -> Self {
		Self { issuer: None, require_exp: false, leeway_secs: 60 }
	}
}
impl SignalPolicy {
	fn validation(&self) -> Validation {
		let mut validation = Validation::new(Algorithm::RS256);

		validation.leeway = self.leeway_secs;
		validation.validate_exp = true;
		validation.validate_nbf = true;
		validation.validate_aud = false;
		validation.required_spec_claims.clear();

		if self.require_exp {
			validation.required_spec_claims.insert("exp".into());
		}
		if let Some(issuer) = &self.issuer {
			validation.set_issuer(&[issuer]);
			validation.required_spec_claims.insert("iss".into());
		}

		validation
	}
}

/// Verifies signal tokens against one RSA public key.
#[derive(Clone)]
pub struct SignalVerifier {
	key: DecodingKey,
	validation: Validation,
}
impl SignalVerifier {
	/// Builds a verifier from a PEM-encoded RSA public key (`PUBLIC KEY` or `RSA PUBLIC KEY`).
	pub fn from_rsa_pem(pem: &[u8], policy: &SignalPolicy) -> Result<Self, ConfigError> {
		let key = DecodingKey::from_rsa_pem(pem)
			.map_err(|source| ConfigError::InvalidPublicKey { source })?;

		Ok(Self { key, validation: policy.validation() })
	}

	/// Verifies `token` and decodes its payload.
	pub fn verify(&self, token: &str) -> Result<Signal, SignatureError> {
		self.verify_bytes(token.as_bytes())
	}

	/// Verifies a raw request body; a body that is not UTF-8 is rejected like any bad token.
	pub fn verify_bytes(&self, body: &[u8]) -> Result<Signal, SignatureError> {
		const KIND: FlowKind = FlowKind::SignalVerify;

		let _span = FlowSpan::new(KIND, "verify").entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = self.decode(body);

		match &result {
			Ok(signal) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				tracing::debug!(signal_code = ?signal.signal_code, "Signal verified.");
			},
			Err(e) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);

				tracing::warn!(error = %e, "Signal rejected.");
			},
		}

		result
	}

	fn decode(&self, body: &[u8]) -> Result<Signal, SignatureError> {
		let token = std::str::from_utf8(body).map_err(SignatureError::NotUtf8)?.trim();

		if token.is_empty() {
			return Err(SignatureError::Empty);
		}

		let data = jsonwebtoken::decode::<Signal>(token, &self.key, &self.validation)?;

		Ok(data.claims)
	}
}
impl Debug for SignalVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignalVerifier")
			.field("algorithms", &self.validation.algorithms)
			.field("required_claims", &self.validation.required_spec_claims)
			.field("issuer", &self.validation.iss)
			.finish()
	}
}

/// Destination for verified signals.
pub trait SignalSink
where
	Self: Send + Sync,
{
	/// Handles one verified signal.
	fn accept(&self, signal: Signal) -> SinkFuture<'_>;
}

/// Sink that writes every signal to the application log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSignalSink;
impl SignalSink for LogSignalSink {
	fn accept(&self, signal: Signal) -> SinkFuture<'_> {
		Box::pin(async move {
			tracing::info!(
				signal_code = ?signal.signal_code,
				qr_header_uuid = ?signal.qr_header_uuid,
				qr_extension_uuid = ?signal.qr_extension_uuid,
				payment = ?signal.payment,
				"Signal received."
			);
		})
	}
}

/// Sink that keeps signals in memory for tests and local demos.
#[derive(Clone, Debug, Default)]
pub struct MemorySignalSink(Arc<Mutex<Vec<Signal>>>);
impl MemorySignalSink {
	/// Signals received so far, in arrival order.
	pub fn signals(&self) -> Vec<Signal> {
		self.0.lock().clone()
	}
}
impl SignalSink for MemorySignalSink {
	fn accept(&self, signal: Signal) -> SinkFuture<'_> {
		let signals = self.0.clone();

		Box::pin(async move { signals.lock().push(signal) })
	}
}
