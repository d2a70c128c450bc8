//! Redacting wrapper for bearer tokens and the service password.

// self
use crate::_prelude::*;

const REDACTED: &str = "<redacted>";

/// Secret string that never reaches logs through `Debug` or `Display`.
///
/// The value is shared, so the clone handed to every relayed request costs one refcount bump.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(Arc<str>);
impl TokenSecret {
	/// Wraps `value`.
	pub fn new(value: impl Into<String>) -> Self {
		Self(Arc::from(value.into()))
	}

	/// Raw value, for request building only.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "TokenSecret({REDACTED})")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(REDACTED)
	}
}
