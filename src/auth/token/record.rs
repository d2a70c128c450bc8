//! Cached identity token and its expiry arithmetic.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Token material issued by the identity endpoint.
#[derive(Clone)]
pub struct TokenRecord {
	/// Bearer presented to the provider; never log it.
	pub access_token: TokenSecret,
	/// Refresh token, kept but never used for renewal.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the relay received the token.
	pub issued_at: OffsetDateTime,
	/// `issued_at + expiresIn`.
	pub expires_at: OffsetDateTime,
}
impl TokenRecord {
	/// Builds a record that lives `lifetime` past `issued_at`.
	///
	/// Returns `None` when the expiry instant falls outside the representable range.
	pub fn issued(
		access_token: impl Into<String>,
		refresh_token: Option<String>,
		issued_at: OffsetDateTime,
		lifetime: Duration,
	) -> Option<Self> {
		let expires_at = issued_at.checked_add(lifetime)?;

		Some(Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: refresh_token.map(TokenSecret::new),
			issued_at,
			expires_at,
		})
	}

	/// Whether the record is expired at `instant`; the token is valid only while
	/// `instant < expires_at`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRecord")
			.field("access_token", &self.access_token)
			.field("has_refresh_token", &self.refresh_token.is_some())
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
