//! Process-wide access-token ownership.
//!
//! [`TokenManager`] is the single owner of the cached [`TokenRecord`]. Handlers reach it
//! through shared state and call [`TokenManager::access_token`], which serves the cached
//! token while `now < expires_at` and otherwise performs a password grant. Expiry is
//! checked on every read; nothing is cleared by a background timer.
//!
//! Concurrent callers that observe an empty cache either share one exchange
//! ([`FlightPolicy::SingleFlight`]) or each run their own and overwrite the state in
//! completion order ([`FlightPolicy::Independent`]).

mod password;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenRecord, TokenSecret},
	http::ReqwestHttpClient,
};

/// How concurrent cache misses are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlightPolicy {
	/// Callers queue behind one in-flight exchange and reuse its result.
	#[default]
	SingleFlight,
	/// Every caller that sees an empty cache exchanges credentials itself.
	Independent,
}

/// Owner of the cached identity token.
pub struct TokenManager {
	credentials: Arc<Credentials>,
	http_client: ReqwestHttpClient,
	policy: FlightPolicy,
	state: RwLock<Option<TokenRecord>>,
	flight: AsyncMutex<()>,
	exchanges: AtomicU64,
}
impl TokenManager {
	/// Creates an empty manager for the provided identity.
	pub fn new(credentials: Arc<Credentials>, http_client: ReqwestHttpClient) -> Self {
		Self {
			credentials,
			http_client,
			policy: FlightPolicy::default(),
			state: RwLock::new(None),
			flight: AsyncMutex::new(()),
			exchanges: AtomicU64::new(0),
		}
	}

	/// Overrides the concurrency policy (defaults to [`FlightPolicy::SingleFlight`]).
	pub fn with_flight_policy(mut self, policy: FlightPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Identity used for exchanges.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Active concurrency policy.
	pub fn flight_policy(&self) -> FlightPolicy {
		self.policy
	}

	/// Returns a valid access token, exchanging credentials on a cache miss.
	///
	/// Failures leave the cached state untouched and surface as [`Error::Auth`].
	pub async fn access_token(&self) -> Result<TokenSecret> {
		if let Some(token) = self.cached() {
			return Ok(token);
		}

		match self.policy {
			FlightPolicy::SingleFlight => {
				let _singleflight = self.flight.lock().await;

				if let Some(token) = self.cached() {
					return Ok(token);
				}

				self.acquire().await
			},
			FlightPolicy::Independent => self.acquire().await,
		}
	}

	/// Returns the cached token if it is still valid now.
	pub fn cached(&self) -> Option<TokenSecret> {
		self.cached_at(OffsetDateTime::now_utc())
	}

	/// Returns the cached token if it is valid at `instant`, dropping it once expired.
	pub fn cached_at(&self, instant: OffsetDateTime) -> Option<TokenSecret> {
		{
			let state = self.state.read();

			match state.as_ref() {
				Some(record) if !record.is_expired_at(instant) =>
					return Some(record.access_token.clone()),
				None => return None,
				Some(_) => {},
			}
		}

		let mut state = self.state.write();

		if state.as_ref().is_some_and(|record| record.is_expired_at(instant)) {
			*state = None;

			tracing::debug!("Cached access token expired.");
		}

		None
	}

	/// Clone of the current record, valid or not.
	pub fn snapshot(&self) -> Option<TokenRecord> {
		self.state.read().clone()
	}

	/// Clears the cache, returning the dropped record.
	pub fn invalidate(&self) -> Option<TokenRecord> {
		self.state.write().take()
	}

	/// Number of password-grant exchanges started since construction.
	pub fn exchange_count(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	async fn acquire(&self) -> Result<TokenSecret> {
		let record = self.exchange_password().await?;
		let token = record.access_token.clone();

		*self.state.write() = Some(record);

		Ok(token)
	}
}
impl Debug for TokenManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("credentials", &self.credentials)
			.field("policy", &self.policy)
			.field("state", &*self.state.read())
			.field("exchanges", &self.exchange_count())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn manager() -> TokenManager {
		let base = Url::parse("https://mia.invalid").expect("Fixture URL should parse.");
		let credentials =
			Credentials::new(base, "svc", "pw").expect("Fixture credentials should be valid.");
		let client = ReqwestHttpClient::with_client(ReqwestClient::new());

		TokenManager::new(Arc::new(credentials), client)
	}

	fn seed(manager: &TokenManager, expires_at: OffsetDateTime) {
		let issued_at = macros::datetime!(2025-01-01 00:00 UTC);
		let record = TokenRecord::issued(
			"seeded",
			Some("seeded-refresh".into()),
			issued_at,
			expires_at - issued_at,
		)
		.expect("Seed record should build.");

		*manager.state.write() = Some(record);
	}

	#[test]
	fn cached_serves_until_expiry_then_empties() {
		let manager = manager();

		seed(&manager, macros::datetime!(2025-01-01 01:00 UTC));

		let hit = manager.cached_at(macros::datetime!(2025-01-01 00:59 UTC));

		assert_eq!(hit.as_ref().map(TokenSecret::expose), Some("seeded"));
		assert!(manager.cached_at(macros::datetime!(2025-01-01 01:00 UTC)).is_none());
		assert!(manager.snapshot().is_none(), "Expired record must be dropped on read.");
	}

	#[test]
	fn invalidate_returns_previous_record() {
		let manager = manager();

		assert!(manager.invalidate().is_none());

		seed(&manager, OffsetDateTime::now_utc() + Duration::HOUR);

		let dropped = manager.invalidate().expect("Seeded record should be returned.");

		assert_eq!(dropped.access_token.expose(), "seeded");
		assert!(manager.cached().is_none());
	}

	#[test]
	fn defaults_to_single_flight() {
		let manager = manager();

		assert_eq!(manager.flight_policy(), FlightPolicy::SingleFlight);
		assert_eq!(
			manager.with_flight_policy(FlightPolicy::Independent).flight_policy(),
			FlightPolicy::Independent
		);
	}

	#[tokio::test]
	async fn cached_token_skips_exchange() {
		let manager = manager();

		seed(&manager, OffsetDateTime::now_utc() + Duration::HOUR);

		let token = manager.access_token().await.expect("Cached token should be served.");

		assert_eq!(token.expose(), "seeded");
		assert_eq!(manager.exchange_count(), 0);
	}
}
