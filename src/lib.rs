//! Merchant-side relay for the MIA instant-payment QR API: cached password-grant tokens,
//! a QR-generation passthrough, and RS256-verified payment signals behind one axum router.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod qr;
pub mod server;
pub mod signal;
pub mod token;

#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::Credentials,
		http::ReqwestHttpClient,
		token::{FlightPolicy, TokenManager},
	};

	/// Username used by test credentials.
	pub const TEST_USERNAME: &str = "merchant-svc";
	/// Password used by test credentials.
	pub const TEST_PASSWORD: &str = "s3cret";

	/// Builds credentials that point at a mock provider base URL.
	pub fn test_credentials(base_url: &str) -> Credentials {
		let base_url = Url::parse(base_url).expect("Mock provider base URL should parse.");

		Credentials::new(base_url, TEST_USERNAME, TEST_PASSWORD)
			.expect("Test credentials should be valid.")
	}

	/// Builds a reqwest client with a short timeout suitable for tests.
	pub fn test_http_client() -> ReqwestHttpClient {
		ReqwestHttpClient::with_timeout(std::time::Duration::from_secs(5))
			.expect("Failed to build Reqwest client for tests.")
	}

	/// Constructs a [`TokenManager`] against the provided mock base URL.
	pub fn build_test_token_manager(base_url: &str, policy: FlightPolicy) -> Arc<TokenManager> {
		Arc::new(
			TokenManager::new(Arc::new(test_credentials(base_url)), test_http_client())
				.with_flight_policy(policy),
		)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use jsonwebtoken;
pub use reqwest;
pub use url;

use {color_eyre as _, tracing_subscriber as _};
#[cfg(test)] use {httpmock as _, tower as _};
