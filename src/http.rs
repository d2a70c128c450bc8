//! Outbound transport for provider calls.
//!
//! Every provider request goes through [`ReqwestHttpClient::send`], which enforces the
//! configured deadline and buffers the body into a [`ProviderResponse`] so callers can
//! classify failures with the status and payload in hand.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use reqwest::{RequestBuilder, StatusCode, redirect::Policy};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Deadline applied to every outbound provider call unless configured otherwise.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Provider endpoints return results directly, so redirects are never followed.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Builds a client that aborts any request exceeding `timeout`.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Sends a prepared request and buffers the response.
	pub async fn send(&self, request: RequestBuilder) -> Result<ProviderResponse, TransportError> {
		let response = request.send().await?;
		let status = response.status();
		let body = response.bytes().await?.to_vec();

		Ok(ProviderResponse { status, body })
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Buffered provider response.
#[derive(Clone, Debug)]
pub struct ProviderResponse {
	/// HTTP status returned by the provider.
	pub status: StatusCode,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ProviderResponse {
	/// Returns `true` for any 2xx status.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Deserializes the body, reporting the failing JSON path on error.
	pub fn json<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
	}

	/// Lossy UTF-8 view of the body.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Body as JSON when it parses, otherwise as a JSON string of the raw text.
	pub fn body_value(&self) -> serde_json::Value {
		serde_json::from_slice(&self.body).unwrap_or_else(|_| serde_json::Value::String(self.text()))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> ProviderResponse {
		ProviderResponse {
			status: StatusCode::from_u16(status).expect("Fixture status should be valid."),
			body: body.as_bytes().to_vec(),
		}
	}

	#[test]
	fn body_value_prefers_json() {
		let parsed = response(400, "{\"code\":\"E1\"}").body_value();

		assert_eq!(parsed, serde_json::json!({"code": "E1"}));

		let raw = response(502, "Bad Gateway").body_value();

		assert_eq!(raw, serde_json::Value::String("Bad Gateway".into()));
	}

	#[test]
	fn json_reports_failing_path() {
		#[derive(Debug, Deserialize)]
		struct Payload {
			#[allow(dead_code)]
			inner: Inner,
		}
		#[derive(Debug, Deserialize)]
		struct Inner {
			#[allow(dead_code)]
			value: u32,
		}

		let err = response(200, "{\"inner\":{\"value\":\"nope\"}}")
			.json::<Payload>()
			.expect_err("String into u32 must fail.");

		assert_eq!(err.path().to_string(), "inner.value");
	}

	#[test]
	fn builds_client_with_timeout() {
		ReqwestHttpClient::with_timeout(DEFAULT_TIMEOUT).expect("Client should build.");
	}
}
