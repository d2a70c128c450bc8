//! Password-grant exchange against `{baseURL}/api/identity/token`.

// std
use std::sync::atomic::Ordering;
// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	error::AuthError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::TokenManager,
};

/// Identity endpoint success payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct IdentityTokenResponse {
	access_token: Option<String>,
	refresh_token: Option<String>,
	expires_in: Option<i64>,
}
impl IdentityTokenResponse {
	pub(super) fn into_record(self, issued_at: OffsetDateTime) -> Result<TokenRecord, AuthError> {
		let access_token = self
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or(AuthError::InvalidResponse { reason: "accessToken is missing" })?;
		let expires_in =
			self.expires_in.ok_or(AuthError::InvalidResponse { reason: "expiresIn is missing" })?;

		if expires_in <= 0 {
			return Err(AuthError::InvalidResponse { reason: "expiresIn must be positive" });
		}

		TokenRecord::issued(access_token, self.refresh_token, issued_at, Duration::seconds(expires_in))
			.ok_or(AuthError::InvalidResponse { reason: "expiresIn exceeds the supported range" })
	}
}

impl TokenManager {
	/// Performs `grant_type=password` and returns the resulting record without caching it.
	pub(super) async fn exchange_password(&self) -> Result<TokenRecord> {
		const KIND: FlowKind = FlowKind::PasswordGrant;

		let span = FlowSpan::new(KIND, "exchange_password");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.exchanges.fetch_add(1, Ordering::Relaxed);

		let result: Result<TokenRecord> = span
			.instrument(async move {
				let credentials = &self.credentials;
				let form = [
					("grant_type", "password"),
					("username", credentials.username.as_str()),
					("password", credentials.password.expose()),
				];
				let request =
					self.http_client.post(credentials.identity_endpoint().clone()).form(&form);
				let response =
					self.http_client.send(request).await.map_err(AuthError::Transport)?;
				let status = response.status.as_u16();

				if !response.is_success() {
					return Err(AuthError::Rejected { status, body: response.text() }.into());
				}

				let payload = response
					.json::<IdentityTokenResponse>()
					.map_err(|source| AuthError::ResponseParse { source, status })?;

				Ok(payload.into_record(OffsetDateTime::now_utc())?)
			})
			.await;

		match &result {
			Ok(record) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				tracing::info!(expires_at = %record.expires_at, "Identity token acquired.");
			},
			Err(e) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);

				tracing::error!(error = %e, "Identity token exchange failed.");
			},
		}

		result
	}
}
