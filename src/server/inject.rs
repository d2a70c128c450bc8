//! Bearer injection in front of every handler.

// crates.io
use axum::{
	extract::{Request, State},
	middleware::Next,
	response::{IntoResponse, Response},
};
// self
use crate::{auth::TokenSecret, server::AppState};

/// Access token attached to a request by the injector.
#[derive(Clone, Debug)]
pub struct BearerToken(pub TokenSecret);

pub(super) async fn inject_bearer(
	State(state): State<AppState>,
	mut request: Request,
	next: Next,
) -> Response {
	match state.tokens.access_token().await {
		Ok(token) => {
			request.extensions_mut().insert(BearerToken(token));

			next.run(request).await
		},
		Err(e) => {
			tracing::warn!(error = %e, path = %request.uri().path(), "Bearer injection failed.");

			e.into_response()
		},
	}
}
