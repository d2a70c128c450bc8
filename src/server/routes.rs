// crates.io
use axum::{
	Extension, Json,
	body::Bytes,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
};
// self
use crate::{
	_prelude::*,
	qr::{GenerateQrRequest, QrCreated},
	server::{AppState, BearerToken},
};

pub(super) async fn generate_qr(
	State(state): State<AppState>,
	Extension(BearerToken(bearer)): Extension<BearerToken>,
	request: Result<Json<GenerateQrRequest>, JsonRejection>,
) -> Result<Json<QrCreated>> {
	let Json(request) = request?;

	Ok(Json(state.qr.generate(&bearer, request).await?))
}

pub(super) async fn receive_signal(State(state): State<AppState>, body: Bytes) -> Result<StatusCode> {
	let signal = state.verifier.verify_bytes(&body)?;

	state.sink.accept(signal).await;

	Ok(StatusCode::OK)
}
