//! HTTP surface: router, shared state, and error-to-response mapping.
//!
//! | Method | Path | Body in | Body out |
//! |---|---|---|---|
//! | POST | `/api/generate-qr` | merchant QR payload (JSON) | `{qrHeaderUUID, qrAsText, qrAsImage}` |
//! | POST | `/api/signals` | raw signed token | empty |
//!
//! Every route sits behind the bearer injector, so a failing identity exchange answers 401
//! before any handler runs.

mod inject;
mod routes;

pub use inject::BearerToken;

// crates.io
use axum::{
	Json, Router,
	http::StatusCode,
	middleware,
	response::{IntoResponse, Response},
	routing::post,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
// self
use crate::{
	_prelude::*,
	config::RelayConfig,
	error::{ConfigError, TransportError, UpstreamError},
	http::ReqwestHttpClient,
	qr::QrClient,
	signal::{LogSignalSink, SignalSink, SignalVerifier},
	token::TokenManager,
};

/// Body message returned when the identity exchange fails.
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";
/// Body message returned for any rejected signal.
pub const INVALID_SIGNAL_MESSAGE: &str = "Invalid signal JWT";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
	/// Owner of the cached identity token.
	pub tokens: Arc<TokenManager>,
	/// Provider QR client.
	pub qr: Arc<QrClient>,
	/// Signal verifier bound to the provider public key.
	pub verifier: Arc<SignalVerifier>,
	/// Destination for verified signals.
	pub sink: Arc<dyn SignalSink>,
}
impl AppState {
	/// Creates state that logs verified signals.
	pub fn new(tokens: Arc<TokenManager>, qr: Arc<QrClient>, verifier: Arc<SignalVerifier>) -> Self {
		Self { tokens, qr, verifier, sink: Arc::new(LogSignalSink) }
	}

	/// Replaces the signal sink.
	pub fn with_sink(mut self, sink: Arc<dyn SignalSink>) -> Self {
		self.sink = sink;

		self
	}

	/// Wires every component from configuration.
	pub fn from_config(config: &RelayConfig) -> Result<Self, ConfigError> {
		let credentials = Arc::new(config.credentials()?);
		let verifier = Arc::new(config.signal_verifier(&credentials)?);
		let http_client = ReqwestHttpClient::with_timeout(config.timeout())?;
		let tokens = Arc::new(
			TokenManager::new(credentials.clone(), http_client.clone())
				.with_flight_policy(config.flight_policy()),
		);
		let qr = Arc::new(QrClient::new(credentials, http_client));

		Ok(Self::new(tokens, qr, verifier))
	}
}
impl Debug for AppState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppState")
			.field("tokens", &self.tokens)
			.field("verifier", &self.verifier)
			.finish_non_exhaustive()
	}
}

/// Builds the relay router.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/api/generate-qr", post(routes::generate_qr))
		.route("/api/signals", post(routes::receive_signal))
		.layer(middleware::from_fn_with_state(state.clone(), inject::inject_bearer))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// Binds `config.listen_addr()` and serves until Ctrl-C.
pub async fn serve(config: &RelayConfig) -> Result<()> {
	let state = AppState::from_config(config)?;
	let listener = TcpListener::bind(config.listen_addr()).await.map_err(TransportError::Io)?;

	tracing::info!(addr = %config.listen_addr(), "Server running.");

	axum::serve(listener, router(state))
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(TransportError::Io)?;

	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "Failed to listen for shutdown signal.");

		std::future::pending::<()>().await;
	}

	tracing::info!("Shutting down.");
}

/// JSON error body: `{"error": ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
	/// Generic message or provider payload.
	pub error: serde_json::Value,
}
impl ErrorBody {
	fn message(message: impl Into<String>) -> Self {
		Self { error: serde_json::Value::String(message.into()) }
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let (status, body) = match self {
			Error::Auth(_) => (StatusCode::UNAUTHORIZED, ErrorBody::message(AUTH_FAILED_MESSAGE)),
			Error::Upstream(UpstreamError::Status { status, body }) => (
				StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
				ErrorBody { error: body },
			),
			Error::Upstream(e) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::message(e.to_string())),
			Error::Signature(_) => (StatusCode::BAD_REQUEST, ErrorBody::message(INVALID_SIGNAL_MESSAGE)),
			Error::Config(e) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::message(e.to_string())),
			Error::Transport(e) =>
				(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::message(e.to_string())),
			Error::Request(rejection) => (rejection.status(), ErrorBody::message(rejection.body_text())),
		};

		(status, Json(body)).into_response()
	}
}
