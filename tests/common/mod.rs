//! Fixtures shared by the integration suites.

#![allow(dead_code)]

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
// self
use mia_relay::{
	_preludet::*,
	http::ReqwestHttpClient,
	qr::QrClient,
	server::AppState,
	signal::{MemorySignalSink, SignalPolicy, SignalVerifier},
	token::{FlightPolicy, TokenManager},
};

/// Public half of the key the provider signs signals with.
pub const SIGNAL_PUBLIC_PEM: &[u8] = include_bytes!("../fixtures/signal_public.pem");
/// Private half used to mint test signals.
pub const SIGNAL_PRIVATE_PEM: &[u8] = include_bytes!("../fixtures/signal_private.pem");
/// Unrelated key used to forge signatures.
pub const OTHER_PRIVATE_PEM: &[u8] = include_bytes!("../fixtures/other_private.pem");

/// Signs `claims` with RS256 using `private_pem`.
pub fn sign_rs256(claims: &serde_json::Value, private_pem: &[u8]) -> String {
	let key = EncodingKey::from_rsa_pem(private_pem).expect("Fixture private key should load.");

	jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &key)
		.expect("Fixture claims should sign.")
}

/// Signs `claims` with HS256 under a shared secret.
pub fn sign_hs256(claims: &serde_json::Value, secret: &[u8]) -> String {
	jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret))
		.expect("Fixture claims should sign.")
}

/// Signal payload used across suites.
pub fn payment_claims() -> serde_json::Value {
	serde_json::json!({
		"signalCode": "PAY",
		"qrHeaderUUID": "abc",
		"qrExtensionUUID": "def",
		"payment": {
			"system": "IPS",
			"reference": "RRN-001",
			"amount": { "sum": 100, "currency": "MDL" }
		}
	})
}

/// Verifier bound to the fixture public key.
pub fn verifier(policy: &SignalPolicy) -> SignalVerifier {
	SignalVerifier::from_rsa_pem(SIGNAL_PUBLIC_PEM, policy).expect("Fixture public key should load.")
}

/// Full application state against a mock provider, recording signals in memory.
pub fn app_state(base_url: &str, policy: FlightPolicy) -> (AppState, MemorySignalSink) {
	app_state_with_client(base_url, policy, test_http_client())
}

/// Same as [`app_state`] but with a caller-supplied outbound client.
pub fn app_state_with_client(
	base_url: &str,
	policy: FlightPolicy,
	http_client: ReqwestHttpClient,
) -> (AppState, MemorySignalSink) {
	let credentials = Arc::new(test_credentials(base_url).with_public_key(SIGNAL_PUBLIC_PEM));
	let tokens =
		Arc::new(TokenManager::new(credentials.clone(), http_client.clone()).with_flight_policy(policy));
	let qr = Arc::new(QrClient::new(credentials, http_client));
	let sink = MemorySignalSink::default();
	let state = AppState::new(tokens, qr, Arc::new(verifier(&SignalPolicy::default())))
		.with_sink(Arc::new(sink.clone()));

	(state, sink)
}

/// Identity endpoint form body for the test credentials.
pub fn password_grant_body() -> String {
	format!("grant_type=password&username={TEST_USERNAME}&password={TEST_PASSWORD}")
}

/// Identity endpoint success body.
pub fn token_body(access: &str, expires_in: i64) -> serde_json::Value {
	serde_json::json!({ "accessToken": access, "refreshToken": format!("{access}-refresh"), "expiresIn": expires_in })
}
