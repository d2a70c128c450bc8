mod common;

// crates.io
use jsonwebtoken::errors::ErrorKind;
// self
use common::{OTHER_PRIVATE_PEM, SIGNAL_PRIVATE_PEM, payment_claims, sign_hs256, sign_rs256, verifier};
use mia_relay::{
	_preludet::*,
	error::SignatureError,
	signal::{Signal, SignalPolicy},
};

fn now_secs() -> i64 {
	OffsetDateTime::now_utc().unix_timestamp()
}

fn jwt_kind(err: SignatureError) -> ErrorKind {
	match err {
		SignatureError::Jwt(inner) => inner.into_kind(),
		other => panic!("Expected a JWT error, got {other:?}"),
	}
}

#[test]
fn valid_signal_decodes_exactly() {
	let claims = payment_claims();
	let token = sign_rs256(&claims, SIGNAL_PRIVATE_PEM);
	let signal = verifier(&SignalPolicy::default())
		.verify(&token)
		.expect("Correctly signed signal should verify.");
	let expected: Signal =
		serde_json::from_value(claims.clone()).expect("Fixture claims should decode into a Signal.");

	assert_eq!(signal, expected);
	assert_eq!(signal.signal_code.as_deref(), Some("PAY"));
	assert_eq!(signal.qr_header_uuid.as_deref(), Some("abc"));
	assert_eq!(signal.qr_extension_uuid.as_deref(), Some("def"));
	assert_eq!(signal.payment.as_ref(), claims.get("payment"));
	assert_eq!(serde_json::to_value(&signal).expect("Signal should serialize."), claims);
}

#[test]
fn surrounding_whitespace_is_ignored() {
	let token = sign_rs256(&payment_claims(), SIGNAL_PRIVATE_PEM);

	verifier(&SignalPolicy::default())
		.verify(&format!("\n  {token}\r\n"))
		.expect("Trailing newlines from HTTP clients should be tolerated.");
}

#[test]
fn foreign_signature_is_rejected() {
	let token = sign_rs256(&payment_claims(), OTHER_PRIVATE_PEM);
	let err = verifier(&SignalPolicy::default())
		.verify(&token)
		.expect_err("Signature from another key must be rejected.");

	assert_eq!(jwt_kind(err), ErrorKind::InvalidSignature);
}

#[test]
fn non_rs256_algorithm_is_rejected() {
	let token = sign_hs256(&payment_claims(), b"shared-secret");
	let err = verifier(&SignalPolicy::default())
		.verify(&token)
		.expect_err("HS256 tokens must be rejected.");

	assert_eq!(jwt_kind(err), ErrorKind::InvalidAlgorithm);
}

#[test]
fn tampered_payload_is_rejected() {
	let token = sign_rs256(&payment_claims(), SIGNAL_PRIVATE_PEM);
	let mut parts = token.split('.').map(str::to_owned).collect::<Vec<_>>();
	let forged = sign_rs256(
		&serde_json::json!({ "signalCode": "PAY", "qrHeaderUUID": "zzz" }),
		SIGNAL_PRIVATE_PEM,
	);

	parts[1] = forged.split('.').nth(1).expect("Forged token should have a payload.").to_owned();

	let err = verifier(&SignalPolicy::default())
		.verify(&parts.join("."))
		.expect_err("Swapped payload must break the signature.");

	assert_eq!(jwt_kind(err), ErrorKind::InvalidSignature);
}

#[test]
fn malformed_tokens_are_rejected() {
	let verifier = verifier(&SignalPolicy::default());

	assert!(matches!(verifier.verify(""), Err(SignatureError::Empty)));
	assert!(matches!(verifier.verify("   \n"), Err(SignatureError::Empty)));

	for garbage in ["not-a-jwt", "a.b", "a.b.c", "{\"signalCode\":\"PAY\"}"] {
		assert!(
			matches!(verifier.verify(garbage), Err(SignatureError::Jwt(_))),
			"{garbage} should be rejected."
		);
	}
}

#[test]
fn signed_payload_without_signal_fields_is_accepted() {
	let token = sign_rs256(&serde_json::json!({ "payment": { "sum": 5 } }), SIGNAL_PRIVATE_PEM);
	let signal = verifier(&SignalPolicy::default())
		.verify(&token)
		.expect("Signature alone decides acceptance.");

	assert!(signal.signal_code.is_none());
	assert!(signal.qr_header_uuid.is_none());
	assert_eq!(signal.payment, Some(serde_json::json!({ "sum": 5 })));
}

#[test]
fn signed_payload_that_is_not_an_object_is_rejected() {
	let token = sign_rs256(&serde_json::json!("PAY"), SIGNAL_PRIVATE_PEM);

	assert!(matches!(
		verifier(&SignalPolicy::default()).verify(&token),
		Err(SignatureError::Jwt(_))
	));
}

#[test]
fn non_utf8_body_is_rejected() {
	let token = sign_rs256(&payment_claims(), SIGNAL_PRIVATE_PEM);
	let mut body = token.into_bytes();

	body.push(0xff);

	assert!(matches!(
		verifier(&SignalPolicy::default()).verify_bytes(&body),
		Err(SignatureError::NotUtf8(_))
	));
}

#[test]
fn expired_signal_is_rejected_when_exp_present() {
	let mut claims = payment_claims();

	claims["exp"] = serde_json::json!(now_secs() - 3_600);

	let err = verifier(&SignalPolicy::default())
		.verify(&sign_rs256(&claims, SIGNAL_PRIVATE_PEM))
		.expect_err("Expired signal must be rejected.");

	assert_eq!(jwt_kind(err), ErrorKind::ExpiredSignature);
}

#[test]
fn require_exp_rejects_signals_without_expiry() {
	let policy = SignalPolicy { require_exp: true, ..Default::default() };
	let verifier = verifier(&policy);
	let err = verifier
		.verify(&sign_rs256(&payment_claims(), SIGNAL_PRIVATE_PEM))
		.expect_err("Missing exp must be rejected under a strict policy.");

	assert!(matches!(jwt_kind(err), ErrorKind::MissingRequiredClaim(claim) if claim == "exp"));

	let mut claims = payment_claims();

	claims["exp"] = serde_json::json!(now_secs() + 600);

	verifier
		.verify(&sign_rs256(&claims, SIGNAL_PRIVATE_PEM))
		.expect("Signal with a future exp should verify.");
}

#[test]
fn issuer_policy_is_enforced() {
	let policy = SignalPolicy { issuer: Some("mia-ips".into()), ..Default::default() };
	let verifier = verifier(&policy);
	let mut claims = payment_claims();

	assert!(verifier.verify(&sign_rs256(&claims, SIGNAL_PRIVATE_PEM)).is_err());

	claims["iss"] = serde_json::json!("someone-else");

	let err = verifier
		.verify(&sign_rs256(&claims, SIGNAL_PRIVATE_PEM))
		.expect_err("Wrong issuer must be rejected.");

	assert_eq!(jwt_kind(err), ErrorKind::InvalidIssuer);

	claims["iss"] = serde_json::json!("mia-ips");

	verifier
		.verify(&sign_rs256(&claims, SIGNAL_PRIVATE_PEM))
		.expect("Matching issuer should verify.");
}
