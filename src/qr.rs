//! Payment-QR creation passthrough.
//!
//! The merchant payload is reshaped into the provider's dynamic e-commerce QR schema with a
//! fixed 30 minute TTL. Every field is forwarded as received JSON, whatever its type; the
//! provider owns validation.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	error::UpstreamError,
	http::ReqwestHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Lifetime of every generated QR, in [`QR_TTL_UNITS`].
pub const QR_TTL_LENGTH: u32 = 30;
/// Unit of [`QR_TTL_LENGTH`] (minutes).
pub const QR_TTL_UNITS: &str = "mm";

/// Simplified merchant payload accepted by `POST /api/generate-qr`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrRequest {
	/// Amount to charge, forwarded verbatim as `extension.amount.sum`.
	pub amount: Option<Value>,
	/// ISO currency code, e.g. `MDL`.
	pub currency: Option<Value>,
	/// Creditor IBAN.
	pub iban: Option<Value>,
	/// Merchant "doing business as" name.
	pub dba: Option<Value>,
	/// Text shown to the payer.
	pub remittance_info: Option<Value>,
}

/// Provider payment-QR creation body sent to `{baseURL}/api/v1/qr`.
#[derive(Clone, Debug, Serialize)]
pub struct QrCreateRequest {
	/// Fixed QR classification.
	pub header: QrHeader,
	/// Merchant-specific fields.
	pub extension: QrExtension,
}
impl From<GenerateQrRequest> for QrCreateRequest {
	fn from(request: GenerateQrRequest) -> Self {
		Self {
			header: QrHeader::default(),
			extension: QrExtension {
				creditor_account: CreditorAccount { iban: request.iban },
				amount: QrAmount { sum: request.amount, currency: request.currency },
				dba: request.dba,
				remittance_info_for_payer: request.remittance_info,
				ttl: QrTtl::default(),
			},
		}
	}
}

/// `header` block of [`QrCreateRequest`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrHeader {
	/// Always `DYNM`.
	pub qr_type: &'static str,
	/// Always `Fixed`.
	pub amount_type: &'static str,
	/// Always `e` (e-commerce).
	pub pmt_context: &'static str,
}
impl Default for QrHeader {
	fn default() -> Self {
		Self { qr_type: "DYNM", amount_type: "Fixed", pmt_context: "e" }
	}
}

/// `extension` block of [`QrCreateRequest`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrExtension {
	/// Account receiving the payment.
	pub creditor_account: CreditorAccount,
	/// Amount and currency.
	pub amount: QrAmount,
	/// Merchant display name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dba: Option<Value>,
	/// Text shown to the payer.
	#[serde(rename = "remittanceInfo4Payer", skip_serializing_if = "Option::is_none")]
	pub remittance_info_for_payer: Option<Value>,
	/// QR lifetime.
	pub ttl: QrTtl,
}

/// Creditor account reference.
#[derive(Clone, Debug, Serialize)]
pub struct CreditorAccount {
	/// Creditor IBAN.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub iban: Option<Value>,
}

/// Amount block.
#[derive(Clone, Debug, Serialize)]
pub struct QrAmount {
	/// Amount to charge.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sum: Option<Value>,
	/// ISO currency code.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub currency: Option<Value>,
}

/// QR time-to-live.
#[derive(Clone, Debug, Serialize)]
pub struct QrTtl {
	/// Lifetime length.
	pub length: u32,
	/// Lifetime unit.
	pub units: &'static str,
}
impl Default for QrTtl {
	fn default() -> Self {
		Self { length: QR_TTL_LENGTH, units: QR_TTL_UNITS }
	}
}

/// Fields copied from the provider response back to the merchant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCreated {
	/// Provider identifier of the QR header.
	#[serde(rename = "qrHeaderUUID", default, skip_serializing_if = "Option::is_none")]
	pub qr_header_uuid: Option<String>,
	/// QR payload as text.
	#[serde(rename = "qrAsText", default, skip_serializing_if = "Option::is_none")]
	pub qr_as_text: Option<String>,
	/// QR rendered as an image (base64).
	#[serde(rename = "qrAsImage", default, skip_serializing_if = "Option::is_none")]
	pub qr_as_image: Option<String>,
}

/// Client for the provider's QR creation endpoint.
#[derive(Clone, Debug)]
pub struct QrClient {
	credentials: Arc<Credentials>,
	http_client: ReqwestHttpClient,
}
impl QrClient {
	/// Creates a client targeting the provider behind `credentials`.
	pub fn new(credentials: Arc<Credentials>, http_client: ReqwestHttpClient) -> Self {
		Self { credentials, http_client }
	}

	/// Forwards `request` with `bearer` and returns the provider's QR identifiers.
	pub async fn generate(
		&self,
		bearer: &TokenSecret,
		request: GenerateQrRequest,
	) -> Result<QrCreated, UpstreamError> {
		const KIND: FlowKind = FlowKind::QrGenerate;

		let span = FlowSpan::new(KIND, "generate");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result: Result<QrCreated, UpstreamError> = span
			.instrument(async move {
				let body = QrCreateRequest::from(request);
				let outbound = self
					.http_client
					.post(self.credentials.qr_endpoint().clone())
					.bearer_auth(bearer.expose())
					.json(&body);
				let response =
					self.http_client.send(outbound).await.map_err(UpstreamError::Transport)?;

				if !response.is_success() {
					return Err(UpstreamError::Status {
						status: response.status.as_u16(),
						body: response.body_value(),
					});
				}

				response.json::<QrCreated>().map_err(|source| UpstreamError::ResponseParse { source })
			})
			.await;

		match &result {
			Ok(created) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				tracing::info!(qr_header_uuid = ?created.qr_header_uuid, "QR generated.");
			},
			Err(e) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);

				tracing::warn!(error = %e, "QR generation failed.");
			},
		}

		result
	}
}
