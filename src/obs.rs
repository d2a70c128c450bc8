//! Flow spans and counters.
//!
//! Each provider call and signal check runs inside a `mia_relay.flow` span carrying `flow` and
//! `stage` fields. With the `metrics` feature on, `mia_relay_flow_total` counts every step,
//! labeled by `flow` and `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

/// Flows observed by the relay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowKind {
	/// Password grant at the identity endpoint.
	PasswordGrant,
	/// QR creation passthrough.
	QrGenerate,
	/// Inbound signal check.
	SignalVerify,
}
impl FlowKind {
	/// Label used in span and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::PasswordGrant => "password_grant",
			Self::QrGenerate => "qr_generate",
			Self::SignalVerify => "signal_verify",
		}
	}
}

/// Step of a flow recorded by [`record_flow_outcome`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowOutcome {
	/// Flow entered.
	Attempt,
	/// Flow finished with a value.
	Success,
	/// Flow finished with an error.
	Failure,
}
impl FlowOutcome {
	/// Label used in metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Attempt => "attempt",
			Self::Success => "success",
			Self::Failure => "failure",
		}
	}
}
