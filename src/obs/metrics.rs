// self
use crate::obs::{FlowKind, FlowOutcome};

/// Name of the flow counter.
pub const FLOW_COUNTER: &str = "mia_relay_flow_total";

/// Counts one flow step; a no-op unless the `metrics` feature is enabled.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(FLOW_COUNTER, "flow" => kind.as_str(), "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}
