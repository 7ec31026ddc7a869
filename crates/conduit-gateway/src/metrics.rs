// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; nothing is exported unless the embedding
//! process installs a recorder.

use metrics::describe_counter;

/// Register all gateway metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        "conduit_receive_total",
        "Inbound webhook requests by channel type and outcome"
    );
    describe_counter!(
        "conduit_status_unresolved_total",
        "Status updates whose external id matched no sent message"
    );
}

/// Record one handled inbound request.
pub fn record_receive(channel_type: &str, outcome: &'static str) {
    metrics::counter!(
        "conduit_receive_total",
        "channel_type" => channel_type.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a status update that could not be resolved.
pub fn record_status_unresolved(channel_type: &str) {
    metrics::counter!("conduit_status_unresolved_total", "channel_type" => channel_type.to_string())
        .increment(1);
}
