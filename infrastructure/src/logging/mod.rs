//! Logging infrastructure: structured execution event log.
//!
//! Provides [`JsonlEventSink`], a JSONL file writer that implements the
//! [`ExecutionEventSink`](opsplane_application::ExecutionEventSink) port.

mod jsonl_event_sink;

pub use jsonl_event_sink::JsonlEventSink;
