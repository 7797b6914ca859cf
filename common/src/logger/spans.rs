use tracing::{Level, Span};

use super::TraceId;

/// Create a root span for a run / batch / job
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::span!(
        Level::INFO,
        "root",
        name = %name,
        trace_id = %trace_id.as_str()
    )
}

/// Create a child span (inherits trace_id from the enclosing root span)
pub fn child_span(name: &'static str) -> Span {
    tracing::span!(Level::INFO, "child", name = %name)
}
