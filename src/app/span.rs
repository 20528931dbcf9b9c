//! Span helpers. `child_span!` opens an `info`-level span nested under
//! whatever span is current, so per-auction tracing stays attributable
//! to the inbound request span without every task needing to thread one
//! through explicitly.

#[macro_export]
macro_rules! child_span {
    ($name:expr) => {
        tracing::info_span!(parent: tracing::Span::current(), $name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!(parent: tracing::Span::current(), $name, $($field)*)
    };
}
