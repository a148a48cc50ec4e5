/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field automatically so callers never need to
/// remember the string literal.  Domains in use: `sys` (run lifecycle),
/// `pipe` (per-file and per-record processing), `res` (positions store and
/// sinks), `conf` (configuration).
///
/// # Usage
///
/// ```ignore
/// use crate::log_macros::*;
///
/// tm_info!(sys, files = 3, "ingest run complete");
/// tm_warn!(pipe, row = 7, error = %issue, "record degraded");
/// tm_debug!(res, path = %path.display(), "positions loaded");
/// ```
///
/// The macros accept any tracing-compatible field syntax after the domain
/// identifier.  The domain identifier is **not** a string; it is a bare
/// identifier that the macro converts to a `&str` literal.

// ---------------------------------------------------------------------------
// Core macro: dispatches to the matching tracing level macro.
// ---------------------------------------------------------------------------

/// Internal helper.  Do not call directly; use `tm_error!` … `tm_trace!`.
#[doc(hidden)]
macro_rules! tm_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

// ---------------------------------------------------------------------------
// Public per-level macros
// ---------------------------------------------------------------------------

/// Log at ERROR level with an automatic `domain` field.
macro_rules! tm_error {
    ($domain:ident, $($rest:tt)*) => {
        tm_log!(error, $domain, $($rest)*)
    };
}

/// Log at WARN level with an automatic `domain` field.
///
/// ```ignore
/// tm_warn!(pipe, stream = %name, error = %issue, "couldn't parse time");
/// ```
macro_rules! tm_warn {
    ($domain:ident, $($rest:tt)*) => {
        tm_log!(warn, $domain, $($rest)*)
    };
}

/// Log at INFO level with an automatic `domain` field.
macro_rules! tm_info {
    ($domain:ident, $($rest:tt)*) => {
        tm_log!(info, $domain, $($rest)*)
    };
}

/// Log at DEBUG level with an automatic `domain` field.
///
/// ```ignore
/// tm_debug!(pipe, stream = %name, row = 3, "skipped record with no values");
/// ```
macro_rules! tm_debug {
    ($domain:ident, $($rest:tt)*) => {
        tm_log!(debug, $domain, $($rest)*)
    };
}

/// Log at TRACE level with an automatic `domain` field.
macro_rules! tm_trace {
    ($domain:ident, $($rest:tt)*) => {
        tm_log!(trace, $domain, $($rest)*)
    };
}
