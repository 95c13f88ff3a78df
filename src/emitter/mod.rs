//! SQL emitter (verb module)
//!
//! Transforms an AggregatePlan into a SQL string, and owns the quoting and
//! read-only checks every emitted statement relies on.

mod guard;
mod sql;

pub use guard::{ensure_select_only, quote_ident, quote_literal, FORBIDDEN_KEYWORDS};
pub use sql::{emit_preview_sql, emit_sql, BASE_ALIAS};
