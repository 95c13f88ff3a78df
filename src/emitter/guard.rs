//! Identifier quoting and the read-only statement guard
//!
//! Field names and aliases are structural SQL, not data, so they cannot be
//! bound as parameters. Every identifier the emitter writes goes through
//! [`quote_ident`]; every defining query goes through
//! [`ensure_select_only`] before it is embedded.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::AggregationError;

/// Statement keywords that may not appear anywhere in a dataset query
pub const FORBIDDEN_KEYWORDS: [&str; 12] = [
    "insert", "update", "delete", "create", "alter", "drop",
    "grant", "revoke", "truncate", "merge", "call", "execute",
];

static FORBIDDEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b({})\b", FORBIDDEN_KEYWORDS.join("|"))).expect("valid keyword regex")
});

static LEADING_SELECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^select\b").expect("valid select regex")
});

/// Double-quote an identifier, doubling embedded quotes.
///
/// Guards against malformed identifiers breaking out of identifier
/// position; it is not a general injection defense.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quote a string literal, doubling embedded quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Check that `sql` is exactly one read-only `SELECT` statement.
///
/// Returns the statement trimmed and without its trailing semicolon, ready
/// to embed as a derived table.
pub fn ensure_select_only(sql: &str) -> Result<&str, AggregationError> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(AggregationError::only_select("query is empty"));
    }

    let mut segments = trimmed.split(';');
    let statement = segments.next().unwrap_or_default().trim();
    if segments.any(|rest| !rest.trim().is_empty()) {
        return Err(AggregationError::only_select("multiple statements are not allowed"));
    }

    let lower = statement.to_lowercase();
    if !LEADING_SELECT.is_match(&lower) {
        return Err(AggregationError::only_select("query must start with SELECT"));
    }

    if let Some(found) = FORBIDDEN.find(&lower) {
        return Err(AggregationError::only_select(format!(
            "forbidden keyword '{}'",
            found.as_str()
        )));
    }

    Ok(statement)
}
