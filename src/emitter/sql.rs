//! SQL emitter
//!
//! Renders an [`AggregatePlan`] as one outer SELECT over the dataset's
//! defining query, embedded as the derived table `base`.

use serde_json::Value;

use crate::plan::{AggregatePlan, DimensionItem, MetricItem, Predicate, SelectItem};
use crate::model::Aggregation;
use crate::query::FilterOperator;
use super::guard::{quote_ident, quote_literal};

/// Alias given to the embedded defining query
pub const BASE_ALIAS: &str = "base";

/// Emit the aggregating SQL for `plan` over `inner_sql`.
///
/// The inner query is assumed to have passed
/// [`ensure_select_only`](super::ensure_select_only); a trailing semicolon
/// is dropped so the statement embeds cleanly. The output has no trailing
/// semicolon and is a pure function of its inputs.
pub fn emit_sql(plan: &AggregatePlan, inner_sql: &str) -> String {
    let select: Vec<String> = plan.select.iter().map(emit_select_item).collect();

    let mut sql = format!(
        "SELECT {} FROM ({}) AS {}",
        select.join(", "),
        strip_terminator(inner_sql),
        BASE_ALIAS,
    );

    if !plan.filters.is_empty() {
        let predicates: Vec<String> = plan.filters.iter().map(emit_predicate).collect();
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }

    if !plan.group_by.is_empty() {
        let ordinals: Vec<String> = plan.group_by.iter().map(|i| i.to_string()).collect();
        sql.push_str(" GROUP BY ");
        sql.push_str(&ordinals.join(", "));
    }

    if plan.order_by.is_empty() {
        sql.push_str(" ORDER BY 1");
    } else {
        let keys: Vec<String> = plan
            .order_by
            .iter()
            .map(|key| {
                let name = plan.select[key.position].output_name();
                format!("{} {}", quote_ident(name), key.direction.as_sql())
            })
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&keys.join(", "));
    }

    sql.push_str(&format!(" LIMIT {}", plan.limit));
    sql
}

/// Emit a raw preview query: every column of the dataset, capped at `limit`
pub fn emit_preview_sql(inner_sql: &str, limit: u64) -> String {
    format!(
        "SELECT * FROM ({}) AS {} LIMIT {}",
        strip_terminator(inner_sql),
        BASE_ALIAS,
        limit
    )
}

fn strip_terminator(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

// ---------------------------------------------------------------------------
// Select list
// ---------------------------------------------------------------------------

fn emit_select_item(item: &SelectItem) -> String {
    match item {
        SelectItem::Dimension(dim) => emit_dimension(dim),
        SelectItem::Metric(metric) => emit_metric(metric),
    }
}

fn emit_dimension(dim: &DimensionItem) -> String {
    let field = quote_ident(&dim.field);
    match dim.time_grain {
        Some(grain) => format!(
            "DATE_TRUNC({}, {}) AS {}",
            quote_literal(grain.as_str()),
            field,
            quote_ident(&dim.alias)
        ),
        None if dim.alias == dim.field => field,
        None => format!("{} AS {}", field, quote_ident(&dim.alias)),
    }
}

fn emit_metric(metric: &MetricItem) -> String {
    let arg = if metric.is_wildcard() {
        "*".to_string()
    } else {
        quote_ident(&metric.field)
    };
    let call = match metric.func {
        Aggregation::CountDistinct => format!("COUNT(DISTINCT {})", arg),
        func => format!("{}({})", func.sql_function(), arg),
    };
    format!("{} AS {}", call, quote_ident(&metric.alias))
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

fn emit_predicate(predicate: &Predicate) -> String {
    let field = quote_ident(&predicate.field);
    let value = &predicate.value;

    match predicate.op {
        FilterOperator::IsNull => format!("{} IS NULL", field),
        FilterOperator::IsNotNull => format!("{} IS NOT NULL", field),
        FilterOperator::Eq if value.is_null() => format!("{} IS NULL", field),
        FilterOperator::NotEq if value.is_null() => format!("{} IS NOT NULL", field),
        FilterOperator::In | FilterOperator::NotIn => {
            let items = predicate.list_values();
            let negate = predicate.op == FilterOperator::NotIn;
            if items.is_empty() {
                let constant = if negate { "TRUE" } else { "FALSE" };
                return constant.to_string();
            }
            let literals: Vec<String> = items.into_iter().map(emit_literal).collect();
            let keyword = if negate { "NOT IN" } else { "IN" };
            format!("{} {} ({})", field, keyword, literals.join(", "))
        }
        FilterOperator::Contains => {
            let needle = literal_text(value);
            format!(
                "CAST({} AS TEXT) LIKE {} ESCAPE '\\'",
                field,
                quote_literal(&format!("%{}%", escape_like(&needle)))
            )
        }
        op => format!("{} {} {}", field, comparison_sql(op), emit_literal(value)),
    }
}

fn comparison_sql(op: FilterOperator) -> &'static str {
    match op {
        FilterOperator::NotEq => "<>",
        FilterOperator::Gt => ">",
        FilterOperator::GtEq => ">=",
        FilterOperator::Lt => "<",
        FilterOperator::LtEq => "<=",
        _ => "=",
    }
}

fn emit_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_literal(s),
        other => quote_literal(&other.to_string()),
    }
}

fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
