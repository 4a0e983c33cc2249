//! Parameterized SQL text construction.
//!
//! Table and column names come from the tool's own arguments and the
//! table's metadata; they are interpolated verbatim, not quoted. Values
//! are always bound as `?` parameters, never interpolated.

use crate::plan::{ResolutionPlan, ValueSource};

/// Build the INSERT statement for a resolution plan.
///
/// Each column contributes either a `?` placeholder or its literal
/// DEFAULT / NOW() / NULL clause, in ordinal position.
pub fn build_insert(table: &str, plan: &ResolutionPlan) -> String {
    let clauses: Vec<&str> = plan
        .columns
        .iter()
        .map(|col| match col.source {
            ValueSource::SqlDefault => "DEFAULT",
            ValueSource::SqlNow => "NOW()",
            ValueSource::SqlNull => "NULL",
            ValueSource::Literal(_) | ValueSource::FromSource => "?",
        })
        .collect();

    format!("INSERT INTO {} VALUES({})", table, clauses.join(", "))
}

/// Build the SELECT that finds source rows by key equality.
///
/// All predicates are equality terms joined with AND, so no parentheses
/// are needed.
pub fn build_select_by_keys(table: &str, keys: &[&str]) -> String {
    let predicates: Vec<String> = keys.iter().map(|key| format!("{key} = ?")).collect();
    format!(
        "SELECT * FROM {} WHERE {}",
        table,
        predicates.join(" AND ")
    )
}
