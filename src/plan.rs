//! Column resolution: decide, per column, where the inserted value comes from.
//!
//! For every column of the target table exactly one outcome is chosen, in
//! declared precedence: a literal replacement beats everything, then
//! auto-increment / forced DEFAULT, then NOW(), then NULL, and finally the
//! mode fallback (copy the source row's value, or DEFAULT for a plain
//! insert). Parameter slots get dense 1-based bind indices no matter how
//! many literal-clause columns are interspersed.

use crate::coerce::{coerce, ColumnType, TypedValue};
use crate::error::RecordError;

/// Metadata for one column of the target table, loaded once per run.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub name: String,
    pub ty: ColumnType,
    pub auto_increment: bool,
    /// 0-based position within the table's column list.
    pub ordinal: usize,
}

/// Which record operation is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Unresolved columns are copied from the matched source row.
    Copy,
    /// Unresolved columns fall back to their SQL DEFAULT.
    Insert,
}

/// The four override sets, keyed by column name (case-insensitive).
///
/// Internally duplicate-free and pairwise disjoint; both properties are
/// enforced at construction, before any connection is made.
#[derive(Debug, Default)]
pub struct OverrideSpec {
    replace: Vec<(String, String)>,
    defaults: Vec<String>,
    nows: Vec<String>,
    nulls: Vec<String>,
}

impl OverrideSpec {
    pub fn new(
        replace: Vec<(String, String)>,
        defaults: Vec<String>,
        nows: Vec<String>,
        nulls: Vec<String>,
    ) -> Result<Self, RecordError> {
        let replace_names: Vec<String> = replace.iter().map(|(name, _)| name.clone()).collect();
        check_no_duplicates(&replace_names, "column name to replace value")?;
        check_no_duplicates(&defaults, "column name to use the default value")?;
        check_no_duplicates(&nows, "column name to use NOW()")?;
        check_no_duplicates(&nulls, "column name to use NULL")?;

        let sets = [
            (&replace_names, "column name to replace value"),
            (&defaults, "column name to use the default value"),
            (&nows, "column name to use NOW()"),
            (&nulls, "column name to use NULL"),
        ];
        for (i, (a, a_desc)) in sets.iter().enumerate() {
            for (b, b_desc) in &sets[i + 1..] {
                check_disjoint(a, a_desc, b, b_desc)?;
            }
        }

        Ok(Self {
            replace,
            defaults,
            nows,
            nulls,
        })
    }

    /// Look up the replacement text for a column, case-insensitive.
    pub fn replacement(&self, column: &str) -> Option<&str> {
        self.replace
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_default(&self, column: &str) -> bool {
        contains_ignore_case(&self.defaults, column)
    }

    pub fn is_now(&self, column: &str) -> bool {
        contains_ignore_case(&self.nows, column)
    }

    pub fn is_null(&self, column: &str) -> bool {
        contains_ignore_case(&self.nulls, column)
    }

    /// Every column name mentioned in any of the four sets.
    pub fn named_columns(&self) -> impl Iterator<Item = &str> {
        self.replace
            .iter()
            .map(|(name, _)| name.as_str())
            .chain(self.defaults.iter().map(String::as_str))
            .chain(self.nows.iter().map(String::as_str))
            .chain(self.nulls.iter().map(String::as_str))
    }
}

/// Ordered key predicates for the copy SELECT's WHERE clause.
#[derive(Debug)]
pub struct KeySpec {
    pairs: Vec<(String, String)>,
}

impl KeySpec {
    pub fn new(pairs: Vec<(String, String)>) -> Result<Self, RecordError> {
        let names: Vec<String> = pairs.iter().map(|(name, _)| name.clone()).collect();
        check_no_duplicates(&names, "key name")?;
        Ok(Self { pairs })
    }

    pub fn names(&self) -> Vec<&str> {
        self.pairs.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// The chosen value source for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// Bind the coerced replacement value.
    Literal(TypedValue),
    /// Emit the literal DEFAULT clause.
    SqlDefault,
    /// Emit the literal NOW() clause.
    SqlNow,
    /// Emit the literal NULL clause.
    SqlNull,
    /// Bind the matching column of the current source row (copy mode only).
    FromSource,
}

impl ValueSource {
    /// Whether this outcome consumes a `?` placeholder and a bound value.
    pub fn is_parameter(&self) -> bool {
        matches!(self, Self::Literal(_) | Self::FromSource)
    }
}

/// One column's resolved outcome.
#[derive(Debug)]
pub struct PlannedColumn {
    pub name: String,
    pub ty: ColumnType,
    /// 0-based position in the table (and in a `SELECT *` source row).
    pub ordinal: usize,
    pub source: ValueSource,
    /// Dense 1-based placeholder position; `None` for literal clauses.
    pub bind_index: Option<usize>,
}

/// The per-column decisions for one run, computed once and reused per row.
#[derive(Debug)]
pub struct ResolutionPlan {
    pub columns: Vec<PlannedColumn>,
}

impl ResolutionPlan {
    /// Number of `?` placeholders (and values bound at execution).
    pub fn parameter_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.source.is_parameter())
            .count()
    }
}

/// Decide the value source for every column of the target table.
///
/// Replacement values are coerced here, against the column's declared type,
/// so a bad literal is rejected before any statement is built.
pub fn resolve(
    columns: &[ColumnDescriptor],
    overrides: &OverrideSpec,
    mode: Mode,
) -> Result<ResolutionPlan, RecordError> {
    let mut planned = Vec::with_capacity(columns.len());
    // Literal-clause columns seen so far; keeps bind indices dense.
    let mut clause_count = 0usize;

    for col in columns {
        let source = if let Some(text) = overrides.replacement(&col.name) {
            ValueSource::Literal(coerce(&col.name, text, col.ty)?)
        } else if col.auto_increment || overrides.is_default(&col.name) {
            ValueSource::SqlDefault
        } else if overrides.is_now(&col.name) {
            ValueSource::SqlNow
        } else if overrides.is_null(&col.name) {
            ValueSource::SqlNull
        } else {
            match mode {
                Mode::Copy => ValueSource::FromSource,
                Mode::Insert => ValueSource::SqlDefault,
            }
        };

        let bind_index = if source.is_parameter() {
            Some(col.ordinal + 1 - clause_count)
        } else {
            clause_count += 1;
            None
        };

        planned.push(PlannedColumn {
            name: col.name.clone(),
            ty: col.ty,
            ordinal: col.ordinal,
            source,
            bind_index,
        });
    }

    Ok(ResolutionPlan { columns: planned })
}

/// Reject override and key column names that do not exist in the table.
///
/// The original tool silently ignored unknown names; here they are a
/// validation error, raised after metadata load and before any statement
/// executes.
pub fn verify_known_columns(
    columns: &[ColumnDescriptor],
    overrides: &OverrideSpec,
    keys: Option<&KeySpec>,
) -> Result<(), RecordError> {
    let known = |name: &str| columns.iter().any(|c| c.name.eq_ignore_ascii_case(name));

    for name in overrides.named_columns() {
        if !known(name) {
            return Err(RecordError::validation(format!(
                "column '{name}' does not exist in the table"
            )));
        }
    }
    if let Some(keys) = keys {
        for name in keys.names() {
            if !known(name) {
                return Err(RecordError::validation(format!(
                    "key column '{name}' does not exist in the table"
                )));
            }
        }
    }
    Ok(())
}

fn contains_ignore_case(set: &[String], name: &str) -> bool {
    set.iter().any(|s| s.eq_ignore_ascii_case(name))
}

fn check_no_duplicates(names: &[String], what: &str) -> Result<(), RecordError> {
    for (i, name) in names.iter().enumerate() {
        if names[i + 1..]
            .iter()
            .any(|other| other.eq_ignore_ascii_case(name))
        {
            return Err(RecordError::validation(format!(
                "you have assigned duplicate values for {what}"
            )));
        }
    }
    Ok(())
}

fn check_disjoint(a: &[String], a_desc: &str, b: &[String], b_desc: &str) -> Result<(), RecordError> {
    for name in a {
        if contains_ignore_case(b, name) {
            return Err(RecordError::validation(format!(
                "you cannot assign {b_desc} '{name}' which is already assigned as {a_desc}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::ColumnType;

    fn col(name: &str, ty: ColumnType, auto_increment: bool, ordinal: usize) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            ty,
            auto_increment,
            ordinal,
        }
    }

    fn users_table() -> Vec<ColumnDescriptor> {
        vec![
            col("id", ColumnType::BigInt, true, 0),
            col("name", ColumnType::Text, false, 1),
            col("email", ColumnType::Text, false, 2),
            col("created_at", ColumnType::Timestamp, false, 3),
        ]
    }

    #[test]
    fn test_override_sets_must_be_disjoint() {
        let err = OverrideSpec::new(
            vec![("email".to_string(), "a@x.com".to_string())],
            vec![],
            vec!["EMAIL".to_string()],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::Validation(_)));

        let err = OverrideSpec::new(
            vec![],
            vec!["created_at".to_string()],
            vec![],
            vec!["Created_At".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::Validation(_)));
    }

    #[test]
    fn test_duplicates_within_a_set_rejected() {
        let err = OverrideSpec::new(
            vec![],
            vec![],
            vec!["a".to_string(), "A".to_string()],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::Validation(_)));

        let err = KeySpec::new(vec![
            ("id".to_string(), "1".to_string()),
            ("ID".to_string(), "2".to_string()),
        ])
        .unwrap_err();
        assert!(matches!(err, RecordError::Validation(_)));
    }

    #[test]
    fn test_every_column_gets_exactly_one_outcome() {
        let overrides = OverrideSpec::new(
            vec![("email".to_string(), "b@x.com".to_string())],
            vec![],
            vec!["created_at".to_string()],
            vec![],
        )
        .unwrap();
        let plan = resolve(&users_table(), &overrides, Mode::Copy).unwrap();
        assert_eq!(plan.columns.len(), 4);
        assert_eq!(plan.columns[0].source, ValueSource::SqlDefault);
        assert_eq!(plan.columns[1].source, ValueSource::FromSource);
        assert_eq!(
            plan.columns[2].source,
            ValueSource::Literal(TypedValue::Text("b@x.com".to_string()))
        );
        assert_eq!(plan.columns[3].source, ValueSource::SqlNow);
        assert_eq!(plan.parameter_count(), 2);
    }

    #[test]
    fn test_bind_indices_are_dense() {
        // [id auto-inc, a, b default, c] with no other overrides.
        let table = vec![
            col("id", ColumnType::BigInt, true, 0),
            col("a", ColumnType::Text, false, 1),
            col("b", ColumnType::Text, false, 2),
            col("c", ColumnType::Text, false, 3),
        ];
        let overrides =
            OverrideSpec::new(vec![], vec!["b".to_string()], vec![], vec![]).unwrap();
        let plan = resolve(&table, &overrides, Mode::Copy).unwrap();
        assert_eq!(plan.columns[0].bind_index, None);
        assert_eq!(plan.columns[1].bind_index, Some(1));
        assert_eq!(plan.columns[2].bind_index, None);
        assert_eq!(plan.columns[3].bind_index, Some(2));
    }

    #[test]
    fn test_replacement_beats_auto_increment() {
        let overrides = OverrideSpec::new(
            vec![("id".to_string(), "99".to_string())],
            vec![],
            vec![],
            vec![],
        )
        .unwrap();
        let plan = resolve(&users_table(), &overrides, Mode::Copy).unwrap();
        assert_eq!(
            plan.columns[0].source,
            ValueSource::Literal(TypedValue::BigInt(99))
        );
    }

    #[test]
    fn test_insert_mode_falls_back_to_default() {
        let overrides = OverrideSpec::new(
            vec![("name".to_string(), "Bob".to_string())],
            vec![],
            vec![],
            vec!["email".to_string()],
        )
        .unwrap();
        let plan = resolve(&users_table(), &overrides, Mode::Insert).unwrap();
        assert_eq!(plan.columns[0].source, ValueSource::SqlDefault);
        assert_eq!(
            plan.columns[1].source,
            ValueSource::Literal(TypedValue::Text("Bob".to_string()))
        );
        assert_eq!(plan.columns[2].source, ValueSource::SqlNull);
        // created_at was never mentioned: DEFAULT, not a parameter.
        assert_eq!(plan.columns[3].source, ValueSource::SqlDefault);
        assert_eq!(plan.parameter_count(), 1);
    }

    #[test]
    fn test_override_matching_is_case_insensitive() {
        let overrides = OverrideSpec::new(
            vec![("EMAIL".to_string(), "b@x.com".to_string())],
            vec![],
            vec![],
            vec![],
        )
        .unwrap();
        let plan = resolve(&users_table(), &overrides, Mode::Copy).unwrap();
        assert!(matches!(plan.columns[2].source, ValueSource::Literal(_)));
    }

    #[test]
    fn test_bad_replacement_value_rejected_during_resolution() {
        let table = vec![col("age", ColumnType::Integer, false, 0)];
        let overrides = OverrideSpec::new(
            vec![("age".to_string(), "abc".to_string())],
            vec![],
            vec![],
            vec![],
        )
        .unwrap();
        let err = resolve(&table, &overrides, Mode::Insert).unwrap_err();
        assert!(matches!(err, RecordError::Parse { .. }));
    }

    #[test]
    fn test_unknown_column_names_rejected() {
        let overrides = OverrideSpec::new(
            vec![],
            vec![],
            vec!["no_such_column".to_string()],
            vec![],
        )
        .unwrap();
        let err = verify_known_columns(&users_table(), &overrides, None).unwrap_err();
        assert!(matches!(err, RecordError::Validation(_)));

        let overrides = OverrideSpec::new(vec![], vec![], vec![], vec![]).unwrap();
        let keys = KeySpec::new(vec![("missing".to_string(), "1".to_string())]).unwrap();
        let err = verify_known_columns(&users_table(), &overrides, Some(&keys)).unwrap_err();
        assert!(matches!(err, RecordError::Validation(_)));

        let keys = KeySpec::new(vec![("ID".to_string(), "5".to_string())]).unwrap();
        verify_known_columns(&users_table(), &overrides, Some(&keys)).unwrap();
    }
}
