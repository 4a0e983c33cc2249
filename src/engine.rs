//! Database execution engine for the record tools.
//!
//! Wraps a single MySQL connection behind sqlx, loads the target table's
//! column metadata once, and runs the two record operations: insert one
//! row, or copy every row matched by the key predicates. Rows are
//! processed strictly sequentially; the first failure aborts the rest.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::{MySql, Row};

use crate::coerce::{coerce, ColumnType, TypedValue};
use crate::error::{RecordError, RecordResult};
use crate::plan::{
    resolve, verify_known_columns, ColumnDescriptor, KeySpec, Mode, OverrideSpec, ValueSource,
};
use crate::sql::{build_insert, build_select_by_keys};

/// Bounded attempts when the password comes from an interactive prompt.
const CONNECT_ATTEMPTS: usize = 3;

const COLUMNS_QUERY: &str = "SELECT COLUMN_NAME, DATA_TYPE, EXTRA \
     FROM information_schema.columns \
     WHERE table_schema = ? AND table_name = ? \
     ORDER BY ORDINAL_POSITION";

/// How the connection password is obtained.
#[derive(Debug)]
pub enum Auth {
    /// Password supplied up front (flag or environment).
    Password(String),
    /// Ask the injected prompt capability, up to three times.
    Prompt,
}

/// Validated connection settings, built once from the CLI arguments.
#[derive(Debug)]
pub struct ConnectConfig {
    pub host: String,
    pub database: String,
    pub user: String,
    pub auth: Auth,
}

/// A database connection for record operations.
pub struct Db {
    pool: MySqlPool,
}

impl Db {
    /// Connect to the database.
    ///
    /// `prompt` is only called in [`Auth::Prompt`] mode; each failed
    /// attempt prompts again, giving up after three.
    pub async fn connect<F>(cfg: &ConnectConfig, mut prompt: F) -> RecordResult<Self>
    where
        F: FnMut(&str) -> RecordResult<String>,
    {
        match &cfg.auth {
            Auth::Password(password) => Self::try_connect(cfg, password).await,
            Auth::Prompt => {
                let mut last_error = None;
                for _ in 0..CONNECT_ATTEMPTS {
                    let password = prompt(&cfg.user)?;
                    match Self::try_connect(cfg, &password).await {
                        Ok(db) => return Ok(db),
                        Err(e) => last_error = Some(e),
                    }
                }
                let detail = last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no attempts made".to_string());
                Err(RecordError::Connection(format!(
                    "giving up after {CONNECT_ATTEMPTS} attempts: {detail}"
                )))
            }
        }
    }

    async fn try_connect(cfg: &ConnectConfig, password: &str) -> RecordResult<Self> {
        let options = MySqlConnectOptions::new()
            .host(&cfg.host)
            .username(&cfg.user)
            .password(password)
            .database(&cfg.database);

        // One statement at a time; a single connection is all we need.
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| RecordError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Release the connection. Dropping the pool also releases it; this
    /// exists so the success path can close before printing the summary.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Load the target table's column metadata, in ordinal order.
    pub async fn load_columns(
        &self,
        database: &str,
        table: &str,
    ) -> RecordResult<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(COLUMNS_QUERY)
            .bind(database)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(RecordError::Database(format!(
                "table '{database}.{table}' does not exist"
            )));
        }

        let mut columns = Vec::with_capacity(rows.len());
        for (ordinal, row) in rows.iter().enumerate() {
            let name: String = row.try_get("COLUMN_NAME")?;
            let data_type: String = row.try_get("DATA_TYPE")?;
            let extra: String = row.try_get("EXTRA")?;
            columns.push(ColumnDescriptor {
                name,
                ty: ColumnType::from_data_type(&data_type),
                auto_increment: extra.to_ascii_lowercase().contains("auto_increment"),
                ordinal,
            });
        }
        Ok(columns)
    }

    /// Insert one row built from the override sets.
    ///
    /// Returns the number of rows inserted (always 1 on success).
    pub async fn insert_record(
        &self,
        table: &str,
        columns: &[ColumnDescriptor],
        overrides: &OverrideSpec,
    ) -> RecordResult<u64> {
        verify_known_columns(columns, overrides, None)?;
        let plan = resolve(columns, overrides, Mode::Insert)?;
        let sql = build_insert(table, &plan);

        let mut query = sqlx::query(&sql);
        for col in &plan.columns {
            if let ValueSource::Literal(value) = &col.source {
                query = bind_value(query, value.clone());
            }
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Copy every row matched by the key predicates, applying overrides.
    ///
    /// The resolution plan and INSERT text are row-independent and built
    /// once. Zero matches is a successful no-op. Returns the number of
    /// rows inserted.
    pub async fn copy_records(
        &self,
        table: &str,
        columns: &[ColumnDescriptor],
        overrides: &OverrideSpec,
        keys: &KeySpec,
    ) -> RecordResult<u64> {
        verify_known_columns(columns, overrides, Some(keys))?;
        let plan = resolve(columns, overrides, Mode::Copy)?;

        let select = build_select_by_keys(table, &keys.names());
        let mut query = sqlx::query(&select);
        for (name, value) in keys.pairs() {
            // verify_known_columns guarantees the lookup succeeds.
            let col = columns
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    RecordError::validation(format!("key column '{name}' does not exist"))
                })?;
            query = bind_value(query, coerce(&col.name, value, col.ty)?);
        }
        let source_rows = query.fetch_all(&self.pool).await?;

        let insert = build_insert(table, &plan);
        let mut inserted = 0u64;
        for row in &source_rows {
            let mut query = sqlx::query(&insert);
            for col in &plan.columns {
                match &col.source {
                    ValueSource::Literal(value) => {
                        query = bind_value(query, value.clone());
                    }
                    ValueSource::FromSource => {
                        let value = read_source_value(row, col.ordinal, col.ty)?;
                        query = bind_value(query, value);
                    }
                    _ => {}
                }
            }
            let result = query.execute(&self.pool).await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }
}

/// Read one column of a source row in its native typed form.
///
/// No re-coercion: the value is decoded with the column's declared type
/// and rewritten as-is, NULLs included.
fn read_source_value(row: &MySqlRow, ordinal: usize, ty: ColumnType) -> RecordResult<TypedValue> {
    let value = match ty {
        ColumnType::Integer => row.try_get::<Option<i32>, _>(ordinal)?.map(TypedValue::Int),
        ColumnType::BigInt => row
            .try_get::<Option<i64>, _>(ordinal)?
            .map(TypedValue::BigInt),
        ColumnType::Decimal => row
            .try_get::<Option<Decimal>, _>(ordinal)?
            .map(TypedValue::Decimal),
        ColumnType::SmallInt => row
            .try_get::<Option<i16>, _>(ordinal)?
            .map(TypedValue::SmallInt),
        ColumnType::TinyInt => row
            .try_get::<Option<i8>, _>(ordinal)?
            .map(TypedValue::TinyInt),
        ColumnType::Float => row
            .try_get::<Option<f32>, _>(ordinal)?
            .map(TypedValue::Float),
        ColumnType::Double => row
            .try_get::<Option<f64>, _>(ordinal)?
            .map(TypedValue::Double),
        ColumnType::Date => row
            .try_get::<Option<NaiveDate>, _>(ordinal)?
            .map(TypedValue::Date),
        ColumnType::Time => row
            .try_get::<Option<NaiveTime>, _>(ordinal)?
            .map(TypedValue::Time),
        ColumnType::Timestamp => row
            .try_get::<Option<NaiveDateTime>, _>(ordinal)?
            .map(TypedValue::DateTime),
        ColumnType::Blob => row
            .try_get::<Option<Vec<u8>>, _>(ordinal)?
            .map(TypedValue::Bytes),
        ColumnType::Clob | ColumnType::Text => row
            .try_get::<Option<String>, _>(ordinal)?
            .map(TypedValue::Text),
    };

    Ok(value.unwrap_or(TypedValue::Null))
}

/// Bind a dynamic value into a prepared statement.
fn bind_value(
    query: Query<'_, MySql, MySqlArguments>,
    value: TypedValue,
) -> Query<'_, MySql, MySqlArguments> {
    match value {
        TypedValue::Null => query.bind(None::<String>),
        TypedValue::Int(v) => query.bind(v),
        TypedValue::BigInt(v) => query.bind(v),
        TypedValue::Decimal(v) => query.bind(v),
        TypedValue::SmallInt(v) => query.bind(v),
        TypedValue::TinyInt(v) => query.bind(v),
        TypedValue::Float(v) => query.bind(v),
        TypedValue::Double(v) => query.bind(v),
        TypedValue::Date(v) => query.bind(v),
        TypedValue::Time(v) => query.bind(v),
        TypedValue::DateTime(v) => query.bind(v),
        TypedValue::Text(v) => query.bind(v),
        TypedValue::Bytes(v) => query.bind(v),
    }
}
