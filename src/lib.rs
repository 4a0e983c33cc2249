//! # sqlrecord — copy and insert MySQL rows with column-level overrides
//!
//! A small tool family around one idea: build a parameterized INSERT from a
//! table's metadata, where every column's value comes from exactly one of
//! a literal replacement, the source row being copied, or a generator
//! clause (`DEFAULT`, `NOW()`, `NULL`).
//!
//! ## Example
//!
//! ```bash
//! # Duplicate row id=5 of `users` with a fresh email and timestamp.
//! copy-record -d shop -t users -u app -p \
//!     -k id -v 5 -c email -r b@x.com -n created_at
//!
//! # Insert a row taking defaults for everything but the name.
//! insert-record -d shop -t users -u app -P secret -c name -v Alice
//! ```
//!
//! Pipeline, both tools: validate arguments → connect → load column
//! metadata → resolve a per-column plan → build the statement → bind →
//! execute.

pub mod cli;
pub mod coerce;
pub mod engine;
pub mod error;
pub mod plan;
pub mod sql;

pub mod prelude {
    pub use crate::cli::{pair_values, prompt_password, ConnectArgs};
    pub use crate::coerce::{coerce, ColumnType, TypedValue};
    pub use crate::engine::{Auth, ConnectConfig, Db};
    pub use crate::error::{RecordError, RecordResult};
    pub use crate::plan::{
        resolve, ColumnDescriptor, KeySpec, Mode, OverrideSpec, PlannedColumn, ResolutionPlan,
        ValueSource,
    };
    pub use crate::sql::{build_insert, build_select_by_keys};
}
