//! Record Gateway - generic CRUD over the food schema
//!
//! Translates create/read/update/delete intents into single parameterized
//! statements. Table and column identifiers come from [`Table`] metadata;
//! every user-supplied value is bound. Each mutation is its own
//! auto-committed statement, so it is durable once the call returns.

use serde::{Deserialize, Serialize};
use sqlx::{Column, Executor, SqliteConnection, SqlitePool, Statement};
use tracing::{debug, info};

use crate::database::filter::Filter;
use crate::database::models::Record;
use crate::database::schema::Table;
use crate::database::value::{column_names, to_arguments, FieldValues, SqlValue, TabularResult};
use crate::error::{LedgerError, Result};

/// Types of CRUD operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OperationType {
    Create,
    Read,
    Update,
    Delete,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Create => write!(f, "CREATE"),
            OperationType::Read => write!(f, "READ"),
            OperationType::Update => write!(f, "UPDATE"),
            OperationType::Delete => write!(f, "DELETE"),
        }
    }
}

/// An operator request against one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RecordIntent {
    Create {
        table: Table,
        fields: FieldValues,
    },
    Read {
        table: Table,
        filter: Option<Filter>,
    },
    Update {
        table: Table,
        updates: FieldValues,
        filter: Filter,
    },
    Delete {
        table: Table,
        filter: Filter,
    },
}

impl RecordIntent {
    pub fn operation(&self) -> OperationType {
        match self {
            RecordIntent::Create { .. } => OperationType::Create,
            RecordIntent::Read { .. } => OperationType::Read,
            RecordIntent::Update { .. } => OperationType::Update,
            RecordIntent::Delete { .. } => OperationType::Delete,
        }
    }

    pub fn table(&self) -> Table {
        match self {
            RecordIntent::Create { table, .. }
            | RecordIntent::Read { table, .. }
            | RecordIntent::Update { table, .. }
            | RecordIntent::Delete { table, .. } => *table,
        }
    }
}

/// Result of executing a [`RecordIntent`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IntentOutcome {
    /// The inserted row, re-read by primary key
    Created(TabularResult),
    Rows(TabularResult),
    Affected(u64),
}

/// Gateway for generic record operations
#[derive(Clone, Debug)]
pub struct RecordGateway {
    pool: SqlitePool,
}

impl RecordGateway {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute a single intent
    pub async fn execute(&self, intent: &RecordIntent) -> Result<IntentOutcome> {
        debug!("Executing {} on {}", intent.operation(), intent.table());
        match intent {
            RecordIntent::Create { table, fields } => {
                self.create(*table, fields).await.map(IntentOutcome::Created)
            }
            RecordIntent::Read { table, filter } => {
                self.read(*table, filter.as_ref()).await.map(IntentOutcome::Rows)
            }
            RecordIntent::Update {
                table,
                updates,
                filter,
            } => self
                .update(*table, updates, filter)
                .await
                .map(IntentOutcome::Affected),
            RecordIntent::Delete { table, filter } => {
                self.delete(*table, filter).await.map(IntentOutcome::Affected)
            }
        }
    }

    /// Insert one row and return it as stored.
    ///
    /// The row is re-read by the table's primary key, or by the rowid SQLite
    /// assigned when the key was not supplied.
    pub async fn create(&self, table: Table, fields: &FieldValues) -> Result<TabularResult> {
        let (columns, params) = resolve_fields(table, fields)?;
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name(),
            columns.join(", "),
            placeholders
        );
        debug!("create: {}", sql);

        let args = to_arguments(&params).map_err(LedgerError::from_read)?;
        let result = sqlx::query_with(&sql, args)
            .execute(&self.pool)
            .await
            .map_err(|e| LedgerError::from_write(table.name(), e))?;

        let key = match fields.get(table.primary_key()) {
            Some(value) if !value.is_null() => value.clone(),
            _ => SqlValue::Integer(result.last_insert_rowid()),
        };
        info!("Created row in {} ({} = {})", table, table.primary_key(), key);

        self.read(table, Some(&Filter::eq(table.primary_key(), key)))
            .await
    }

    /// Read rows, optionally narrowed by `filter`. Zero rows is not an error.
    pub async fn read(&self, table: Table, filter: Option<&Filter>) -> Result<TabularResult> {
        let rendered = filter.map(|f| f.render(table)).transpose()?;

        let mut sql = format!("SELECT * FROM {}", table.name());
        let params = match &rendered {
            Some(r) if !r.clause.is_empty() => {
                sql.push_str(" WHERE ");
                sql.push_str(&r.clause);
                r.params.clone()
            }
            _ => Vec::new(),
        };
        debug!("read: {}", sql);

        let mut conn = self.pool.acquire().await.map_err(LedgerError::from_read)?;
        fetch_tabular(&mut conn, &sql, &params)
            .await
            .map_err(LedgerError::from_read)
    }

    /// Apply `updates` to every row matching `filter`; returns rows affected
    pub async fn update(&self, table: Table, updates: &FieldValues, filter: &Filter) -> Result<u64> {
        let (columns, mut params) = resolve_fields(table, updates)?;
        let rendered = filter.render_required(table)?;

        let set_clause = columns
            .iter()
            .map(|c| format!("{} = ?", c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            table.name(),
            set_clause,
            rendered.clause
        );
        params.extend(rendered.params);
        debug!("update: {}", sql);

        let args = to_arguments(&params).map_err(LedgerError::from_read)?;
        let result = sqlx::query_with(&sql, args)
            .execute(&self.pool)
            .await
            .map_err(|e| LedgerError::from_write(table.name(), e))?;

        info!("Updated {} row(s) in {}", result.rows_affected(), table);
        Ok(result.rows_affected())
    }

    /// Delete every row matching `filter`; returns rows affected
    pub async fn delete(&self, table: Table, filter: &Filter) -> Result<u64> {
        let rendered = filter.render_required(table)?;
        let sql = format!("DELETE FROM {} WHERE {}", table.name(), rendered.clause);
        debug!("delete: {}", sql);

        let args = to_arguments(&rendered.params).map_err(LedgerError::from_read)?;
        let result = sqlx::query_with(&sql, args)
            .execute(&self.pool)
            .await
            .map_err(|e| LedgerError::from_write(table.name(), e))?;

        info!("Deleted {} row(s) from {}", result.rows_affected(), table);
        Ok(result.rows_affected())
    }

    pub async fn count(&self, table: Table) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(LedgerError::from_read)?;
        Ok(count.max(0) as u64)
    }

    /// Run a statement inside a transaction that is always rolled back.
    ///
    /// Whatever the text does, nothing it writes survives the call.
    pub(crate) async fn query_read_only(&self, sql: &str) -> Result<TabularResult> {
        debug!("read-only query: {}", sql.trim());
        let mut tx = self.pool.begin().await.map_err(LedgerError::from_read)?;
        let result = fetch_tabular(&mut tx, sql, &[]).await;
        tx.rollback().await.map_err(LedgerError::from_read)?;
        result.map_err(LedgerError::from_read)
    }

    /// Run a statement in autocommit mode, keeping any writes it makes
    pub(crate) async fn query_committed(&self, sql: &str) -> Result<TabularResult> {
        debug!("committed query: {}", sql.trim());
        let mut conn = self.pool.acquire().await.map_err(LedgerError::from_read)?;
        fetch_tabular(&mut conn, sql, &[])
            .await
            .map_err(LedgerError::from_read)
    }

    /// Insert a typed record and return the stored row
    pub async fn insert_record<T: Record>(&self, record: &T) -> Result<TabularResult> {
        self.create(T::TABLE, &record.to_fields()).await
    }

    pub async fn fetch_by_id<T: Record>(&self, id: i64) -> Result<Option<T>> {
        let table = T::TABLE;
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?",
            table.name(),
            table.primary_key()
        );
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(LedgerError::from_read)
    }

    /// Typed variant of [`RecordGateway::read`]
    pub async fn list<T: Record>(&self, filter: Option<&Filter>) -> Result<Vec<T>> {
        let table = T::TABLE;
        let rendered = filter.map(|f| f.render(table)).transpose()?;

        let mut sql = format!("SELECT * FROM {}", table.name());
        let params = match &rendered {
            Some(r) if !r.clause.is_empty() => {
                sql.push_str(" WHERE ");
                sql.push_str(&r.clause);
                r.params.clone()
            }
            _ => Vec::new(),
        };
        sql.push_str(&format!(" ORDER BY {}", table.primary_key()));

        let args = to_arguments(&params).map_err(LedgerError::from_read)?;
        sqlx::query_as_with::<_, T, _>(&sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(LedgerError::from_read)
    }

    /// Delete the stored row with the record's primary key
    pub async fn delete_record<T: Record>(&self, record: &T) -> Result<u64> {
        self.delete(T::TABLE, &Filter::by_key(T::TABLE, record.id()))
            .await
    }
}

/// Resolve field names against `table`, returning declared column names and
/// the values to bind in the same order.
fn resolve_fields(table: Table, fields: &FieldValues) -> Result<(Vec<&'static str>, Vec<&SqlValue>)> {
    if fields.is_empty() {
        return Err(LedgerError::EmptyFields {
            table: table.name().to_string(),
        });
    }

    let mut columns = Vec::with_capacity(fields.len());
    let mut params = Vec::with_capacity(fields.len());
    for (name, value) in fields.iter() {
        columns.push(table.column(name)?);
        params.push(value);
    }
    Ok((columns, params))
}

/// Run a read statement on `conn` and collect it as a [`TabularResult`].
///
/// Column names come from the first row, or from the prepared statement
/// when no rows come back.
pub(crate) async fn fetch_tabular(
    conn: &mut SqliteConnection,
    sql: &str,
    params: &[&SqlValue],
) -> std::result::Result<TabularResult, sqlx::Error> {
    let args = to_arguments(params)?;
    let rows = sqlx::query_with(sql, args).fetch_all(&mut *conn).await?;

    let columns = match rows.first() {
        Some(row) => column_names(row),
        None => {
            let statement = (&mut *conn).prepare(sql).await?;
            statement
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect()
        }
    };

    TabularResult::from_rows(columns, &rows)
}
