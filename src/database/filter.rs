//! Structured row filters
//!
//! A [`Filter`] is a conjunction of column comparisons. Column names are
//! checked against the table before being written into the statement, and
//! every comparison value is bound as a parameter.

use serde::{Deserialize, Serialize};

use crate::database::schema::Table;
use crate::database::value::SqlValue;
use crate::error::{LedgerError, Result};

/// Comparison operators accepted in a [`Condition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    IsNull,
    IsNotNull,
}

impl CompareOp {
    fn sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Like => "LIKE",
            CompareOp::IsNull => "IS NULL",
            CompareOp::IsNotNull => "IS NOT NULL",
        }
    }

    /// Null tests take no operand
    fn takes_value(self) -> bool {
        !matches!(self, CompareOp::IsNull | CompareOp::IsNotNull)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column: String,
    pub op: CompareOp,
    pub value: SqlValue,
}

/// AND-combined list of conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    conditions: Vec<Condition>,
}

/// WHERE clause text plus the values to bind, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RenderedFilter<'a> {
    pub clause: String,
    pub params: Vec<&'a SqlValue>,
}

impl Filter {
    /// Filter that matches every row
    pub fn all() -> Self {
        Self::default()
    }

    pub fn condition(column: impl Into<String>, op: CompareOp, value: impl Into<SqlValue>) -> Self {
        Self::all().and(column, op, value)
    }

    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::condition(column, CompareOp::Eq, value)
    }

    /// Match the single row whose primary key is `id`
    pub fn by_key(table: Table, id: i64) -> Self {
        Self::eq(table.primary_key(), id)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::condition(column, CompareOp::IsNull, SqlValue::Null)
    }

    pub fn and(mut self, column: impl Into<String>, op: CompareOp, value: impl Into<SqlValue>) -> Self {
        self.conditions.push(Condition {
            column: column.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render against `table`. Unknown columns make the filter invalid.
    pub(crate) fn render(&self, table: Table) -> Result<RenderedFilter<'_>> {
        let mut parts = Vec::with_capacity(self.conditions.len());
        let mut params = Vec::new();

        for condition in &self.conditions {
            let column = table
                .column(&condition.column)
                .map_err(|_| LedgerError::InvalidFilter {
                    table: table.name().to_string(),
                    reason: format!("unknown column '{}'", condition.column),
                })?;

            if condition.op.takes_value() {
                if condition.value.is_null() {
                    return Err(LedgerError::InvalidFilter {
                        table: table.name().to_string(),
                        reason: format!(
                            "'{}' compares {} against NULL; use IS NULL instead",
                            column,
                            condition.op.sql()
                        ),
                    });
                }
                parts.push(format!("{} {} ?", column, condition.op.sql()));
                params.push(&condition.value);
            } else {
                parts.push(format!("{} {}", column, condition.op.sql()));
            }
        }

        Ok(RenderedFilter {
            clause: parts.join(" AND "),
            params,
        })
    }

    /// Render a filter that must select a subset of rows (update/delete)
    pub(crate) fn render_required(&self, table: Table) -> Result<RenderedFilter<'_>> {
        if self.is_empty() {
            return Err(LedgerError::InvalidFilter {
                table: table.name().to_string(),
                reason: "at least one condition is required".to_string(),
            });
        }
        self.render(table)
    }
}
