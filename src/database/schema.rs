//! Table metadata for the four-table food schema
//!
//! Table and column names are the only identifiers the gateway ever writes
//! into statement text, and only after they are matched against this module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{LedgerError, Result};

/// The tables managed through the record gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Providers,
    Receivers,
    FoodListings,
    Claims,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Providers,
        Table::Receivers,
        Table::FoodListings,
        Table::Claims,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Providers => "providers",
            Table::Receivers => "receivers",
            Table::FoodListings => "food_listings",
            Table::Claims => "claims",
        }
    }

    pub fn primary_key(self) -> &'static str {
        match self {
            Table::Providers => "Provider_ID",
            Table::Receivers => "Receiver_ID",
            Table::FoodListings => "Food_ID",
            Table::Claims => "Claim_ID",
        }
    }

    /// Declared columns, in table order
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Providers => &["Provider_ID", "Name", "Type", "Address", "City", "Contact"],
            Table::Receivers => &["Receiver_ID", "Name", "Type", "City", "Contact"],
            Table::FoodListings => &[
                "Food_ID",
                "Food_Name",
                "Quantity",
                "Expiry_Date",
                "Provider_ID",
                "Provider_Type",
                "Location",
                "Food_Type",
                "Meal_Type",
            ],
            Table::Claims => &["Claim_ID", "Food_ID", "Receiver_ID", "Status", "Timestamp"],
        }
    }

    /// Resolve a column name to its declared spelling.
    ///
    /// Matching is ASCII case-insensitive, as SQLite identifiers are.
    pub fn column(self, name: &str) -> Result<&'static str> {
        self.columns()
            .iter()
            .copied()
            .find(|c| c.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| LedgerError::UnknownColumn {
                table: self.name().to_string(),
                column: name.to_string(),
            })
    }

    fn create_sql(self) -> &'static str {
        match self {
            Table::Providers => {
                r#"
                CREATE TABLE IF NOT EXISTS providers (
                    Provider_ID INTEGER PRIMARY KEY,
                    Name TEXT,
                    Type TEXT,
                    Address TEXT,
                    City TEXT,
                    Contact TEXT
                )
                "#
            }
            Table::Receivers => {
                r#"
                CREATE TABLE IF NOT EXISTS receivers (
                    Receiver_ID INTEGER PRIMARY KEY,
                    Name TEXT,
                    Type TEXT,
                    City TEXT,
                    Contact TEXT
                )
                "#
            }
            Table::FoodListings => {
                r#"
                CREATE TABLE IF NOT EXISTS food_listings (
                    Food_ID INTEGER PRIMARY KEY,
                    Food_Name TEXT,
                    Quantity INTEGER CHECK (Quantity >= 0),
                    Expiry_Date TEXT,
                    Provider_ID INTEGER,
                    Provider_Type TEXT,
                    Location TEXT,
                    Food_Type TEXT,
                    Meal_Type TEXT
                )
                "#
            }
            Table::Claims => {
                r#"
                CREATE TABLE IF NOT EXISTS claims (
                    Claim_ID INTEGER PRIMARY KEY,
                    Food_ID INTEGER,
                    Receiver_ID INTEGER,
                    Status TEXT,
                    Timestamp TEXT
                )
                "#
            }
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Table::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LedgerError::UnknownTable {
                name: s.to_string(),
            })
    }
}

/// Create any of the four tables that do not exist yet.
///
/// Existing tables, and the rows in them, are left alone.
pub async fn bootstrap(pool: &SqlitePool) -> Result<()> {
    for table in Table::ALL {
        sqlx::query(table.create_sql())
            .execute(pool)
            .await
            .map_err(|e| LedgerError::from_write(table.name(), e))?;
    }
    info!("Schema bootstrap complete ({} tables)", Table::ALL.len());
    Ok(())
}
