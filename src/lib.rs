//! Food Ledger - data core of the food wastage management dashboard
//!
//! This crate provides the record gateway and report catalog behind an
//! operator dashboard for providers, receivers, food listings and claims.
//!
//! ## Architecture
//! All store access flows through one connection handle:
//! DatabaseManager -> RecordGateway (CRUD) -> ReportCatalog (reports, ad-hoc)
//! -> ChartService / DashboardService (datasets for the presentation layer)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use food_ledger::database::{DatabaseManager, FieldValues, Filter, Table};
//!
//! # async fn run() -> food_ledger::Result<()> {
//! let db = DatabaseManager::in_memory().await?;
//! let gateway = db.record_gateway();
//!
//! let fields = FieldValues::new()
//!     .with("Provider_ID", 1_i64)
//!     .with("Name", "Harbor Kitchen")
//!     .with("City", "New Jessica");
//! gateway.create(Table::Providers, &fields).await?;
//!
//! let by_city = db.report_catalog().run_report("Providers per city").await?;
//! assert_eq!(by_city.row_count(), 1);
//!
//! gateway.delete(Table::Providers, &Filter::by_key(Table::Providers, 1)).await?;
//! db.close().await;
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

pub mod config;
pub mod logging;

// Store access: gateway, catalog, charts, dashboard
pub mod database;

pub use config::DatabaseConfig;
pub use database::{
    DatabaseManager, FieldValues, Filter, RecordGateway, ReportCatalog, SqlValue, Table,
    TabularResult,
};
pub use error::{LedgerError, Result};
