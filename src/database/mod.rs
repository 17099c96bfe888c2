//! Database connection and management module
//!
//! This module owns the single store connection and hands it to the record
//! gateway, report catalog, chart and dashboard services.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::error::{LedgerError, Result};

pub mod charts;
pub mod dashboard;
pub mod filter;
pub mod models;
pub mod record_gateway;
pub mod report_catalog;
pub mod schema;
pub mod statement;
pub mod value;

pub use charts::{ChartDefinition, ChartKind, ChartPoint, ChartSeries, ChartService};
pub use dashboard::{DashboardService, DashboardSummary};
pub use filter::{CompareOp, Condition, Filter};
pub use models::{Claim, FoodListing, Provider, Receiver, Record};
pub use record_gateway::{IntentOutcome, OperationType, RecordGateway, RecordIntent};
pub use report_catalog::{ReportCatalog, ReportDefinition};
pub use schema::Table;
pub use value::{FieldValues, SqlValue, TabularResult};

/// Database connection manager
///
/// Holds a pool capped at one connection, so every operation runs on the
/// same session in issue order. An in-memory store lives as long as the
/// manager does.
pub struct DatabaseManager {
    pool: SqlitePool,
    allow_mutating_ad_hoc: bool,
}

impl DatabaseManager {
    /// Open the store described by `config`
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        info!("Connecting to database: {}", config.database_url);

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| LedgerError::Config(format!("invalid DATABASE_URL: {}", e)))?
            .create_if_missing(config.create_if_missing);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(config.connection_timeout)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                LedgerError::StoreUnavailable {
                    message: e.to_string(),
                }
            })?;

        info!("Database connection opened");

        Ok(Self {
            pool,
            allow_mutating_ad_hoc: config.allow_mutating_ad_hoc,
        })
    }

    /// Open the store configured by the environment
    pub async fn from_env() -> Result<Self> {
        Self::new(DatabaseConfig::from_env()?).await
    }

    /// Fresh private in-memory store with the schema already created
    pub async fn in_memory() -> Result<Self> {
        let manager = Self::new(DatabaseConfig::in_memory()).await?;
        manager.bootstrap_schema().await?;
        Ok(manager)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn bootstrap_schema(&self) -> Result<()> {
        schema::bootstrap(&self.pool).await
    }

    pub fn record_gateway(&self) -> RecordGateway {
        RecordGateway::new(self.pool.clone())
    }

    pub fn report_catalog(&self) -> ReportCatalog {
        ReportCatalog::new(self.record_gateway()).with_mutating_ad_hoc(self.allow_mutating_ad_hoc)
    }

    pub fn chart_service(&self) -> ChartService {
        ChartService::new(self.report_catalog())
    }

    pub fn dashboard_service(&self) -> DashboardService {
        DashboardService::new(self.record_gateway())
    }

    /// Test database connectivity
    pub async fn test_connection(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| LedgerError::StoreUnavailable {
                message: e.to_string(),
            })
    }

    /// Close the database connection
    pub async fn close(self) {
        info!("Closing database connection");
        self.pool.close().await;
    }
}
