//! Dashboard Summary - quick counts and recent activity

use serde::Serialize;

use crate::database::record_gateway::RecordGateway;
use crate::database::schema::Table;
use crate::database::value::TabularResult;
use crate::error::Result;

const RECENT_CLAIMS_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Row count per table, in schema order
    pub table_counts: Vec<(Table, u64)>,
    pub recent_claims: TabularResult,
}

impl DashboardSummary {
    pub fn count_for(&self, table: Table) -> Option<u64> {
        self.table_counts
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, n)| *n)
    }
}

#[derive(Clone, Debug)]
pub struct DashboardService {
    gateway: RecordGateway,
}

impl DashboardService {
    pub fn new(gateway: RecordGateway) -> Self {
        Self { gateway }
    }

    pub async fn summary(&self) -> Result<DashboardSummary> {
        let mut table_counts = Vec::with_capacity(Table::ALL.len());
        for table in Table::ALL {
            table_counts.push((table, self.gateway.count(table).await?));
        }

        let recent_claims = self.recent_claims(RECENT_CLAIMS_LIMIT).await?;

        Ok(DashboardSummary {
            table_counts,
            recent_claims,
        })
    }

    /// Latest claims by timestamp, newest first
    pub async fn recent_claims(&self, limit: u32) -> Result<TabularResult> {
        let sql = format!(
            "SELECT * FROM {} ORDER BY Timestamp DESC LIMIT {}",
            Table::Claims.name(),
            limit
        );
        self.gateway.query_read_only(&sql).await
    }
}
