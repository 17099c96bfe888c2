//! Chart datasets for the dashboard's visualization page
//!
//! Each chart is a read-only statement plus the columns that carry its labels
//! and values. Rendering and styling are left to the presentation layer.

use serde::Serialize;

use crate::database::report_catalog::ReportCatalog;
use crate::database::value::{SqlValue, TabularResult};
use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartDefinition {
    pub key: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub label_column: &'static str,
    pub value_column: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub sql: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub key: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }
}

const CHARTS: &[ChartDefinition] = &[
    ChartDefinition {
        key: "providers_per_city",
        title: "Top 10 Cities by Number of Providers",
        kind: ChartKind::Bar,
        label_column: "City",
        value_column: "Provider_Count",
        x_label: "City",
        y_label: "Provider Count",
        sql: r#"
            SELECT City, COUNT(*) AS Provider_Count
            FROM providers
            GROUP BY City
            ORDER BY Provider_Count DESC
            LIMIT 10
        "#,
    },
    ChartDefinition {
        key: "claim_status",
        title: "Claim Status Distribution",
        kind: ChartKind::Pie,
        label_column: "Status",
        value_column: "Percentage",
        x_label: "Status",
        y_label: "Percentage",
        sql: r#"
            SELECT Status,
                   COUNT(*) AS Claim_Count,
                   (COUNT(*) * 100.0 / (SELECT COUNT(*) FROM claims)) AS Percentage
            FROM claims
            GROUP BY Status
            ORDER BY Claim_Count DESC
        "#,
    },
    ChartDefinition {
        key: "top_donors",
        title: "Top 5 Providers by Total Quantity Donated",
        kind: ChartKind::Bar,
        label_column: "Name",
        value_column: "Total_Donated",
        x_label: "Provider Name",
        y_label: "Total Quantity",
        sql: r#"
            SELECT p.Name, SUM(f.Quantity) AS Total_Donated
            FROM providers p
            JOIN food_listings f ON p.Provider_ID = f.Provider_ID
            GROUP BY p.Provider_ID, p.Name
            ORDER BY Total_Donated DESC
            LIMIT 5
        "#,
    },
    ChartDefinition {
        key: "top_receivers_avg",
        title: "Top 5 Receivers by Avg Quantity Claimed",
        kind: ChartKind::Bar,
        label_column: "Name",
        value_column: "Avg_Quantity_Claimed",
        x_label: "Receiver Name",
        y_label: "Avg Quantity",
        sql: r#"
            SELECT r.Name, AVG(f.Quantity) AS Avg_Quantity_Claimed
            FROM receivers r
            JOIN claims c ON r.Receiver_ID = c.Receiver_ID
            JOIN food_listings f ON c.Food_ID = f.Food_ID
            GROUP BY r.Receiver_ID, r.Name
            ORDER BY Avg_Quantity_Claimed DESC
            LIMIT 5
        "#,
    },
    ChartDefinition {
        key: "claims_by_city",
        title: "Top 10 Cities by Number of Claims",
        kind: ChartKind::Bar,
        label_column: "Location",
        value_column: "Claim_Count",
        x_label: "City",
        y_label: "Claim Count",
        sql: r#"
            SELECT f.Location, COUNT(c.Claim_ID) AS Claim_Count
            FROM food_listings f
            JOIN claims c ON f.Food_ID = c.Food_ID
            GROUP BY f.Location
            ORDER BY Claim_Count DESC
            LIMIT 10
        "#,
    },
    ChartDefinition {
        key: "food_types",
        title: "Top 5 Most Common Food Types",
        kind: ChartKind::Pie,
        label_column: "Food_Type",
        value_column: "Listing_Count",
        x_label: "Food Type",
        y_label: "Listing Count",
        sql: r#"
            SELECT Food_Type, COUNT(*) AS Listing_Count
            FROM food_listings
            GROUP BY Food_Type
            ORDER BY Listing_Count DESC
            LIMIT 5
        "#,
    },
    ChartDefinition {
        key: "provider_avg_quantity",
        title: "Top 5 Providers by Avg Quantity",
        kind: ChartKind::Bar,
        label_column: "Name",
        value_column: "Avg_Quantity",
        x_label: "Provider Name",
        y_label: "Avg Quantity",
        sql: r#"
            SELECT p.Name, AVG(f.Quantity) AS Avg_Quantity
            FROM providers p
            JOIN food_listings f ON p.Provider_ID = f.Provider_ID
            GROUP BY p.Provider_ID, p.Name
            ORDER BY Avg_Quantity DESC
            LIMIT 5
        "#,
    },
    ChartDefinition {
        key: "meal_types",
        title: "Top 5 Meal Types by Claim Count",
        kind: ChartKind::Bar,
        label_column: "Meal_Type",
        value_column: "Claim_Count",
        x_label: "Meal Type",
        y_label: "Claim Count",
        sql: r#"
            SELECT f.Meal_Type, COUNT(c.Claim_ID) AS Claim_Count
            FROM food_listings f
            JOIN claims c ON f.Food_ID = c.Food_ID
            GROUP BY f.Meal_Type
            ORDER BY Claim_Count DESC
            LIMIT 5
        "#,
    },
    ChartDefinition {
        key: "unclaimed_listings",
        title: "Top 5 Unclaimed Food Listings by Quantity",
        kind: ChartKind::Bar,
        label_column: "Food_Name",
        value_column: "Quantity",
        x_label: "Food Name",
        y_label: "Quantity",
        sql: r#"
            SELECT f.Food_Name, f.Quantity
            FROM food_listings f
            LEFT JOIN claims c ON f.Food_ID = c.Food_ID
            WHERE c.Claim_ID IS NULL
            ORDER BY f.Quantity DESC
            LIMIT 5
        "#,
    },
    ChartDefinition {
        key: "breakfast_receivers",
        title: "Top 5 Cities by Breakfast Receivers",
        kind: ChartKind::Bar,
        label_column: "City",
        value_column: "Breakfast_Receivers",
        x_label: "City",
        y_label: "Breakfast Receivers",
        sql: r#"
            SELECT r.City,
                   COUNT(DISTINCT CASE WHEN f.Meal_Type = 'Breakfast' THEN r.Receiver_ID END) AS Breakfast_Receivers
            FROM receivers r
            JOIN claims c ON r.Receiver_ID = c.Receiver_ID
            JOIN food_listings f ON c.Food_ID = f.Food_ID
            GROUP BY r.City
            ORDER BY Breakfast_Receivers DESC
            LIMIT 5
        "#,
    },
];

/// Produces label/value series for the dashboard charts
#[derive(Clone, Debug)]
pub struct ChartService {
    catalog: ReportCatalog,
}

impl ChartService {
    pub fn new(catalog: ReportCatalog) -> Self {
        Self { catalog }
    }

    pub fn list_charts(&self) -> &'static [ChartDefinition] {
        CHARTS
    }

    pub async fn series(&self, key: &str) -> Result<ChartSeries> {
        let chart = CHARTS
            .iter()
            .find(|c| c.key.eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| LedgerError::UnknownChart {
                key: key.to_string(),
            })?;

        let table = self.catalog.run_read_only(chart.sql).await?;
        Ok(ChartSeries {
            key: chart.key,
            title: chart.title,
            kind: chart.kind,
            x_label: chart.x_label,
            y_label: chart.y_label,
            points: to_points(chart, &table)?,
        })
    }
}

fn to_points(chart: &ChartDefinition, table: &TabularResult) -> Result<Vec<ChartPoint>> {
    let missing = |column: &str| LedgerError::QueryError {
        message: format!("chart '{}' result has no column '{}'", chart.key, column),
    };
    let label_idx = table
        .column_index(chart.label_column)
        .ok_or_else(|| missing(chart.label_column))?;
    let value_idx = table
        .column_index(chart.value_column)
        .ok_or_else(|| missing(chart.value_column))?;

    table
        .rows
        .iter()
        .map(|row| {
            let label = match &row[label_idx] {
                SqlValue::Null => String::new(),
                other => other.to_string(),
            };
            let value = match &row[value_idx] {
                SqlValue::Null => 0.0,
                other => other.as_f64().ok_or_else(|| LedgerError::QueryError {
                    message: format!(
                        "chart '{}' value '{}' is not numeric",
                        chart.key, other
                    ),
                })?,
            };
            Ok(ChartPoint { label, value })
        })
        .collect()
}
