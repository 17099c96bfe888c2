//! Report Catalog - named analytical queries over the food schema
//!
//! The catalog is a static table of read-only aggregation statements. Reports
//! and read-only ad-hoc statements run through the gateway's read path inside
//! a rolled-back transaction.

use serde::Serialize;
use tracing::{info, warn};

use crate::database::record_gateway::RecordGateway;
use crate::database::statement;
use crate::database::value::TabularResult;
use crate::error::{LedgerError, Result};

/// A built-in report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub sql: &'static str,
}

impl ReportDefinition {
    /// Label in the `Q11: Claim status percentages` form
    pub fn label(&self) -> String {
        format!("{}: {}", self.key.to_ascii_uppercase(), self.name)
    }

    fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        self.key.eq_ignore_ascii_case(name)
            || self.name.eq_ignore_ascii_case(name)
            || self.label().eq_ignore_ascii_case(name)
    }
}

const REPORTS: &[ReportDefinition] = &[
    ReportDefinition {
        key: "q1",
        name: "Providers per city",
        description: "Number of providers in each city, busiest city first",
        sql: r#"
            SELECT City, COUNT(*) AS Provider_Count
            FROM providers
            GROUP BY City
            ORDER BY Provider_Count DESC
        "#,
    },
    ReportDefinition {
        key: "q2",
        name: "Receivers per city",
        description: "Number of receivers in each city, busiest city first",
        sql: r#"
            SELECT City, COUNT(*) AS Receiver_Count
            FROM receivers
            GROUP BY City
            ORDER BY Receiver_Count DESC
        "#,
    },
    ReportDefinition {
        key: "q3",
        name: "Top 3 provider types by listings",
        description: "Provider types contributing the most food listings",
        sql: r#"
            SELECT Provider_Type, COUNT(*) AS Listing_Count
            FROM food_listings
            GROUP BY Provider_Type
            ORDER BY Listing_Count DESC
            LIMIT 3
        "#,
    },
    ReportDefinition {
        key: "q4_1",
        name: "Providers in New Jessica",
        description: "Contact details of providers located in New Jessica",
        sql: r#"
            SELECT Name, Contact, Address
            FROM providers
            WHERE City = 'New Jessica'
        "#,
    },
    ReportDefinition {
        key: "q4_2",
        name: "Providers in Mendezmouth",
        description: "Contact details of providers located in Mendezmouth",
        sql: r#"
            SELECT Name, Contact, Address
            FROM providers
            WHERE City = 'Mendezmouth'
        "#,
    },
    ReportDefinition {
        key: "q5",
        name: "Top 8 receivers by claims",
        description: "Receivers that have made the most claims",
        sql: r#"
            SELECT r.Name, COUNT(c.Claim_ID) AS Claim_Count
            FROM receivers r
            JOIN claims c ON r.Receiver_ID = c.Receiver_ID
            GROUP BY r.Receiver_ID, r.Name
            ORDER BY Claim_Count DESC
            LIMIT 8
        "#,
    },
    ReportDefinition {
        key: "q6",
        name: "Total food quantity",
        description: "Sum of quantity across all food listings",
        sql: r#"
            SELECT SUM(Quantity) AS Total_Quantity
            FROM food_listings
        "#,
    },
    ReportDefinition {
        key: "q7",
        name: "City with most listings",
        description: "Location with the highest number of food listings",
        sql: r#"
            SELECT Location, COUNT(*) AS Listing_Count
            FROM food_listings
            GROUP BY Location
            ORDER BY Listing_Count DESC
            LIMIT 1
        "#,
    },
    ReportDefinition {
        key: "q8",
        name: "Most common food types",
        description: "Food types ranked by number of listings",
        sql: r#"
            SELECT Food_Type, COUNT(*) AS Listing_Count
            FROM food_listings
            GROUP BY Food_Type
            ORDER BY Listing_Count DESC
        "#,
    },
    ReportDefinition {
        key: "q9",
        name: "Claims per food item",
        description: "Claim count for every listing, including unclaimed ones",
        sql: r#"
            SELECT f.Food_Name, COUNT(c.Claim_ID) AS Claim_Count
            FROM food_listings f
            LEFT JOIN claims c ON f.Food_ID = c.Food_ID
            GROUP BY f.Food_ID, f.Food_Name
            ORDER BY Claim_Count DESC
        "#,
    },
    ReportDefinition {
        key: "q10",
        name: "Top provider by completed claims",
        description: "Provider whose listings have the most completed claims",
        sql: r#"
            SELECT p.Name, COUNT(c.Claim_ID) AS Completed_Claims
            FROM providers p
            JOIN food_listings f ON p.Provider_ID = f.Provider_ID
            JOIN claims c ON f.Food_ID = c.Food_ID
            WHERE c.Status = 'Completed'
            GROUP BY p.Provider_ID, p.Name
            ORDER BY Completed_Claims DESC
            LIMIT 1
        "#,
    },
    ReportDefinition {
        key: "q11",
        name: "Claim status percentages",
        description: "Share of claims in each status",
        sql: r#"
            SELECT Status,
                   COUNT(*) AS Claim_Count,
                   (COUNT(*) * 100.0 / (SELECT COUNT(*) FROM claims)) AS Percentage
            FROM claims
            GROUP BY Status
            ORDER BY Claim_Count DESC
        "#,
    },
    ReportDefinition {
        key: "q12",
        name: "Avg quantity claimed per receiver",
        description: "Average listing quantity behind each receiver's claims",
        sql: r#"
            SELECT r.Name, AVG(f.Quantity) AS Avg_Quantity_Claimed
            FROM receivers r
            JOIN claims c ON r.Receiver_ID = c.Receiver_ID
            JOIN food_listings f ON c.Food_ID = f.Food_ID
            GROUP BY r.Receiver_ID, r.Name
            ORDER BY Avg_Quantity_Claimed DESC
        "#,
    },
    ReportDefinition {
        key: "q13",
        name: "Most claimed meal type",
        description: "Meal type with the highest number of claims",
        sql: r#"
            SELECT f.Meal_Type, COUNT(c.Claim_ID) AS Claim_Count
            FROM food_listings f
            JOIN claims c ON f.Food_ID = c.Food_ID
            GROUP BY f.Meal_Type
            ORDER BY Claim_Count DESC
            LIMIT 1
        "#,
    },
    ReportDefinition {
        key: "q14",
        name: "Total quantity donated by provider",
        description: "Total listed quantity per provider",
        sql: r#"
            SELECT p.Name, SUM(f.Quantity) AS Total_Donated
            FROM providers p
            JOIN food_listings f ON p.Provider_ID = f.Provider_ID
            GROUP BY p.Provider_ID, p.Name
            ORDER BY Total_Donated DESC
        "#,
    },
    ReportDefinition {
        key: "q15",
        name: "Providers with no claims",
        description: "Providers with at least one listing that was never claimed",
        sql: r#"
            SELECT p.Name
            FROM providers p
            JOIN food_listings f ON p.Provider_ID = f.Provider_ID
            LEFT JOIN claims c ON f.Food_ID = c.Food_ID
            WHERE c.Claim_ID IS NULL
            GROUP BY p.Provider_ID, p.Name
        "#,
    },
    ReportDefinition {
        key: "q16",
        name: "Receivers with no claims",
        description: "Receivers that have never made a claim",
        sql: r#"
            SELECT Name
            FROM receivers
            WHERE Receiver_ID NOT IN (SELECT Receiver_ID FROM claims WHERE Receiver_ID IS NOT NULL)
        "#,
    },
    ReportDefinition {
        key: "q17",
        name: "Claims by meal type and status",
        description: "Claim counts cross-tabulated by meal type and status",
        sql: r#"
            SELECT f.Meal_Type, c.Status, COUNT(c.Claim_ID) AS Claim_Count
            FROM food_listings f
            JOIN claims c ON f.Food_ID = c.Food_ID
            GROUP BY f.Meal_Type, c.Status
            ORDER BY Claim_Count DESC
        "#,
    },
    ReportDefinition {
        key: "q18",
        name: "Unclaimed food listings",
        description: "Listings that no receiver has claimed",
        sql: r#"
            SELECT f.Food_Name, f.Quantity, f.Expiry_Date
            FROM food_listings f
            LEFT JOIN claims c ON f.Food_ID = c.Food_ID
            WHERE c.Claim_ID IS NULL
        "#,
    },
    ReportDefinition {
        key: "q19",
        name: "Receivers per city by meal type",
        description: "Distinct receivers per city claiming each meal type",
        sql: r#"
            SELECT r.City,
                   COUNT(DISTINCT CASE WHEN f.Meal_Type = 'Breakfast' THEN r.Receiver_ID END) AS Breakfast_Receivers,
                   COUNT(DISTINCT CASE WHEN f.Meal_Type = 'Lunch' THEN r.Receiver_ID END) AS Lunch_Receivers,
                   COUNT(DISTINCT CASE WHEN f.Meal_Type = 'Dinner' THEN r.Receiver_ID END) AS Dinner_Receivers,
                   COUNT(DISTINCT CASE WHEN f.Meal_Type = 'Snacks' THEN r.Receiver_ID END) AS Snacks_Receivers
            FROM receivers r
            JOIN claims c ON r.Receiver_ID = c.Receiver_ID
            JOIN food_listings f ON c.Food_ID = f.Food_ID
            GROUP BY r.City
            ORDER BY Breakfast_Receivers DESC, Lunch_Receivers DESC,
                     Dinner_Receivers DESC, Snacks_Receivers DESC
        "#,
    },
    ReportDefinition {
        key: "q20",
        name: "Receiver type with most food",
        description: "Receiver type and food type pair with the largest claimed quantity",
        sql: r#"
            SELECT r.Type, f.Food_Type, SUM(f.Quantity) AS Total_Quantity
            FROM receivers r
            JOIN claims c ON r.Receiver_ID = c.Receiver_ID
            JOIN food_listings f ON c.Food_ID = f.Food_ID
            GROUP BY r.Type, f.Food_Type
            ORDER BY Total_Quantity DESC
            LIMIT 1
        "#,
    },
    ReportDefinition {
        key: "q21",
        name: "Receivers by food and meal type",
        description: "Claim counts per receiver, food type and meal type",
        sql: r#"
            SELECT r.Name, f.Food_Type, f.Meal_Type, COUNT(c.Claim_ID) AS Claim_Count
            FROM receivers r
            JOIN claims c ON r.Receiver_ID = c.Receiver_ID
            JOIN food_listings f ON c.Food_ID = f.Food_ID
            GROUP BY r.Receiver_ID, r.Name, f.Food_Type, f.Meal_Type
            ORDER BY Claim_Count DESC
        "#,
    },
    ReportDefinition {
        key: "q22",
        name: "Claims by city",
        description: "Claim counts per listing location",
        sql: r#"
            SELECT f.Location, COUNT(c.Claim_ID) AS Claim_Count
            FROM food_listings f
            JOIN claims c ON f.Food_ID = c.Food_ID
            GROUP BY f.Location
            ORDER BY Claim_Count DESC
        "#,
    },
    ReportDefinition {
        key: "q23",
        name: "Providers with highest avg quantity",
        description: "Five providers with the largest average listing quantity",
        sql: r#"
            SELECT p.Name, AVG(f.Quantity) AS Avg_Quantity
            FROM providers p
            JOIN food_listings f ON p.Provider_ID = f.Provider_ID
            GROUP BY p.Provider_ID, p.Name
            ORDER BY Avg_Quantity DESC
            LIMIT 5
        "#,
    },
    ReportDefinition {
        key: "q24",
        name: "Percentage of quantity claimed per food type",
        description: "Listed quantity per food type and the share of it that was claimed",
        sql: r#"
            SELECT f.Food_Type,
                   SUM(f.Quantity) AS Total_Quantity,
                   SUM(CASE WHEN c.Claim_ID IS NOT NULL THEN f.Quantity ELSE 0 END) * 100.0
                       / SUM(f.Quantity) AS Claimed_Percentage
            FROM food_listings f
            LEFT JOIN claims c ON f.Food_ID = c.Food_ID
            GROUP BY f.Food_Type
        "#,
    },
];

/// Executes catalog reports and ad-hoc statements
#[derive(Clone, Debug)]
pub struct ReportCatalog {
    gateway: RecordGateway,
    allow_mutating_ad_hoc: bool,
}

impl ReportCatalog {
    pub fn new(gateway: RecordGateway) -> Self {
        Self {
            gateway,
            allow_mutating_ad_hoc: false,
        }
    }

    pub fn with_mutating_ad_hoc(mut self, allow: bool) -> Self {
        self.allow_mutating_ad_hoc = allow;
        self
    }

    pub fn allows_mutating_ad_hoc(&self) -> bool {
        self.allow_mutating_ad_hoc
    }

    /// Built-in reports, in catalog order
    pub fn list_reports(&self) -> &'static [ReportDefinition] {
        REPORTS
    }

    /// Look up a report by key (`q11`), name or `Q11: name` label
    pub fn find(&self, name: &str) -> Option<&'static ReportDefinition> {
        REPORTS.iter().find(|r| r.matches(name))
    }

    pub async fn run_report(&self, name: &str) -> Result<TabularResult> {
        let report = self.find(name).ok_or_else(|| LedgerError::UnknownReport {
            name: name.to_string(),
        })?;

        let result = self.gateway.query_read_only(report.sql).await?;
        info!(
            "Report {} returned {} row(s)",
            report.label(),
            result.row_count()
        );
        Ok(result)
    }

    /// Execute operator-supplied statement text.
    ///
    /// Unless mutating ad-hoc statements are allowed, every statement in the
    /// text must be a pure read. Text holding more than one statement fails
    /// with [`LedgerError::QueryError`].
    pub async fn run_ad_hoc(&self, statement_text: &str) -> Result<TabularResult> {
        if statement::is_blank(statement_text) {
            return Err(LedgerError::QueryError {
                message: "statement text is empty".to_string(),
            });
        }

        let mutating = statement::first_mutating_keyword(statement_text);
        if let (Some(keyword), false) = (&mutating, self.allow_mutating_ad_hoc) {
            warn!("Rejected ad-hoc statement starting with '{}'", keyword);
            return Err(LedgerError::MutatingStatementRejected {
                keyword: keyword.clone(),
            });
        }

        // One result shape per call
        let count = statement::split_statements(statement_text).len();
        if count > 1 {
            return Err(LedgerError::QueryError {
                message: format!("expected a single statement, found {}", count),
            });
        }

        match mutating {
            None => self.gateway.query_read_only(statement_text).await,
            Some(keyword) => {
                info!("Running mutating ad-hoc statement ({})", keyword);
                self.gateway.query_committed(statement_text).await
            }
        }
    }

    /// Run catalog-owned SQL, such as chart statements, read-only
    pub(crate) async fn run_read_only(&self, sql: &str) -> Result<TabularResult> {
        self.gateway.query_read_only(sql).await
    }
}
