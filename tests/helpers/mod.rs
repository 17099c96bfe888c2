//! Shared fixtures for the integration tests
//!
//! Every test gets its own in-memory store seeded with a small, fully known
//! data set:
//!
//! - providers: New Jessica x2, Mendezmouth x1
//! - receivers: three, one of which (Community Hub) never claims
//! - food listings: Bread (20), Rice (40), Soup (10, never claimed)
//! - claims: Completed x2, Pending x1, Cancelled x1

#![allow(dead_code)]

use anyhow::Result;
use food_ledger::database::{DatabaseManager, FieldValues, Table};
use food_ledger::DatabaseConfig;

pub struct TestDb {
    pub db: DatabaseManager,
}

impl TestDb {
    /// Empty schema, nothing seeded
    pub async fn empty() -> Result<Self> {
        let db = DatabaseManager::in_memory().await?;
        Ok(Self { db })
    }

    pub async fn seeded() -> Result<Self> {
        let test_db = Self::empty().await?;
        test_db.seed().await?;
        Ok(test_db)
    }

    /// Seeded store whose catalog accepts mutating ad-hoc statements
    pub async fn seeded_with_mutating_ad_hoc() -> Result<Self> {
        let db = DatabaseManager::new(DatabaseConfig::in_memory().with_mutating_ad_hoc(true)).await?;
        db.bootstrap_schema().await?;
        let test_db = Self { db };
        test_db.seed().await?;
        Ok(test_db)
    }

    async fn seed(&self) -> Result<()> {
        let gateway = self.db.record_gateway();

        for fields in [
            provider(1, "Harbor Kitchen", "Restaurant", "New Jessica"),
            provider(2, "Green Grocer", "Grocery Store", "New Jessica"),
            provider(3, "Bayside Bakery", "Supermarket", "Mendezmouth"),
        ] {
            gateway.create(Table::Providers, &fields).await?;
        }

        for fields in [
            receiver(1, "Ana Shelter", "Shelter", "New Jessica"),
            receiver(2, "Food Bank North", "NGO", "Mendezmouth"),
            receiver(3, "Community Hub", "Charity", "Lakeview"),
        ] {
            gateway.create(Table::Receivers, &fields).await?;
        }

        for fields in [
            listing(1, "Bread", 20, 3, "Supermarket", "Mendezmouth", "Vegetarian", "Breakfast"),
            listing(2, "Rice", 40, 1, "Restaurant", "New Jessica", "Vegan", "Lunch"),
            listing(3, "Soup", 10, 2, "Grocery Store", "New Jessica", "Vegetarian", "Dinner"),
        ] {
            gateway.create(Table::FoodListings, &fields).await?;
        }

        for fields in [
            claim(1, 1, 1, "Completed", "2024-03-01 09:00:00"),
            claim(2, 2, 1, "Pending", "2024-03-02 10:00:00"),
            claim(3, 2, 2, "Completed", "2024-03-03 11:00:00"),
            claim(4, 1, 2, "Cancelled", "2024-03-04 12:00:00"),
        ] {
            gateway.create(Table::Claims, &fields).await?;
        }

        Ok(())
    }
}

// =========================================================================
// ROW BUILDERS
// =========================================================================

pub fn provider(id: i64, name: &str, kind: &str, city: &str) -> FieldValues {
    FieldValues::new()
        .with("Provider_ID", id)
        .with("Name", name)
        .with("Type", kind)
        .with("Address", format!("{} Main Street", id))
        .with("City", city)
        .with("Contact", format!("+1-555-010{}", id))
}

pub fn receiver(id: i64, name: &str, kind: &str, city: &str) -> FieldValues {
    FieldValues::new()
        .with("Receiver_ID", id)
        .with("Name", name)
        .with("Type", kind)
        .with("City", city)
        .with("Contact", format!("+1-555-020{}", id))
}

#[allow(clippy::too_many_arguments)]
pub fn listing(
    id: i64,
    name: &str,
    quantity: i64,
    provider_id: i64,
    provider_type: &str,
    location: &str,
    food_type: &str,
    meal_type: &str,
) -> FieldValues {
    FieldValues::new()
        .with("Food_ID", id)
        .with("Food_Name", name)
        .with("Quantity", quantity)
        .with("Expiry_Date", "2024-03-20")
        .with("Provider_ID", provider_id)
        .with("Provider_Type", provider_type)
        .with("Location", location)
        .with("Food_Type", food_type)
        .with("Meal_Type", meal_type)
}

pub fn claim(id: i64, food_id: i64, receiver_id: i64, status: &str, timestamp: &str) -> FieldValues {
    FieldValues::new()
        .with("Claim_ID", id)
        .with("Food_ID", food_id)
        .with("Receiver_ID", receiver_id)
        .with("Status", status)
        .with("Timestamp", timestamp)
}
