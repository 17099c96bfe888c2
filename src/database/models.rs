//! Typed rows for the four entities
//!
//! The generic gateway works on [`FieldValues`] and [`TabularResult`]; these
//! structs are the typed view for callers that know which table they want.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

use crate::database::schema::Table;
use crate::database::value::FieldValues;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A row type bound to one table of the schema
pub trait Record: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    const TABLE: Table;

    fn id(&self) -> i64;

    /// Column values in declared table order
    fn to_fields(&self) -> FieldValues;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Provider {
    #[sqlx(rename = "Provider_ID")]
    pub provider_id: i64,
    #[sqlx(rename = "Name")]
    pub name: Option<String>,
    #[sqlx(rename = "Type")]
    pub provider_type: Option<String>,
    #[sqlx(rename = "Address")]
    pub address: Option<String>,
    #[sqlx(rename = "City")]
    pub city: Option<String>,
    #[sqlx(rename = "Contact")]
    pub contact: Option<String>,
}

impl Record for Provider {
    const TABLE: Table = Table::Providers;

    fn id(&self) -> i64 {
        self.provider_id
    }

    fn to_fields(&self) -> FieldValues {
        FieldValues::new()
            .with("Provider_ID", self.provider_id)
            .with("Name", self.name.clone())
            .with("Type", self.provider_type.clone())
            .with("Address", self.address.clone())
            .with("City", self.city.clone())
            .with("Contact", self.contact.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Receiver {
    #[sqlx(rename = "Receiver_ID")]
    pub receiver_id: i64,
    #[sqlx(rename = "Name")]
    pub name: Option<String>,
    #[sqlx(rename = "Type")]
    pub receiver_type: Option<String>,
    #[sqlx(rename = "City")]
    pub city: Option<String>,
    #[sqlx(rename = "Contact")]
    pub contact: Option<String>,
}

impl Record for Receiver {
    const TABLE: Table = Table::Receivers;

    fn id(&self) -> i64 {
        self.receiver_id
    }

    fn to_fields(&self) -> FieldValues {
        FieldValues::new()
            .with("Receiver_ID", self.receiver_id)
            .with("Name", self.name.clone())
            .with("Type", self.receiver_type.clone())
            .with("City", self.city.clone())
            .with("Contact", self.contact.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FoodListing {
    #[sqlx(rename = "Food_ID")]
    pub food_id: i64,
    #[sqlx(rename = "Food_Name")]
    pub food_name: Option<String>,
    #[sqlx(rename = "Quantity")]
    pub quantity: i64,
    #[sqlx(rename = "Expiry_Date")]
    pub expiry_date: Option<NaiveDate>,
    #[sqlx(rename = "Provider_ID")]
    pub provider_id: Option<i64>,
    #[sqlx(rename = "Provider_Type")]
    pub provider_type: Option<String>,
    #[sqlx(rename = "Location")]
    pub location: Option<String>,
    #[sqlx(rename = "Food_Type")]
    pub food_type: Option<String>,
    #[sqlx(rename = "Meal_Type")]
    pub meal_type: Option<String>,
}

impl Record for FoodListing {
    const TABLE: Table = Table::FoodListings;

    fn id(&self) -> i64 {
        self.food_id
    }

    fn to_fields(&self) -> FieldValues {
        FieldValues::new()
            .with("Food_ID", self.food_id)
            .with("Food_Name", self.food_name.clone())
            .with("Quantity", self.quantity)
            .with(
                "Expiry_Date",
                self.expiry_date.map(|d| d.format(DATE_FORMAT).to_string()),
            )
            .with("Provider_ID", self.provider_id)
            .with("Provider_Type", self.provider_type.clone())
            .with("Location", self.location.clone())
            .with("Food_Type", self.food_type.clone())
            .with("Meal_Type", self.meal_type.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Claim {
    #[sqlx(rename = "Claim_ID")]
    pub claim_id: i64,
    #[sqlx(rename = "Food_ID")]
    pub food_id: Option<i64>,
    #[sqlx(rename = "Receiver_ID")]
    pub receiver_id: Option<i64>,
    #[sqlx(rename = "Status")]
    pub status: Option<String>,
    #[sqlx(rename = "Timestamp")]
    pub timestamp: Option<NaiveDateTime>,
}

impl Record for Claim {
    const TABLE: Table = Table::Claims;

    fn id(&self) -> i64 {
        self.claim_id
    }

    fn to_fields(&self) -> FieldValues {
        FieldValues::new()
            .with("Claim_ID", self.claim_id)
            .with("Food_ID", self.food_id)
            .with("Receiver_ID", self.receiver_id)
            .with("Status", self.status.clone())
            .with(
                "Timestamp",
                self.timestamp.map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
            )
    }
}
