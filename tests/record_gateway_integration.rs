//! Record gateway integration tests
//!
//! These tests run create/read/update/delete against a private in-memory
//! store and check what the store holds afterwards.

mod helpers;

use anyhow::Result;
use food_ledger::database::{
    Claim, CompareOp, DatabaseManager, FieldValues, Filter, FoodListing, IntentOutcome, Provider,
    RecordIntent, SqlValue, Table,
};
use food_ledger::{DatabaseConfig, LedgerError};
use helpers::{claim, provider, TestDb};

// =========================================================================
// CREATE
// =========================================================================

#[tokio::test]
async fn test_create_then_read_returns_exactly_that_row() -> Result<()> {
    let test_db = TestDb::empty().await?;
    let gateway = test_db.db.record_gateway();

    let fields = provider(42, "Harbor Kitchen", "Restaurant", "New Jessica");
    let created = gateway.create(Table::Providers, &fields).await?;

    assert_eq!(created.row_count(), 1);
    assert_eq!(created.columns, Table::Providers.columns());

    let read = gateway
        .read(Table::Providers, Some(&Filter::by_key(Table::Providers, 42)))
        .await?;
    assert_eq!(read.row_count(), 1);
    for (column, value) in fields.iter() {
        assert_eq!(read.get(0, column), Some(value), "column {}", column);
    }
    assert_eq!(read, created);
    Ok(())
}

#[tokio::test]
async fn test_create_returns_row_by_primary_key_not_first_field() -> Result<()> {
    let test_db = TestDb::empty().await?;
    let gateway = test_db.db.record_gateway();

    // Two rows share the first supplied field; the new one must come back.
    let first = FieldValues::new()
        .with("City", "Lisbon")
        .with("Provider_ID", 1_i64)
        .with("Name", "First");
    let second = FieldValues::new()
        .with("City", "Lisbon")
        .with("Provider_ID", 2_i64)
        .with("Name", "Second");
    gateway.create(Table::Providers, &first).await?;
    let created = gateway.create(Table::Providers, &second).await?;

    assert_eq!(created.row_count(), 1);
    assert_eq!(created.get(0, "Name"), Some(&SqlValue::from("Second")));
    Ok(())
}

#[tokio::test]
async fn test_create_without_key_uses_assigned_rowid() -> Result<()> {
    let test_db = TestDb::empty().await?;
    let gateway = test_db.db.record_gateway();

    let fields = FieldValues::new().with("Name", "Walk-in Donor").with("City", "Lakeview");
    let created = gateway.create(Table::Providers, &fields).await?;

    assert_eq!(created.row_count(), 1);
    assert_eq!(created.get(0, "Provider_ID"), Some(&SqlValue::Integer(1)));
    assert_eq!(created.get(0, "Contact"), Some(&SqlValue::Null));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_key_is_constraint_violation() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();

    let err = gateway
        .create(Table::Providers, &provider(1, "Copycat", "Restaurant", "Nowhere"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, LedgerError::ConstraintViolation { ref table, .. } if table == "providers"),
        "got {:?}",
        err
    );
    assert_eq!(gateway.count(Table::Providers).await?, 3);
    Ok(())
}

#[tokio::test]
async fn test_negative_quantity_is_constraint_violation() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();

    let fields = FieldValues::new()
        .with("Food_ID", 99_i64)
        .with("Food_Name", "Ghost Stew")
        .with("Quantity", -1_i64);
    let err = gateway.create(Table::FoodListings, &fields).await.unwrap_err();
    assert!(matches!(err, LedgerError::ConstraintViolation { .. }));

    let err = gateway
        .update(
            Table::FoodListings,
            &FieldValues::new().with("Quantity", -5_i64),
            &Filter::by_key(Table::FoodListings, 1),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ConstraintViolation { .. }));
    Ok(())
}

#[tokio::test]
async fn test_create_rejects_unknown_columns_and_empty_fields() -> Result<()> {
    let test_db = TestDb::empty().await?;
    let gateway = test_db.db.record_gateway();

    let err = gateway
        .create(Table::Claims, &FieldValues::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::EmptyFields { .. }));

    let fields = FieldValues::new()
        .with("Claim_ID", 1_i64)
        .with("Status) VALUES (1); DROP TABLE claims; --", "x");
    let err = gateway.create(Table::Claims, &fields).await.unwrap_err();
    assert!(matches!(err, LedgerError::UnknownColumn { .. }));

    assert_eq!(gateway.count(Table::Claims).await?, 0);
    Ok(())
}

// =========================================================================
// READ
// =========================================================================

#[tokio::test]
async fn test_read_without_filter_returns_all_rows() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();

    let all = gateway.read(Table::Claims, None).await?;
    assert_eq!(all.row_count(), 4);
    assert_eq!(all.columns, Table::Claims.columns());

    let also_all = gateway.read(Table::Claims, Some(&Filter::all())).await?;
    assert_eq!(also_all, all);
    Ok(())
}

#[tokio::test]
async fn test_read_with_no_match_is_empty_not_error() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();

    let none = gateway
        .read(Table::Receivers, Some(&Filter::eq("City", "Atlantis")))
        .await?;
    assert!(none.is_empty());
    assert_eq!(none.columns, Table::Receivers.columns());
    Ok(())
}

#[tokio::test]
async fn test_read_with_compound_filter() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();

    let filter = Filter::eq("Status", "Completed").and("Receiver_ID", CompareOp::Ge, 2_i64);
    let rows = gateway.read(Table::Claims, Some(&filter)).await?;
    assert_eq!(rows.row_count(), 1);
    assert_eq!(rows.get(0, "Claim_ID"), Some(&SqlValue::Integer(3)));

    let like = Filter::condition("Name", CompareOp::Like, "%Kitchen%");
    let rows = gateway.read(Table::Providers, Some(&like)).await?;
    assert_eq!(rows.row_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_read_with_unknown_column_is_invalid_filter() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();

    let err = gateway
        .read(Table::Providers, Some(&Filter::eq("Rating", 5_i64)))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidFilter { .. }));
    Ok(())
}

#[tokio::test]
async fn test_repeated_reads_are_identical() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();

    let first = gateway.read(Table::FoodListings, None).await?;
    let second = gateway.read(Table::FoodListings, None).await?;
    assert_eq!(first, second);
    Ok(())
}

// =========================================================================
// UPDATE / DELETE
// =========================================================================

#[tokio::test]
async fn test_update_existing_row_affects_one() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();

    let affected = gateway
        .update(
            Table::Providers,
            &FieldValues::new().with("City", "Mendezmouth"),
            &Filter::by_key(Table::Providers, 2),
        )
        .await?;
    assert_eq!(affected, 1);

    let row = gateway
        .read(Table::Providers, Some(&Filter::by_key(Table::Providers, 2)))
        .await?;
    assert_eq!(row.get(0, "City"), Some(&SqlValue::from("Mendezmouth")));
    Ok(())
}

#[tokio::test]
async fn test_update_with_no_match_changes_nothing() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();
    let before = gateway.read(Table::Claims, None).await?;

    let affected = gateway
        .update(
            Table::Claims,
            &FieldValues::new().with("Status", "Completed"),
            &Filter::by_key(Table::Claims, 404),
        )
        .await?;
    assert_eq!(affected, 0);
    assert_eq!(gateway.read(Table::Claims, None).await?, before);
    Ok(())
}

#[tokio::test]
async fn test_mutations_require_a_filter() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();

    let err = gateway
        .update(
            Table::Claims,
            &FieldValues::new().with("Status", "Completed"),
            &Filter::all(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidFilter { .. }));

    let err = gateway.delete(Table::Claims, &Filter::all()).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidFilter { .. }));

    assert_eq!(gateway.count(Table::Claims).await?, 4);
    Ok(())
}

#[tokio::test]
async fn test_filter_values_are_bound_not_interpolated() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();

    let hostile = Filter::eq("Name", "x' OR '1'='1");
    let deleted = gateway.delete(Table::Providers, &hostile).await?;
    assert_eq!(deleted, 0);
    assert_eq!(gateway.count(Table::Providers).await?, 3);
    Ok(())
}

#[tokio::test]
async fn test_delete_removes_row() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();
    let key = Filter::by_key(Table::Claims, 4);

    assert_eq!(gateway.delete(Table::Claims, &key).await?, 1);
    assert!(gateway.read(Table::Claims, Some(&key)).await?.is_empty());
    assert_eq!(gateway.delete(Table::Claims, &key).await?, 0);
    Ok(())
}

// =========================================================================
// INTENTS AND TYPED RECORDS
// =========================================================================

#[tokio::test]
async fn test_execute_dispatches_intents() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();

    let created = gateway
        .execute(&RecordIntent::Create {
            table: Table::Claims,
            fields: claim(9, 3, 3, "Pending", "2024-03-05 08:00:00"),
        })
        .await?;
    assert!(matches!(created, IntentOutcome::Created(ref t) if t.row_count() == 1));

    let updated = gateway
        .execute(&RecordIntent::Update {
            table: Table::Claims,
            updates: FieldValues::new().with("Status", "Completed"),
            filter: Filter::by_key(Table::Claims, 9),
        })
        .await?;
    assert_eq!(updated, IntentOutcome::Affected(1));

    let read = gateway
        .execute(&RecordIntent::Read {
            table: Table::Claims,
            filter: Some(Filter::eq("Status", "Completed")),
        })
        .await?;
    match read {
        IntentOutcome::Rows(rows) => assert_eq!(rows.row_count(), 3),
        other => panic!("Expected Rows, got {:?}", other),
    }

    let deleted = gateway
        .execute(&RecordIntent::Delete {
            table: Table::Claims,
            filter: Filter::by_key(Table::Claims, 9),
        })
        .await?;
    assert_eq!(deleted, IntentOutcome::Affected(1));
    Ok(())
}

#[tokio::test]
async fn test_typed_records() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();

    let claim: Claim = gateway
        .fetch_by_id(2)
        .await?
        .expect("claim 2 is seeded");
    assert_eq!(claim.status.as_deref(), Some("Pending"));
    assert_eq!(
        claim.timestamp.map(|t| t.to_string()),
        Some("2024-03-02 10:00:00".to_string())
    );

    let missing: Option<Provider> = gateway.fetch_by_id(77).await?;
    assert!(missing.is_none());

    let vegetarian: Vec<FoodListing> = gateway
        .list(Some(&Filter::eq("Food_Type", "Vegetarian")))
        .await?;
    let names: Vec<_> = vegetarian.iter().filter_map(|l| l.food_name.clone()).collect();
    assert_eq!(names, vec!["Bread".to_string(), "Soup".to_string()]);

    let mut copy = vegetarian[0].clone();
    copy.food_id = 50;
    gateway.insert_record(&copy).await?;
    let stored: Option<FoodListing> = gateway.fetch_by_id(50).await?;
    assert_eq!(stored, Some(copy.clone()));

    assert_eq!(gateway.delete_record(&copy).await?, 1);
    assert_eq!(gateway.delete_record(&copy).await?, 0);
    let gone: Option<FoodListing> = gateway.fetch_by_id(copy.food_id).await?;
    assert!(gone.is_none());
    Ok(())
}

// =========================================================================
// DURABILITY
// =========================================================================

#[tokio::test]
async fn test_mutations_survive_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
    let config = DatabaseConfig {
        database_url: url,
        create_if_missing: true,
        ..DatabaseConfig::default()
    };

    let db = DatabaseManager::new(config.clone()).await?;
    db.bootstrap_schema().await?;
    db.record_gateway()
        .create(Table::Providers, &provider(7, "Night Market", "Restaurant", "Lakeview"))
        .await?;
    db.close().await;

    let reopened = DatabaseManager::new(config).await?;
    reopened.test_connection().await?;
    let rows = reopened
        .record_gateway()
        .read(Table::Providers, Some(&Filter::by_key(Table::Providers, 7)))
        .await?;
    assert_eq!(rows.row_count(), 1);
    reopened.close().await;
    Ok(())
}

#[tokio::test]
async fn test_missing_file_without_create_is_unavailable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}", dir.path().join("absent.db").display()),
        ..DatabaseConfig::default()
    };

    match DatabaseManager::new(config).await {
        Err(err) => assert!(err.is_unavailable(), "got {:?}", err),
        Ok(_) => panic!("opening a missing store should fail"),
    }
    Ok(())
}

#[tokio::test]
async fn test_operations_after_close_are_unavailable() -> Result<()> {
    let test_db = TestDb::seeded().await?;
    let gateway = test_db.db.record_gateway();
    let catalog = test_db.db.report_catalog();
    test_db.db.close().await;

    let err = gateway.read(Table::Claims, None).await.unwrap_err();
    assert!(err.is_unavailable(), "read: {:?}", err);

    let err = gateway
        .create(Table::Providers, &provider(9, "Late Cafe", "Restaurant", "Lakeview"))
        .await
        .unwrap_err();
    assert!(err.is_unavailable(), "create: {:?}", err);

    let err = catalog.run_report("Total food quantity").await.unwrap_err();
    assert!(matches!(err, LedgerError::StoreUnavailable { .. }));
    Ok(())
}
