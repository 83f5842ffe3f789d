//! Database seeder for Fundra development and testing.
//!
//! Seeds a demo bank account and a month of unmatched ledger lines so the
//! reconciliation workflow can be exercised locally end to end.
//!
//! Usage: cargo run --bin seeder

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::str::FromStr;
use uuid::Uuid;

use fundra_db::entities::{bank_accounts, ledger_lines, sea_orm_active_enums::LedgerLineKind};

/// Demo bank account ID (consistent for all seeds)
const DEMO_ACCOUNT_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo GL account ID linked to the bank account
const DEMO_GL_ACCOUNT_ID: &str = "00000000-0000-0000-0000-000000000010";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = fundra_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo bank account...");
    seed_bank_account(&db).await;

    println!("Seeding ledger lines...");
    seed_ledger_lines(&db).await;

    println!("Seeding complete!");
}

fn demo_account_id() -> Uuid {
    Uuid::parse_str(DEMO_ACCOUNT_ID).unwrap()
}

/// Seeds the demo operating account.
async fn seed_bank_account(db: &DatabaseConnection) {
    if bank_accounts::Entity::find_by_id(demo_account_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo bank account already exists, skipping...");
        return;
    }

    let account = bank_accounts::ActiveModel {
        id: Set(demo_account_id()),
        name: Set("Operating Account".to_string()),
        bank_name: Set("First Demo Bank".to_string()),
        account_number_masked: Set("****4821".to_string()),
        routing_number: Set(Some("021000021".to_string())),
        gl_account_id: Set(Uuid::parse_str(DEMO_GL_ACCOUNT_ID).unwrap()),
        current_balance: Set(Decimal::from_str("1000.00").unwrap()),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };

    if let Err(e) = account.insert(db).await {
        eprintln!("Failed to insert demo bank account: {e}");
    } else {
        println!("  Created demo bank account: Operating Account");
    }
}

/// Seeds a month of unmatched ledger lines as auto-match candidates.
async fn seed_ledger_lines(db: &DatabaseConnection) {
    let account_id = demo_account_id();
    let today = Utc::now().date_naive();
    let month_start = today.with_day(1).unwrap_or(today);

    let lines = [
        (4, "Deposit A", "200.00", LedgerLineKind::Deposit),
        (10, "Fee B", "-50.00", LedgerLineKind::Disbursement),
        (14, "Deposit C", "350.00", LedgerLineKind::Deposit),
        (7, "Rent payment", "-1200.00", LedgerLineKind::Disbursement),
        (12, "Grant receipt", "5000.00", LedgerLineKind::Deposit),
        (18, "Payroll transfer", "-2750.00", LedgerLineKind::Disbursement),
        (21, "Interest income", "12.35", LedgerLineKind::Journal),
        (25, "Utilities", "-184.20", LedgerLineKind::Disbursement),
    ];

    let mut inserted = 0;
    for (day_offset, description, amount, kind) in lines {
        let line = ledger_lines::ActiveModel {
            id: Set(Uuid::new_v4()),
            bank_account_id: Set(account_id),
            line_date: Set(month_start + chrono::Duration::days(day_offset)),
            description: Set(description.to_string()),
            amount: Set(Decimal::from_str(amount).unwrap()),
            kind: Set(kind),
            matched: Set(false),
            created_at: Set(Utc::now().into()),
        };

        if let Err(e) = line.insert(db).await {
            if !e.to_string().contains("duplicate key") {
                eprintln!("Failed to insert ledger line {description}: {e}");
            }
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} ledger lines");
}
