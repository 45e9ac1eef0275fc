//! Seeds a demo event, volunteer session, and dependents for local runs.
//! The sessions and dependents tables belong to the external auth/account
//! systems in production; this tool stands in for them during development.

use chrono::{Duration, Utc};
use dotenvy::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::str::FromStr;
use uuid::Uuid;

use rsvp_service::database::migrations;

const SQL_INSERT_EVENT: &str = r#"
INSERT OR IGNORE INTO events (event_id, attendance_cap, attendance_count, starts_at, created_at, updated_at)
VALUES (?1, ?2, 0, ?3, ?4, ?4)
"#;

const SQL_INSERT_SESSION: &str = r#"
INSERT OR REPLACE INTO sessions (token, email, expires_at, created_at)
VALUES (?1, ?2, ?3, ?4)
"#;

const SQL_INSERT_DEPENDENT: &str = r#"
INSERT OR IGNORE INTO dependents (dependent_id, guardian_email, first_name, last_name, age, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env");
    let opts = SqliteConnectOptions::from_str(&db_url)
        .expect("Cannot parse DATABASE_URL")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(opts)
        .await
        .expect("Cannot connect to DB");

    migrations::run(&pool).await.expect("Cannot run migrations");

    let now = Utc::now();
    let event_id = env::var("SEED_EVENT_ID").unwrap_or_else(|_| "beach-cleanup-2026".to_string());
    let email = env::var("SEED_EMAIL").unwrap_or_else(|_| "volunteer@example.org".to_string());
    let token = Uuid::new_v4().to_string();

    if let Err(e) = seed(&pool, &event_id, &email, &token, &now.to_rfc3339()).await {
        eprintln!("seed failed: {}", e);
        std::process::exit(1);
    }

    println!("seeded event: {}", event_id);
    println!("seeded session: token={} email={}", token, email);
}

async fn seed(
    pool: &sqlx::SqlitePool,
    event_id: &str,
    email: &str,
    token: &str,
    now: &str,
) -> sqlx::Result<()> {
    let starts_at = (Utc::now() + Duration::days(14)).to_rfc3339();
    sqlx::query(SQL_INSERT_EVENT)
        .bind(event_id)
        .bind(25_i64)
        .bind(&starts_at)
        .bind(now)
        .execute(pool)
        .await?;

    let expires_at = (Utc::now() + Duration::hours(24)).to_rfc3339();
    sqlx::query(SQL_INSERT_SESSION)
        .bind(token)
        .bind(email)
        .bind(&expires_at)
        .bind(now)
        .execute(pool)
        .await?;

    for (first, last, age) in [("Jesse", "de Groot", 9_i64), ("Sam", "de Groot", 12_i64)] {
        sqlx::query(SQL_INSERT_DEPENDENT)
            .bind(Uuid::new_v4().to_string())
            .bind(email)
            .bind(first)
            .bind(last)
            .bind(age)
            .bind(now)
            .execute(pool)
            .await?;
    }

    Ok(())
}
