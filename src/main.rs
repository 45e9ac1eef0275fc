use axum::{
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;

use rsvp_service::database::migrations;
use rsvp_service::web::routes::{health, rsvp};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env");
    println!("Connecting to database: {}", db_url);

    let opts = SqliteConnectOptions::from_str(&db_url)
        .expect("Cannot parse DATABASE_URL")
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        // Write transactions queue behind SQLite's single writer; without a
        // busy timeout concurrent submissions surface as spurious lock errors.
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .connect_with(opts)
        .await
        .expect("Cannot connect to DB");

    migrations::run(&pool)
        .await
        .expect("Cannot run migrations");

    let app = Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/rsvp/submit", post(rsvp::submit_handler))
        .route("/api/rsvp/check", post(rsvp::check_handler))
        .route("/api/rsvp/cancel", post(rsvp::cancel_handler))
        .layer(CatchPanicLayer::new())
        .with_state(pool);

    // Bind with a fallback port so a stale local instance doesn't block dev.
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Cannot parse host/port");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!(
                "Could not bind {}: {}. Trying fallback {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("Cannot parse fallback address");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Cannot bind fallback port")
        }
    };

    let bound_addr = listener.local_addr().unwrap();
    println!("RSVP service listening on http://{}", bound_addr);

    axum::serve(listener, app).await.unwrap();
}
